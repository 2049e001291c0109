use crate::cli::Cli;
use crate::config::{ConfigError, MonitorConfig, ENV_ANALYSIS_URL, ENV_API_KEY, ENV_USER_ID};
use crate::monitor::{run, RunOptions, Session};
use afya_core::{
    Assessment, HistoryError, HistoryStore, InMemoryHistory, Insight, InsightRecord,
    PredictionResult, Reading, Status, VitalRecord,
};
use afya_risk::fallback::fallback_prediction;
use afya_risk::service::{RemoteAnalysis, RemotePrediction};
use afya_risk::{ModelKind, RemoteScorer, ScoringError, ScoringRequest, ScoringService, Strategy};
use chrono::Utc;
use clap::Parser;
use prometheus::Registry;
use prometheus_bridge::MonitorMetrics;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

fn session(config: &MonitorConfig) -> (Session<InMemoryHistory>, Registry) {
    let registry = Registry::new();
    let metrics = MonitorMetrics::new(&registry).unwrap();
    let session = Session::new(config, Uuid::new_v4(), InMemoryHistory::new(1_000), metrics);
    (session, registry)
}

fn fast_config() -> MonitorConfig {
    let mut config = MonitorConfig {
        analysis_interval_ms: 5,
        analysis_window: 10,
        min_readings: 3,
        ..MonitorConfig::default()
    };
    config.simulator.tick_interval_ms = 1;
    config
}

fn reading(hr: u16, sys: u16, dia: u16) -> Reading {
    Reading::new(Utc::now(), hr, sys, dia)
}

fn rule(status: Status) -> Assessment {
    let mut insight = Insight::no_data("test", Utc::now());
    insight.status = status;
    Assessment::Rule(insight)
}

#[test]
fn default_config_is_valid() {
    let config = MonitorConfig::default();
    config.validate().unwrap();
    assert_eq!(config.window_capacity, 60);
    assert_eq!(config.analysis_interval_ms, 10_000);
    assert_eq!(config.analysis_window, 20);
    assert_eq!(config.min_readings, 5);
    assert_eq!(config.remote.timeout_ms, 10_000);
    assert_eq!(config.strategy, Strategy::Rules);
    assert!(!config.remote.is_configured());
}

#[test]
fn partial_json_keeps_defaults() {
    let config = MonitorConfig::from_json(
        r#"{"strategy": "model", "model": "ensemble", "profile": {"age": 61, "gender": "Male"}}"#,
    )
    .unwrap();
    assert_eq!(config.strategy, Strategy::Model);
    assert_eq!(config.model, ModelKind::Ensemble);
    assert_eq!(config.window_capacity, 60);
    assert_eq!(config.profile.unwrap().effective_age(), 61);
    assert!(matches!(
        MonitorConfig::from_json("{\"window_capacity\": -1}"),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn validation_rejects_inconsistent_windows() {
    let config = MonitorConfig {
        analysis_window: 100,
        ..MonitorConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::WindowTooLarge { window: 100, capacity: 60 })
    ));

    let config = MonitorConfig {
        min_readings: 0,
        ..MonitorConfig::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Zero("min_readings"))));

    let config = MonitorConfig {
        min_readings: 30,
        ..MonitorConfig::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::MinReadingsTooLarge { .. })));

    let config = MonitorConfig {
        history_max_rows: 0,
        ..MonitorConfig::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Zero("history_max_rows"))));
}

#[test]
fn env_overrides_remote_and_user() {
    let user = Uuid::new_v4();
    let env: HashMap<&str, String> = [
        (ENV_ANALYSIS_URL, "https://scoring.local/analyze".to_string()),
        (ENV_API_KEY, "  ".to_string()),
        (ENV_USER_ID, user.to_string()),
    ]
    .into_iter()
    .collect();

    let mut config = MonitorConfig::default();
    config.apply_env(|var| env.get(var).cloned()).unwrap();
    assert_eq!(config.remote.analysis_url.as_deref(), Some("https://scoring.local/analyze"));
    assert_eq!(config.remote.api_key, None);
    assert_eq!(config.user_id, Some(user));
    assert!(config.remote.is_configured());
}

#[test]
fn env_rejects_malformed_user_id() {
    let mut config = MonitorConfig::default();
    let err = config
        .apply_env(|var| (var == ENV_USER_ID).then(|| "not-a-uuid".to_string()))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Env { var: ENV_USER_ID, .. }));
}

#[test]
fn cli_flags_override_config() {
    let cli = Cli::try_parse_from([
        "afya-monitor",
        "--seed",
        "7",
        "--ticks",
        "30",
        "--model",
        "random-forest",
        "--strategy",
        "model",
        "--json-logs",
    ])
    .unwrap();
    assert_eq!(cli.seed, Some(7));
    assert_eq!(cli.ticks, Some(30));
    assert!(cli.json_logs);

    let mut config = MonitorConfig::default();
    cli.apply(&mut config);
    assert_eq!(config.model, ModelKind::RandomForest);
    assert_eq!(config.strategy, Strategy::Model);

    assert!(Cli::try_parse_from(["afya-monitor", "--model", "svm"]).is_err());
}

#[test]
fn analysis_waits_for_min_readings_and_gate() {
    let config = fast_config();
    let (mut session, _registry) = session(&config);

    session.record_reading(reading(72, 120, 80));
    session.record_reading(reading(74, 121, 80));
    assert!(session.begin_analysis().is_none());

    session.record_reading(reading(73, 119, 79));
    let (permit, readings) = session.begin_analysis().unwrap();
    assert_eq!(readings.len(), 3);
    assert!(session.begin_analysis().is_none());
    assert_eq!(session.summary().skipped_analyses, 1);

    drop(permit);
    assert!(session.begin_analysis().is_some());
}

#[test]
fn analysis_sees_only_the_newest_readings() {
    let config = fast_config();
    let (mut session, _registry) = session(&config);
    for hr in 60..80 {
        session.record_reading(reading(hr, 120, 80));
    }
    let (_permit, readings) = session.begin_analysis().unwrap();
    assert_eq!(readings.len(), 10);
    assert_eq!(readings.first().map(|r| r.heart_rate), Some(70));
    assert_eq!(readings.last().map(|r| r.heart_rate), Some(79));

    let stored = session
        .history()
        .recent_readings(session.user_id(), 100)
        .unwrap();
    assert_eq!(stored.len(), 20);
}

#[test]
fn assessments_are_stored_and_escalations_flagged() {
    let config = fast_config();
    let (mut session, registry) = session(&config);
    let metrics_text = || prometheus_bridge::render(&registry).unwrap();

    assert!(!session.record_assessment(&rule(Status::Normal), false));
    assert!(session.record_assessment(&rule(Status::Critical), false));
    assert!(!session.record_assessment(&rule(Status::Warning), false));

    let insights = session
        .history()
        .recent_insights(session.user_id(), 20)
        .unwrap();
    assert_eq!(insights.len(), 3);
    assert_eq!(session.summary().escalations, 1);
    assert!(metrics_text().contains("afya_status_escalations_total 1"));
}

#[test]
fn fallbacks_are_metered_only_with_a_remote() {
    let config = fast_config();
    let (mut session, registry) = session(&config);
    let readings = vec![reading(72, 150, 95)];
    let fallback = Assessment::Ml {
        result: fallback_prediction(&readings, Utc::now()),
        generated: false,
    };

    session.record_assessment(&fallback, false);
    assert!(!prometheus_bridge::render(&registry)
        .unwrap()
        .contains("afya_scoring_fallbacks_total"));

    session.record_assessment(&fallback, true);
    session.record_assessment(&rule(Status::Normal), true);
    let text = prometheus_bridge::render(&registry).unwrap();
    assert!(text.contains(r#"afya_scoring_fallbacks_total{kind="prediction"} 1"#));
    assert!(text.contains(r#"afya_scoring_fallbacks_total{kind="analysis"} 1"#));
}

#[test]
fn window_stats_cover_the_buffer() {
    let config = fast_config();
    let (mut session, _registry) = session(&config);
    assert!(session.window_stats().is_none());

    session.record_reading(reading(70, 130, 80));
    session.record_reading(reading(90, 140, 90));
    let stats = session.window_stats().unwrap();
    assert_eq!(stats.count, 2);
    assert_eq!(stats.heart_rate_variability(), 20);
    assert_eq!(stats.mean_pulse_pressure(), 50.0);
    assert!(stats.monitoring_duration() >= chrono::Duration::zero());
}

#[test]
fn history_snapshot_reports_newest_insight() {
    let config = fast_config();
    let (mut session, _registry) = session(&config);
    let empty = session.history_snapshot().unwrap();
    assert_eq!((empty.readings, empty.insights), (0, 0));
    assert!(empty.latest.is_none());

    for _ in 0..120 {
        session.record_reading(reading(72, 120, 80));
    }
    session.record_assessment(&rule(Status::Normal), false);
    session.record_assessment(&rule(Status::Critical), false);

    let snapshot = session.history_snapshot().unwrap();
    assert_eq!(snapshot.readings, 100);
    assert_eq!(snapshot.insights, 2);
    assert_eq!(snapshot.latest.map(|row| row.status), Some(Status::Critical));
}

#[test]
fn long_runs_keep_the_newest_rows() {
    let config = fast_config();
    let registry = Registry::new();
    let metrics = MonitorMetrics::new(&registry).unwrap();
    let mut session = Session::new(&config, Uuid::new_v4(), InMemoryHistory::new(10), metrics);

    for hr in 60..90 {
        session.record_reading(reading(hr, 120, 80));
    }
    let newest = session
        .history()
        .recent_readings(session.user_id(), 1)
        .unwrap();
    assert_eq!(newest[0].heart_rate, 89);
    assert_eq!(session.history().total_rows(), 10);
    assert_eq!(session.history().evicted_rows(), 20);

    session.record_assessment(&rule(Status::Warning), false);
    assert_eq!(session.history_snapshot().unwrap().insights, 1);
}

/// Refuses every append.
struct FullStore;

impl HistoryStore for FullStore {
    fn append_reading(&mut self, _record: VitalRecord) -> Result<(), HistoryError> {
        Err(HistoryError::Full(0))
    }

    fn append_insight(&mut self, _record: InsightRecord) -> Result<(), HistoryError> {
        Err(HistoryError::Full(0))
    }

    fn recent_readings(&self, _user_id: Uuid, _limit: usize) -> Result<Vec<VitalRecord>, HistoryError> {
        Ok(Vec::new())
    }

    fn recent_insights(&self, _user_id: Uuid, _limit: usize) -> Result<Vec<InsightRecord>, HistoryError> {
        Ok(Vec::new())
    }

    fn clear_user(&mut self, _user_id: Uuid) -> Result<usize, HistoryError> {
        Ok(0)
    }
}

#[test]
fn refusing_store_does_not_stop_monitoring() {
    let config = fast_config();
    let registry = Registry::new();
    let metrics = MonitorMetrics::new(&registry).unwrap();
    let mut session = Session::new(&config, Uuid::new_v4(), FullStore, metrics);

    for _ in 0..5 {
        session.record_reading(reading(72, 120, 80));
    }
    session.record_assessment(&rule(Status::Normal), false);
    assert_eq!(session.summary().readings, 5);
    assert_eq!(session.summary().assessments, 1);
    assert_eq!(session.window().len(), 5);
}

#[tokio::test(start_paused = true)]
async fn seeded_run_stops_after_reading_limit() {
    let config = fast_config();
    let (mut session, _registry) = session(&config);
    let options = RunOptions {
        seed: Some(42),
        max_readings: Some(40),
    };
    let service = Arc::new(ScoringService::local(ModelKind::Xgboost));

    let summary = run(&config, options, service, &mut session, std::future::pending()).await;
    assert_eq!(summary.readings, 40);
    assert!(summary.assessments >= 1);
    assert_eq!(session.window().len(), 40);
    assert!(session.window().iter().all(Reading::within_physiological_limits));
}

#[tokio::test(start_paused = true)]
async fn shutdown_future_ends_the_run() {
    let config = fast_config();
    let (mut session, _registry) = session(&config);
    let service = Arc::new(ScoringService::local(ModelKind::Xgboost));
    let shutdown = tokio::time::sleep(std::time::Duration::from_millis(20));

    let summary = run(&config, RunOptions::default(), service, &mut session, shutdown).await;
    assert!(summary.readings > 0);
    assert!(summary.readings <= 25);
}

struct StalledRemote;

impl RemoteScorer for StalledRemote {
    async fn analyze(&self, _request: &ScoringRequest<'_>) -> Result<RemoteAnalysis, ScoringError> {
        std::future::pending().await
    }

    async fn predict(&self, _request: &ScoringRequest<'_>) -> Result<RemotePrediction, ScoringError> {
        Ok(RemotePrediction {
            result: PredictionResult::no_data(Utc::now()),
            ml_generated: true,
        })
    }
}

#[tokio::test(start_paused = true)]
async fn stalled_analysis_blocks_later_ticks() {
    let config = fast_config();
    let (mut session, _registry) = session(&config);
    let options = RunOptions {
        seed: Some(1),
        max_readings: Some(60),
    };
    let service = Arc::new(ScoringService::new(StalledRemote, ModelKind::Xgboost));

    let summary = run(&config, options, service, &mut session, std::future::pending()).await;
    assert_eq!(summary.readings, 60);
    assert_eq!(summary.assessments, 0);
    assert!(summary.skipped_analyses >= 1);
}
