use crate::config::MonitorConfig;
use afya_core::{
    Assessment, BloodPressureCategory, HistoryError, HistoryStore, InsightRecord, Profile, Reading,
    ReadingWindow, Status, VitalRecord, VitalStats, DEFAULT_INSIGHT_HISTORY,
    DEFAULT_READING_HISTORY,
};
use afya_risk::fallback::FALLBACK_MODEL;
use afya_risk::{AnalysisGate, AnalysisPermit, RemoteScorer, ScoringService, Strategy};
use afya_sim::{AsyncChannelObserver, WristbandSimulator};
use prometheus_bridge::{status_escalated, MonitorMetrics};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Totals reported when a run ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub readings: u64,
    pub assessments: u64,
    pub escalations: u64,
    pub skipped_analyses: u64,
}

/// What the history store holds for the session's user at a glance.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    pub readings: usize,
    pub insights: usize,
    pub latest: Option<InsightRecord>,
}

/// State shared by the device and analysis arms of the loop.
pub struct Session<H> {
    user_id: Uuid,
    window: ReadingWindow,
    history: H,
    metrics: MonitorMetrics,
    gate: AnalysisGate,
    analysis_window: usize,
    min_readings: usize,
    last_status: Option<Status>,
    history_failing: bool,
    summary: RunSummary,
}

impl<H: HistoryStore> Session<H> {
    pub fn new(config: &MonitorConfig, user_id: Uuid, history: H, metrics: MonitorMetrics) -> Self {
        Self {
            user_id,
            window: ReadingWindow::with_capacity(config.window_capacity),
            history,
            metrics,
            gate: AnalysisGate::new(),
            analysis_window: config.analysis_window,
            min_readings: config.min_readings,
            last_status: None,
            history_failing: false,
            summary: RunSummary::default(),
        }
    }

    pub fn record_reading(&mut self, reading: Reading) {
        let category =
            BloodPressureCategory::classify(reading.systolic as f64, reading.diastolic as f64);
        debug!(
            hr = reading.heart_rate,
            sys = reading.systolic,
            dia = reading.diastolic,
            pulse_pressure = reading.pulse_pressure(),
            category = category.label(),
            "reading"
        );
        self.metrics.observe_reading(&reading);
        let stored = self
            .history
            .append_reading(VitalRecord::from_reading(self.user_id, &reading));
        self.note_store(stored, "reading");
        self.window.push(reading);
        self.summary.readings += 1;
    }

    /// The newest readings plus a permit, or `None` while too few readings
    /// are buffered or another analysis is still running.
    pub fn begin_analysis(&mut self) -> Option<(AnalysisPermit, Vec<Reading>)> {
        if self.window.len() < self.min_readings {
            return None;
        }
        let Some(permit) = self.gate.try_begin() else {
            debug!("analysis still in flight, skipping");
            self.summary.skipped_analyses += 1;
            return None;
        };
        Some((permit, self.window.recent(self.analysis_window)))
    }

    /// Logs, stores and meters one result. Returns whether the status rose.
    pub fn record_assessment(&mut self, assessment: &Assessment, remote_configured: bool) -> bool {
        let insight = assessment.insight();
        info!(
            status = %insight.status,
            risk = insight.risk_score,
            source = assessment.source(),
            model = assessment.model(),
            "assessment"
        );

        if let Some(stats) = self.window_stats() {
            let category = BloodPressureCategory::classify(stats.mean_systolic, stats.mean_diastolic);
            debug!(
                readings = stats.count,
                category = %category,
                hrv = stats.heart_rate_variability(),
                pulse_pressure = stats.mean_pulse_pressure(),
                span_secs = stats.monitoring_duration().num_seconds(),
                "window stats"
            );
        }

        self.metrics.observe_assessment(assessment);
        if remote_configured {
            match assessment {
                Assessment::Rule(_) => self.metrics.record_fallback("analysis"),
                Assessment::Ml { generated: false, result } if result.model == FALLBACK_MODEL => {
                    self.metrics.record_fallback("prediction")
                }
                _ => {}
            }
        }

        let escalated = status_escalated(&self.metrics, self.last_status, assessment);
        if escalated {
            warn!(
                from = %self.last_status.map(Status::as_str).unwrap_or("none"),
                to = %insight.status,
                summary = %insight.summary,
                "risk escalated"
            );
            self.summary.escalations += 1;
        }
        self.last_status = Some(insight.status);

        let stored = self
            .history
            .append_insight(InsightRecord::from_insight(self.user_id, insight));
        self.note_store(stored, "insight");
        self.summary.assessments += 1;
        escalated
    }

    /// Warns when the store starts refusing rows, then stays quiet until an
    /// append succeeds again.
    fn note_store(&mut self, stored: Result<(), HistoryError>, row: &'static str) {
        match stored {
            Ok(()) => self.history_failing = false,
            Err(err) if self.history_failing => debug!(error = %err, row, "store still failing"),
            Err(err) => {
                warn!(error = %err, row, "failed to store row");
                self.history_failing = true;
            }
        }
    }

    /// Statistics over everything currently buffered.
    pub fn window_stats(&self) -> Option<VitalStats> {
        VitalStats::from_readings(&self.window.to_vec())
    }

    /// The user's stored rows, capped at the default history limits.
    pub fn history_snapshot(&self) -> Result<HistorySnapshot, HistoryError> {
        let readings = self
            .history
            .recent_readings(self.user_id, DEFAULT_READING_HISTORY)?;
        let insights = self
            .history
            .recent_insights(self.user_id, DEFAULT_INSIGHT_HISTORY)?;
        Ok(HistorySnapshot {
            readings: readings.len(),
            insights: insights.len(),
            latest: insights.into_iter().next(),
        })
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn window(&self) -> &ReadingWindow {
        &self.window
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }
}

/// How the loop is driven beyond the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub seed: Option<u64>,
    pub max_readings: Option<u64>,
}

/// Streams readings into `session` and scores them every analysis interval
/// until `shutdown` resolves or `max_readings` have arrived.
pub async fn run<R, H, S>(
    config: &MonitorConfig,
    options: RunOptions,
    service: Arc<ScoringService<R>>,
    session: &mut Session<H>,
    shutdown: S,
) -> RunSummary
where
    R: RemoteScorer + 'static,
    H: HistoryStore,
    S: Future<Output = ()>,
{
    let mut device = match options.seed {
        Some(seed) => WristbandSimulator::seeded(seed, config.simulator.clone()),
        None => WristbandSimulator::from_entropy(config.simulator.clone()),
    };

    let (reading_tx, mut reading_rx) = mpsc::unbounded_channel::<Reading>();
    let (result_tx, mut result_rx) = mpsc::unbounded_channel::<Assessment>();
    device.connect(AsyncChannelObserver(reading_tx));

    let mut device_tick = interval(device.tick_interval());
    device_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut analysis_tick = interval(Duration::from_millis(config.analysis_interval_ms));
    analysis_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick of an interval fires immediately; no window yet.
    analysis_tick.tick().await;

    let strategy = config.strategy;
    let profile = config.profile.clone();
    let remote_configured = service.has_remote();
    tokio::pin!(shutdown);

    info!(
        user = %session.user_id(),
        model = %service.model(),
        strategy = %strategy,
        remote = remote_configured,
        "monitor started"
    );

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown requested");
                break;
            }
            _ = device_tick.tick() => {
                device.tick();
            }
            Some(reading) = reading_rx.recv() => {
                session.record_reading(reading);
                if options.max_readings.is_some_and(|max| session.summary().readings >= max) {
                    info!(readings = session.summary().readings, "reading limit reached");
                    break;
                }
            }
            _ = analysis_tick.tick() => {
                if let Some((permit, readings)) = session.begin_analysis() {
                    spawn_analysis(
                        Arc::clone(&service),
                        strategy,
                        readings,
                        profile.clone(),
                        permit,
                        result_tx.clone(),
                    );
                }
            }
            Some(assessment) = result_rx.recv() => {
                session.record_assessment(&assessment, remote_configured);
            }
        }
    }

    device.disconnect();
    // In-flight analyses finish into a closed channel and are dropped.
    drop(result_rx);
    session.summary()
}

fn spawn_analysis<R: RemoteScorer + 'static>(
    service: Arc<ScoringService<R>>,
    strategy: Strategy,
    readings: Vec<Reading>,
    profile: Option<Profile>,
    permit: AnalysisPermit,
    results: mpsc::UnboundedSender<Assessment>,
) {
    tokio::spawn(async move {
        let assessment = service.assess(strategy, &readings, profile.as_ref()).await;
        if results.send(assessment).is_err() {
            debug!("monitor stopped, discarding assessment");
        }
        drop(permit);
    });
}
