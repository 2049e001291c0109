use crate::category::BloodPressureCategory;
use crate::history::{
    HistoryError, HistoryStore, InMemoryHistory, InsightRecord, VitalRecord,
    DEFAULT_INSIGHT_HISTORY, DEFAULT_READING_HISTORY,
};
use crate::insight::{Assessment, Insight, PredictionResult, Status};
use crate::profile::{Gender, Profile, DEFAULT_AGE, DEFAULT_BMI};
use crate::reading::{Reading, HEART_RATE_LIMITS};
use crate::stats::VitalStats;
use crate::window::ReadingWindow;
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use uuid::Uuid;

fn reading_at(secs: i64, hr: u16, sys: u16, dia: u16) -> Reading {
    let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    Reading::new(t0 + Duration::seconds(secs), hr, sys, dia)
}

#[test]
fn window_evicts_oldest_first() {
    let mut window = ReadingWindow::with_capacity(3);
    for i in 0..5 {
        window.push(reading_at(i, 70 + i as u16, 120, 80));
    }
    assert_eq!(window.len(), 3);
    assert_eq!(window.dropped(), 2);
    let hrs: Vec<u16> = window.iter().map(|r| r.heart_rate).collect();
    assert_eq!(hrs, vec![72, 73, 74]);
    assert_eq!(window.latest().map(|r| r.heart_rate), Some(74));
}

#[test]
fn window_recent_returns_newest_in_order() {
    let mut window = ReadingWindow::default();
    for i in 0..10 {
        window.push(reading_at(i, 60 + i as u16, 120, 80));
    }
    let recent: Vec<u16> = window.recent(3).iter().map(|r| r.heart_rate).collect();
    assert_eq!(recent, vec![67, 68, 69]);
    assert_eq!(window.recent(50).len(), 10);
}

#[test]
fn zero_capacity_window_drops_everything() {
    let mut window = ReadingWindow::with_capacity(0);
    window.push(reading_at(0, 70, 120, 80));
    assert!(window.is_empty());
    assert_eq!(window.dropped(), 1);
}

#[test]
fn stats_on_empty_slice_is_none() {
    assert!(VitalStats::from_readings(&[]).is_none());
}

#[test]
fn stats_track_means_extremes_and_duration() {
    let readings = [
        reading_at(0, 60, 110, 70),
        reading_at(30, 80, 130, 90),
        reading_at(60, 70, 120, 80),
    ];
    let stats = VitalStats::from_readings(&readings).unwrap();
    assert_eq!(stats.count, 3);
    assert!((stats.mean_heart_rate - 70.0).abs() < 1e-12);
    assert!((stats.mean_systolic - 120.0).abs() < 1e-12);
    assert!((stats.mean_diastolic - 80.0).abs() < 1e-12);
    assert_eq!(stats.heart_rate_variability(), 20);
    assert_eq!(stats.max_systolic, 130);
    assert_eq!(stats.min_diastolic, 70);
    assert_eq!(stats.monitoring_duration(), Duration::seconds(60));
}

#[test]
fn profile_defaults_fill_missing_fields() {
    let profile = Profile::default();
    assert_eq!(profile.effective_age(), DEFAULT_AGE);
    assert_eq!(profile.effective_bmi(), DEFAULT_BMI);
    assert!(!profile.is_male());
}

#[test]
fn profile_derives_bmi_from_weight_and_height() {
    let profile = Profile {
        weight_kg: Some(80.0),
        height_cm: Some(200.0),
        ..Profile::default()
    };
    assert!((profile.effective_bmi() - 20.0).abs() < 1e-9);
}

#[test]
fn implausible_profile_values_are_defaulted() {
    let profile = Profile {
        age: Some(400),
        bmi: Some(3.0),
        ..Profile::default()
    };
    assert_eq!(profile.effective_age(), DEFAULT_AGE);
    assert_eq!(profile.effective_bmi(), DEFAULT_BMI);
}

#[test]
fn gender_parses_loosely() {
    let profile: Profile = serde_json::from_str(r#"{"age":52,"gender":"MALE"}"#).unwrap();
    assert_eq!(profile.gender, Some(Gender::Male));
    assert!(profile.is_male());

    let profile: Profile = serde_json::from_str(r#"{"gender":"prefer not to say"}"#).unwrap();
    assert_eq!(profile.gender, Some(Gender::Other));
}

#[test]
fn reading_uses_camel_case_and_millis() {
    let reading = reading_at(0, 72, 120, 80);
    let value = serde_json::to_value(reading).unwrap();
    assert_eq!(value["heartRate"], 72);
    assert_eq!(value["timestamp"], reading.timestamp.timestamp_millis());
    assert!(reading.within_physiological_limits());
    assert_eq!(reading.pulse_pressure(), 40);
}

#[test]
fn status_orders_by_severity() {
    assert!(Status::Normal < Status::Warning);
    assert!(Status::Warning < Status::Critical);
    assert_eq!(Status::Critical.to_string(), "critical");
}

#[test]
fn assessment_flags_follow_variant() {
    let insight = Insight::no_data("No readings available yet.", Utc::now());
    let rule = Assessment::Rule(insight.clone());
    let ai = Assessment::Ai(insight);
    let fallback = Assessment::Ml {
        result: PredictionResult::no_data(Utc::now()),
        generated: false,
    };

    assert!(!rule.ai_generated());
    assert!(ai.ai_generated());
    assert!(!fallback.ml_generated());
    assert_eq!(fallback.model(), "none");
    assert_eq!(fallback.source(), "ml_fallback");
    assert_eq!(rule.risk_score(), 0);
    assert!(rule.prediction().is_none());
}

#[test]
fn prediction_result_flattens_insight_fields() {
    let result = PredictionResult::no_data(Utc::now());
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["status"], "normal");
    assert_eq!(value["riskScore"], 0);
    assert_eq!(value["model"], "none");
    assert!(value.get("features").is_none());
}

#[test]
fn bp_category_bands() {
    assert_eq!(BloodPressureCategory::classify(185.0, 95.0), BloodPressureCategory::Crisis);
    assert_eq!(BloodPressureCategory::classify(135.0, 85.0), BloodPressureCategory::Stage1);
    assert_eq!(BloodPressureCategory::classify(125.0, 75.0), BloodPressureCategory::Elevated);
    assert_eq!(BloodPressureCategory::classify(118.0, 75.0), BloodPressureCategory::Normal);
    assert_eq!(BloodPressureCategory::classify(85.0, 70.0), BloodPressureCategory::Low);
}

#[test]
fn history_queries_newest_first_per_user() {
    let mut store = InMemoryHistory::new(1_000);
    let user = Uuid::new_v4();
    let other = Uuid::new_v4();

    for i in 0..5 {
        store
            .append_reading(VitalRecord::from_reading(user, &reading_at(i, 70 + i as u16, 120, 80)))
            .unwrap();
    }
    store
        .append_reading(VitalRecord::from_reading(other, &reading_at(99, 99, 120, 80)))
        .unwrap();

    let rows = store.recent_readings(user, 2).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].heart_rate, 74);
    assert_eq!(rows[1].heart_rate, 73);

    let insight = Insight::no_data("No readings available yet.", Utc::now());
    store.append_insight(InsightRecord::from_insight(user, &insight)).unwrap();
    assert_eq!(store.recent_insights(user, 20).unwrap().len(), 1);

    assert_eq!(store.clear_user(user).unwrap(), 6);
    assert!(store.recent_readings(user, 10).unwrap().is_empty());
    assert_eq!(store.total_rows(), 1);
}

#[test]
fn full_history_evicts_the_users_oldest_rows() {
    let mut store = InMemoryHistory::new(3);
    let user = Uuid::new_v4();
    for i in 0..5 {
        store
            .append_reading(VitalRecord::from_reading(user, &reading_at(i, 70 + i as u16, 120, 80)))
            .unwrap();
    }
    assert_eq!(store.total_rows(), 3);
    assert_eq!(store.evicted_rows(), 2);
    let kept: Vec<u16> = store
        .recent_readings(user, DEFAULT_READING_HISTORY)
        .unwrap()
        .iter()
        .map(|r| r.heart_rate)
        .collect();
    assert_eq!(kept, vec![74, 73, 72]);

    // An insight on a full store displaces the oldest reading.
    let insight = Insight::no_data("No readings available yet.", Utc::now());
    store.append_insight(InsightRecord::from_insight(user, &insight)).unwrap();
    assert_eq!(store.recent_readings(user, DEFAULT_READING_HISTORY).unwrap().len(), 2);
    assert_eq!(store.recent_insights(user, DEFAULT_INSIGHT_HISTORY).unwrap().len(), 1);
    assert_eq!(store.total_rows(), 3);
}

#[test]
fn full_history_refuses_a_user_with_nothing_to_evict() {
    let mut store = InMemoryHistory::new(1);
    let owner = Uuid::new_v4();
    store
        .append_reading(VitalRecord::from_reading(owner, &reading_at(0, 70, 120, 80)))
        .unwrap();
    let err = store
        .append_reading(VitalRecord::from_reading(Uuid::new_v4(), &reading_at(1, 70, 120, 80)))
        .unwrap_err();
    assert!(matches!(err, HistoryError::Full(1)));
    assert_eq!(store.recent_readings(owner, 10).unwrap().len(), 1);

    let mut empty = InMemoryHistory::new(0);
    assert!(empty
        .append_reading(VitalRecord::from_reading(owner, &reading_at(0, 70, 120, 80)))
        .is_err());
}

proptest! {
    #[test]
    fn window_never_exceeds_capacity(cap in 0usize..80, pushes in 0usize..200) {
        let mut window = ReadingWindow::with_capacity(cap);
        for i in 0..pushes {
            window.push(reading_at(i as i64, 70, 120, 80));
        }
        prop_assert!(window.len() <= cap);
        prop_assert_eq!(window.len() + window.dropped(), pushes);
    }

    #[test]
    fn limits_clamp_into_band(raw in -500i32..500) {
        let v = HEART_RATE_LIMITS.clamp(raw);
        prop_assert!(HEART_RATE_LIMITS.contains(v));
    }
}
