use crate::interpret::{risk_score, CRITICAL_PROBABILITY, WARNING_PROBABILITY};
use afya_core::{Insight, PredictionResult, Reading, Status, VitalStats, MODEL_VERSION};
use chrono::{DateTime, Utc};

pub const FALLBACK_MODEL: &str = "fallback";
const FALLBACK_NOTE: &str = "Fallback prediction - ML service unavailable.";

/// Threshold probability used when the prediction service cannot be reached.
pub fn fallback_prediction(readings: &[Reading], now: DateTime<Utc>) -> PredictionResult {
    let Some(stats) = VitalStats::from_readings(readings) else {
        return PredictionResult::no_data(now);
    };
    let (sys, dia, hr) = (stats.mean_systolic, stats.mean_diastolic, stats.mean_heart_rate);

    let mut factors = Vec::new();
    let mut probability = if sys >= 180.0 || dia >= 120.0 {
        factors.push("Hypertensive crisis".to_string());
        0.95
    } else if sys >= 140.0 || dia >= 90.0 {
        factors.push("Stage 2 hypertension".to_string());
        0.75
    } else if sys >= 130.0 || dia >= 80.0 {
        factors.push("Stage 1 hypertension".to_string());
        0.55
    } else if sys >= 120.0 {
        factors.push("Elevated blood pressure".to_string());
        0.35
    } else {
        factors.push("Normal blood pressure".to_string());
        0.2
    };

    if hr > 100.0 {
        probability = f64::min(probability + 0.1, 1.0);
        factors.push("Elevated heart rate".to_string());
    }

    let score = risk_score(probability);
    let (status, summary, recommendation) = if probability >= CRITICAL_PROBABILITY {
        (
            Status::Critical,
            format!("High hypertension risk ({score}%)."),
            "Consult a healthcare provider immediately.",
        )
    } else if probability >= WARNING_PROBABILITY {
        (
            Status::Warning,
            format!("Elevated hypertension risk ({score}%)."),
            "Consider scheduling a health checkup.",
        )
    } else {
        (
            Status::Normal,
            format!("Low hypertension risk ({score}%)."),
            "Continue maintaining your healthy lifestyle.",
        )
    };

    PredictionResult {
        insight: Insight {
            status,
            summary,
            recommendation: recommendation.to_string(),
            risk_score: score,
            factors,
            insights: Some(FALLBACK_NOTE.to_string()),
            timestamp: now,
        },
        prediction: u8::from(probability >= 0.5),
        probability,
        model: FALLBACK_MODEL.to_string(),
        features: None,
        individual_results: None,
        version: MODEL_VERSION.to_string(),
    }
}
