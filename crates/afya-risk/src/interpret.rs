use crate::features::FeatureVector;
use afya_core::{Insight, PredictionResult, Status, MODEL_VERSION};
use chrono::{DateTime, Utc};

pub const CRITICAL_PROBABILITY: f64 = 0.75;
pub const WARNING_PROBABILITY: f64 = 0.5;
pub const MODERATE_PROBABILITY: f64 = 0.3;

pub(crate) fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// `round(probability * 100)` clamped into 0..=100.
pub fn risk_score(probability: f64) -> u8 {
    (probability * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Factors read off the raw feature values.
pub fn contributing_factors(features: &FeatureVector) -> Vec<String> {
    let mut factors = Vec::new();

    if features.systolic >= 140.0 || features.diastolic >= 90.0 {
        factors.push("High blood pressure (Stage 2)".to_string());
    } else if features.systolic >= 130.0 || features.diastolic >= 80.0 {
        factors.push("Elevated blood pressure (Stage 1)".to_string());
    }

    if features.age >= 60.0 {
        factors.push("Age-related risk factor".to_string());
    }

    if features.bmi >= 30.0 {
        factors.push("Obesity (BMI ≥ 30)".to_string());
    } else if features.bmi >= 25.0 {
        factors.push("Overweight (BMI 25-30)".to_string());
    }

    if features.heart_rate > 100.0 {
        factors.push("Elevated heart rate".to_string());
    }

    factors
}

/// Turns a model probability into the user-facing prediction result.
pub fn interpret(
    prediction: u8,
    probability: f64,
    model: &str,
    features: &FeatureVector,
    now: DateTime<Utc>,
) -> PredictionResult {
    let score = risk_score(probability);
    let mut factors = contributing_factors(features);

    let (status, summary, recommendation) = if probability >= CRITICAL_PROBABILITY {
        (
            Status::Critical,
            format!("High hypertension risk detected ({score}% probability). Multiple risk factors present."),
            "Immediate consultation with a healthcare provider is recommended. Monitor blood pressure regularly and consider lifestyle modifications.",
        )
    } else if probability >= WARNING_PROBABILITY {
        (
            Status::Warning,
            format!("Elevated hypertension risk detected ({score}% probability). Some risk factors identified."),
            "Consider scheduling a health checkup. Focus on diet, exercise, and stress management. Monitor blood pressure regularly.",
        )
    } else if probability >= MODERATE_PROBABILITY {
        (
            Status::Warning,
            format!("Moderate risk indicators present ({score}% probability). Stay vigilant."),
            "Maintain healthy lifestyle habits. Regular monitoring recommended. Consider reducing salt intake and increasing physical activity.",
        )
    } else {
        if factors.is_empty() {
            factors.push("Normal blood pressure".to_string());
            factors.push("Healthy indicators".to_string());
        }
        (
            Status::Normal,
            format!("Low hypertension risk ({score}% probability). Vital signs appear healthy."),
            "Continue maintaining your healthy lifestyle. Stay active, eat balanced meals, and monitor periodically.",
        )
    };

    PredictionResult {
        insight: Insight {
            status,
            summary,
            recommendation: recommendation.to_string(),
            risk_score: score,
            factors,
            insights: None,
            timestamp: now,
        },
        prediction,
        probability: round3(probability),
        model: model.to_string(),
        features: Some(features.snapshot()),
        individual_results: None,
        version: MODEL_VERSION.to_string(),
    }
}
