use crate::profile::Gender;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const NO_DATA_RECOMMENDATION: &str = "Connect your wristband to start monitoring.";
pub const MODEL_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Normal,
    Warning,
    Critical,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Normal => "normal",
            Status::Warning => "warning",
            Status::Critical => "critical",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable risk assessment for a window of readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub status: Status,
    pub summary: String,
    pub recommendation: String,
    pub risk_score: u8,
    #[serde(default)]
    pub factors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl Insight {
    /// Zero-risk placeholder returned when there is nothing to score.
    pub fn no_data(summary: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            status: Status::Normal,
            summary: summary.to_string(),
            recommendation: NO_DATA_RECOMMENDATION.to_string(),
            risk_score: 0,
            factors: Vec::new(),
            insights: None,
            timestamp,
        }
    }
}

/// Feature values a model actually saw, after profile defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSnapshot {
    pub age: f64,
    pub bmi: f64,
    pub systolic: f64,
    pub diastolic: f64,
    pub heart_rate: f64,
    pub gender: Gender,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    pub prediction: u8,
    pub probability: f64,
}

/// Insight plus the binary hypertension prediction that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    #[serde(flatten)]
    pub insight: Insight,
    pub prediction: u8,
    pub probability: f64,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub individual_results: Option<BTreeMap<String, ModelOutput>>,
    pub version: String,
}

impl PredictionResult {
    pub fn no_data(timestamp: DateTime<Utc>) -> Self {
        Self {
            insight: Insight::no_data("No readings available for prediction.", timestamp),
            prediction: 0,
            probability: 0.0,
            model: "none".to_string(),
            features: None,
            individual_results: None,
            version: MODEL_VERSION.to_string(),
        }
    }
}

/// Where an assessment came from, with the model-specific extension where
/// there is one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum Assessment {
    /// Local threshold rules.
    Rule(Insight),
    /// Remote analysis service.
    Ai(Insight),
    /// Hypertension model output. `generated` is false when the local
    /// fallback stood in for the model.
    Ml {
        result: PredictionResult,
        generated: bool,
    },
}

impl Assessment {
    pub fn insight(&self) -> &Insight {
        match self {
            Assessment::Rule(insight) | Assessment::Ai(insight) => insight,
            Assessment::Ml { result, .. } => &result.insight,
        }
    }

    pub fn into_insight(self) -> Insight {
        match self {
            Assessment::Rule(insight) | Assessment::Ai(insight) => insight,
            Assessment::Ml { result, .. } => result.insight,
        }
    }

    pub fn status(&self) -> Status {
        self.insight().status
    }

    pub fn risk_score(&self) -> u8 {
        self.insight().risk_score
    }

    pub fn ai_generated(&self) -> bool {
        matches!(self, Assessment::Ai(_))
    }

    pub fn ml_generated(&self) -> bool {
        matches!(self, Assessment::Ml { generated: true, .. })
    }

    pub fn prediction(&self) -> Option<&PredictionResult> {
        match self {
            Assessment::Ml { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Assessment::Rule(_) => "rules",
            Assessment::Ai(_) => "remote",
            Assessment::Ml { result, .. } => &result.model,
        }
    }

    /// Short label for logs and metric series.
    pub fn source(&self) -> &'static str {
        match self {
            Assessment::Rule(_) => "rules",
            Assessment::Ai(_) => "ai",
            Assessment::Ml { generated: true, .. } => "ml",
            Assessment::Ml { generated: false, .. } => "ml_fallback",
        }
    }
}
