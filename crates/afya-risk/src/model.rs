use crate::features::FeatureVector;
use crate::forest::RandomForestModel;
use crate::interpret::{interpret, round3};
use crate::logistic::LogisticModel;
use afya_core::{ModelOutput, PredictionResult, Profile, Reading};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A hypertension scorer over the six-feature vector.
pub trait HypertensionModel {
    fn name(&self) -> &str;

    fn probability(&self, features: &FeatureVector) -> f64;

    fn output(&self, features: &FeatureVector) -> ModelOutput {
        let probability = self.probability(features);
        ModelOutput {
            prediction: u8::from(probability >= 0.5),
            probability,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    RandomForest,
    #[default]
    Xgboost,
    Ensemble,
}

impl ModelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::RandomForest => "random_forest",
            ModelKind::Xgboost => "xgboost",
            ModelKind::Ensemble => "ensemble",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "random_forest" | "rf" => Ok(ModelKind::RandomForest),
            "xgboost" | "xgb" | "logistic" => Ok(ModelKind::Xgboost),
            "ensemble" => Ok(ModelKind::Ensemble),
            other => Err(format!(
                "unknown model: {other}. Use 'random_forest', 'xgboost' or 'ensemble'."
            )),
        }
    }
}

/// Hypertension prediction with the default ("xgboost") model.
pub fn predict(readings: &[Reading], profile: Option<&Profile>) -> PredictionResult {
    predict_with(ModelKind::default(), readings, profile, Utc::now())
}

/// Runs `kind` over the window. An empty window yields the fixed no-data
/// result without touching any model.
pub fn predict_with(
    kind: ModelKind,
    readings: &[Reading],
    profile: Option<&Profile>,
    now: DateTime<Utc>,
) -> PredictionResult {
    let Some(features) = FeatureVector::from_readings(readings, profile) else {
        return PredictionResult::no_data(now);
    };

    match kind {
        ModelKind::RandomForest => {
            let out = RandomForestModel::default().output(&features);
            interpret(out.prediction, out.probability, kind.as_str(), &features, now)
        }
        ModelKind::Xgboost => {
            let out = LogisticModel::default().output(&features);
            interpret(out.prediction, out.probability, kind.as_str(), &features, now)
        }
        ModelKind::Ensemble => {
            let forest = RandomForestModel::default();
            let logistic = LogisticModel::default();
            let rf = forest.output(&features);
            let xgb = logistic.output(&features);

            let probability = (rf.probability + xgb.probability) / 2.0;
            let prediction = u8::from(probability >= 0.5);
            let mut result = interpret(prediction, probability, kind.as_str(), &features, now);

            let individual: BTreeMap<String, ModelOutput> = [(forest.name(), rf), (logistic.name(), xgb)]
                .into_iter()
                .map(|(name, out)| {
                    (
                        name.to_string(),
                        ModelOutput {
                            prediction: out.prediction,
                            probability: round3(out.probability),
                        },
                    )
                })
                .collect();
            result.individual_results = Some(individual);
            result
        }
    }
}
