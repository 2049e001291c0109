use crate::features::{sigmoid, FeatureVector};
use crate::model::HypertensionModel;

/// Feature-importance weights of the forest stand-in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestWeights {
    pub age: f64,
    pub bmi: f64,
    pub systolic: f64,
    pub diastolic: f64,
    pub heart_rate: f64,
    pub gender: f64,
}

pub const RANDOM_FOREST_WEIGHTS: ForestWeights = ForestWeights {
    age: 0.18,
    bmi: 0.14,
    systolic: 0.28,
    diastolic: 0.22,
    heart_rate: 0.12,
    gender: 0.06,
};

const SCORE_OFFSET: f64 = 0.3;

/// Importance-weighted score scaled by blood-pressure, age and BMI risk
/// multipliers. Served under the "random_forest" model name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomForestModel {
    pub weights: ForestWeights,
}

impl Default for RandomForestModel {
    fn default() -> Self {
        Self {
            weights: RANDOM_FOREST_WEIGHTS,
        }
    }
}

impl RandomForestModel {
    pub fn weighted_score(&self, features: &FeatureVector) -> f64 {
        let w = &self.weights;
        let s = features.scaled();
        s.age * w.age
            + s.bmi * w.bmi
            + s.systolic * w.systolic
            + s.diastolic * w.diastolic
            + s.heart_rate * w.heart_rate
            + s.gender * w.gender
    }

    pub fn risk_multiplier(features: &FeatureVector) -> f64 {
        let mut multiplier = if features.systolic >= 140.0 || features.diastolic >= 90.0 {
            1.8
        } else if features.systolic >= 130.0 || features.diastolic >= 80.0 {
            1.4
        } else if features.systolic >= 120.0 {
            1.15
        } else {
            1.0
        };

        if features.age >= 60.0 {
            multiplier *= 1.2;
        } else if features.age >= 45.0 {
            multiplier *= 1.1;
        }

        if features.bmi >= 30.0 {
            multiplier *= 1.25;
        } else if features.bmi >= 25.0 {
            multiplier *= 1.1;
        }

        multiplier
    }
}

impl HypertensionModel for RandomForestModel {
    fn name(&self) -> &str {
        "random_forest"
    }

    fn probability(&self, features: &FeatureVector) -> f64 {
        let adjusted = self.weighted_score(features) * Self::risk_multiplier(features);
        sigmoid(adjusted + SCORE_OFFSET)
    }
}
