use crate::features::{sigmoid, FeatureVector};
use crate::model::HypertensionModel;

/// Linear weights applied to the standardised features.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticCoefficients {
    pub intercept: f64,
    pub age: f64,
    pub bmi: f64,
    pub systolic: f64,
    pub diastolic: f64,
    pub heart_rate: f64,
    pub gender: f64,
}

pub const XGBOOST_COEFFICIENTS: LogisticCoefficients = LogisticCoefficients {
    intercept: -0.85,
    age: 0.022,
    bmi: 0.045,
    systolic: 0.058,
    diastolic: 0.048,
    heart_rate: 0.015,
    gender: 0.12,
};

/// `(threshold, bonus)` pairs, highest threshold first. A raw value strictly
/// above a threshold earns that bonus and stops the scan.
const SYSTOLIC_STEPS: [(f64, f64); 3] = [(160.0, 1.2), (140.0, 0.7), (130.0, 0.4)];
const DIASTOLIC_STEPS: [(f64, f64); 3] = [(100.0, 0.9), (90.0, 0.5), (80.0, 0.25)];
const AGE_STEPS: [(f64, f64); 2] = [(65.0, 0.5), (50.0, 0.25)];
const BMI_STEPS: [(f64, f64); 3] = [(35.0, 0.6), (30.0, 0.35), (27.0, 0.15)];
const HEART_RATE_STEPS: [(f64, f64); 2] = [(100.0, 0.3), (90.0, 0.15)];

fn step_bonus(value: f64, steps: &[(f64, f64)]) -> f64 {
    steps
        .iter()
        .find(|(threshold, _)| value > *threshold)
        .map(|(_, bonus)| *bonus)
        .unwrap_or(0.0)
}

/// Sigmoid of a linear combination plus tree-split style step bonuses.
/// Served under the "xgboost" model name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticModel {
    pub coefficients: LogisticCoefficients,
}

impl Default for LogisticModel {
    fn default() -> Self {
        Self {
            coefficients: XGBOOST_COEFFICIENTS,
        }
    }
}

impl LogisticModel {
    pub fn logit(&self, features: &FeatureVector) -> f64 {
        let c = &self.coefficients;
        let s = features.scaled();
        let linear = c.intercept
            + s.age * c.age
            + s.bmi * c.bmi
            + s.systolic * c.systolic
            + s.diastolic * c.diastolic
            + s.heart_rate * c.heart_rate
            + s.gender * c.gender;

        linear
            + step_bonus(features.systolic, &SYSTOLIC_STEPS)
            + step_bonus(features.diastolic, &DIASTOLIC_STEPS)
            + step_bonus(features.age, &AGE_STEPS)
            + step_bonus(features.bmi, &BMI_STEPS)
            + step_bonus(features.heart_rate, &HEART_RATE_STEPS)
    }
}

impl HypertensionModel for LogisticModel {
    fn name(&self) -> &str {
        "xgboost"
    }

    fn probability(&self, features: &FeatureVector) -> f64 {
        sigmoid(self.logit(features))
    }
}
