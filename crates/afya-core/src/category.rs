use serde::{Deserialize, Serialize};
use std::fmt;

/// Blood-pressure band for a pair of (mean) pressures, checked from the most
/// severe band down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloodPressureCategory {
    Low,
    Normal,
    Elevated,
    Stage1,
    Stage2,
    Crisis,
}

impl BloodPressureCategory {
    pub fn classify(systolic: f64, diastolic: f64) -> Self {
        if systolic >= 180.0 || diastolic >= 120.0 {
            BloodPressureCategory::Crisis
        } else if systolic >= 140.0 || diastolic >= 90.0 {
            BloodPressureCategory::Stage2
        } else if systolic >= 130.0 || diastolic >= 80.0 {
            BloodPressureCategory::Stage1
        } else if systolic < 90.0 || diastolic < 60.0 {
            BloodPressureCategory::Low
        } else if systolic >= 120.0 {
            BloodPressureCategory::Elevated
        } else {
            BloodPressureCategory::Normal
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BloodPressureCategory::Low => "Low blood pressure",
            BloodPressureCategory::Normal => "Normal blood pressure",
            BloodPressureCategory::Elevated => "Elevated blood pressure",
            BloodPressureCategory::Stage1 => "Stage 1 hypertension",
            BloodPressureCategory::Stage2 => "Stage 2 hypertension",
            BloodPressureCategory::Crisis => "Hypertensive crisis",
        }
    }
}

impl fmt::Display for BloodPressureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
