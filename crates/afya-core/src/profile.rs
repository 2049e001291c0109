use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_AGE: u32 = 45;
pub const DEFAULT_BMI: f64 = 25.0;

const PLAUSIBLE_AGE: std::ops::RangeInclusive<u32> = 0..=150;
const PLAUSIBLE_BMI: std::ops::RangeInclusive<f64> = 10.0..=100.0;
const PLAUSIBLE_WEIGHT_KG: std::ops::RangeInclusive<f64> = 20.0..=500.0;
const PLAUSIBLE_HEIGHT_CM: std::ops::RangeInclusive<f64> = 50.0..=300.0;

/// Self-reported gender. Anything that is not "male" or "female" (in any
/// case) is kept as `Other` instead of being rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl From<&str> for Gender {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "male" => Gender::Male,
            "female" => Gender::Female,
            _ => Gender::Other,
        }
    }
}

impl From<String> for Gender {
    fn from(raw: String) -> Self {
        Gender::from(raw.as_str())
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        };
        f.write_str(label)
    }
}

/// Optional static profile supplied alongside a reading window.
///
/// Missing or implausible fields fall back to population defaults; the
/// profile is never rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, rename = "weight", skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(default, rename = "height", skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
}

impl Profile {
    pub fn effective_age(&self) -> u32 {
        self.age
            .filter(|age| PLAUSIBLE_AGE.contains(age))
            .unwrap_or(DEFAULT_AGE)
    }

    /// Explicit BMI first, then weight/height, then the default.
    pub fn effective_bmi(&self) -> f64 {
        if let Some(bmi) = self.bmi.filter(|b| PLAUSIBLE_BMI.contains(b)) {
            return bmi;
        }
        self.derived_bmi().unwrap_or(DEFAULT_BMI)
    }

    pub fn is_male(&self) -> bool {
        self.gender == Some(Gender::Male)
    }

    fn derived_bmi(&self) -> Option<f64> {
        let weight = self.weight_kg.filter(|w| PLAUSIBLE_WEIGHT_KG.contains(w))?;
        let height_m = self.height_cm.filter(|h| PLAUSIBLE_HEIGHT_CM.contains(h))? / 100.0;
        let bmi = weight / (height_m * height_m);
        PLAUSIBLE_BMI.contains(&bmi).then_some(bmi)
    }
}
