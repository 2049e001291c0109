use afya_core::{FeatureSnapshot, Gender, Profile, Reading, VitalStats};

/// z-score parameters of one model input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZScore {
    pub mean: f64,
    pub std: f64,
}

impl ZScore {
    pub const fn new(mean: f64, std: f64) -> Self {
        Self { mean, std }
    }

    pub fn scale(self, value: f64) -> f64 {
        (value - self.mean) / self.std
    }
}

pub const AGE_SCALER: ZScore = ZScore::new(54.5, 18.2);
pub const BMI_SCALER: ZScore = ZScore::new(27.5, 6.8);
pub const SYSTOLIC_SCALER: ZScore = ZScore::new(135.0, 28.5);
pub const DIASTOLIC_SCALER: ZScore = ZScore::new(82.0, 15.2);
pub const HEART_RATE_SCALER: ZScore = ZScore::new(72.0, 12.5);
pub const GENDER_SCALER: ZScore = ZScore::new(0.5, 0.5);

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// The six model inputs: Age, BMI, Systolic_BP, Diastolic_BP, Heart_Rate,
/// Gender (1 for male, 0 otherwise). Pressures and heart rate are window
/// means.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub age: f64,
    pub bmi: f64,
    pub systolic: f64,
    pub diastolic: f64,
    pub heart_rate: f64,
    pub gender: f64,
}

/// Same vector after standardisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledFeatures {
    pub age: f64,
    pub bmi: f64,
    pub systolic: f64,
    pub diastolic: f64,
    pub heart_rate: f64,
    pub gender: f64,
}

impl FeatureVector {
    /// `None` for an empty window.
    pub fn from_readings(readings: &[Reading], profile: Option<&Profile>) -> Option<Self> {
        let stats = VitalStats::from_readings(readings)?;
        Some(Self::from_stats(&stats, profile))
    }

    pub fn from_stats(stats: &VitalStats, profile: Option<&Profile>) -> Self {
        let default_profile = Profile::default();
        let profile = profile.unwrap_or(&default_profile);
        Self {
            age: profile.effective_age() as f64,
            bmi: profile.effective_bmi(),
            systolic: stats.mean_systolic,
            diastolic: stats.mean_diastolic,
            heart_rate: stats.mean_heart_rate,
            gender: if profile.is_male() { 1.0 } else { 0.0 },
        }
    }

    pub fn scaled(&self) -> ScaledFeatures {
        ScaledFeatures {
            age: AGE_SCALER.scale(self.age),
            bmi: BMI_SCALER.scale(self.bmi),
            systolic: SYSTOLIC_SCALER.scale(self.systolic),
            diastolic: DIASTOLIC_SCALER.scale(self.diastolic),
            heart_rate: HEART_RATE_SCALER.scale(self.heart_rate),
            gender: GENDER_SCALER.scale(self.gender),
        }
    }

    pub fn is_male(&self) -> bool {
        self.gender >= 0.5
    }

    pub fn snapshot(&self) -> FeatureSnapshot {
        FeatureSnapshot {
            age: self.age,
            bmi: self.bmi,
            systolic: self.systolic,
            diastolic: self.diastolic,
            heart_rate: self.heart_rate,
            gender: if self.is_male() { Gender::Male } else { Gender::Female },
        }
    }
}
