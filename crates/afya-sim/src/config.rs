use serde::{Deserialize, Serialize};

/// Resting values the walk starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    pub heart_rate: i32,
    pub systolic: i32,
    pub diastolic: i32,
}

impl Default for Baseline {
    fn default() -> Self {
        Self {
            heart_rate: 72,
            systolic: 120,
            diastolic: 80,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub hr_drift_probability: f64,
    pub systolic_drift_probability: f64,
    pub diastolic_drift_probability: f64,
    pub tick_interval_ms: u64,
    pub initial: Baseline,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            hr_drift_probability: 0.10,
            systolic_drift_probability: 0.05,
            diastolic_drift_probability: 0.05,
            tick_interval_ms: 1_000,
            initial: Baseline::default(),
        }
    }
}

impl SimulatorConfig {
    /// Same walk with every drift branch pinned on or off.
    pub fn with_fixed_drift(drift: bool) -> Self {
        let p = if drift { 1.0 } else { 0.0 };
        Self {
            hr_drift_probability: p,
            systolic_drift_probability: p,
            diastolic_drift_probability: p,
            ..Self::default()
        }
    }

    /// Probabilities clamped into [0, 1]; NaN counts as "never".
    pub(crate) fn normalized(mut self) -> Self {
        for p in [
            &mut self.hr_drift_probability,
            &mut self.systolic_drift_probability,
            &mut self.diastolic_drift_probability,
        ] {
            *p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        }
        self
    }
}
