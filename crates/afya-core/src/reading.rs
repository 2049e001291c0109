use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive physiological band for one vital sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VitalLimits {
    pub min: i32,
    pub max: i32,
}

impl VitalLimits {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn clamp(self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(self, value: i32) -> bool {
        value >= self.min && value <= self.max
    }
}

pub const HEART_RATE_LIMITS: VitalLimits = VitalLimits::new(45, 180);
pub const SYSTOLIC_LIMITS: VitalLimits = VitalLimits::new(90, 190);
pub const DIASTOLIC_LIMITS: VitalLimits = VitalLimits::new(60, 120);

/// One wristband sample. Heart rate in bpm, pressures in mmHg.
///
/// Serialized with camelCase keys and an epoch-millisecond timestamp, which is
/// the shape the scoring endpoints accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub heart_rate: u16,
    pub systolic: u16,
    pub diastolic: u16,
}

impl Reading {
    pub fn new(timestamp: DateTime<Utc>, heart_rate: u16, systolic: u16, diastolic: u16) -> Self {
        Self {
            timestamp,
            heart_rate,
            systolic,
            diastolic,
        }
    }

    pub fn within_physiological_limits(&self) -> bool {
        HEART_RATE_LIMITS.contains(self.heart_rate as i32)
            && SYSTOLIC_LIMITS.contains(self.systolic as i32)
            && DIASTOLIC_LIMITS.contains(self.diastolic as i32)
    }

    pub fn pulse_pressure(&self) -> i32 {
        self.systolic as i32 - self.diastolic as i32
    }
}
