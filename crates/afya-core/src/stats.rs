use crate::reading::Reading;
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Summary statistics over a window of readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalStats {
    pub count: usize,
    pub mean_heart_rate: f64,
    pub mean_systolic: f64,
    pub mean_diastolic: f64,
    pub min_heart_rate: u16,
    pub max_heart_rate: u16,
    pub min_systolic: u16,
    pub max_systolic: u16,
    pub min_diastolic: u16,
    pub max_diastolic: u16,
    pub duration_ms: i64,
}

impl VitalStats {
    pub fn from_readings(readings: &[Reading]) -> Option<Self> {
        let first = readings.first()?;
        let last = readings.last()?;
        let n = readings.len() as f64;

        let mut stats = Self {
            count: readings.len(),
            mean_heart_rate: 0.0,
            mean_systolic: 0.0,
            mean_diastolic: 0.0,
            min_heart_rate: u16::MAX,
            max_heart_rate: u16::MIN,
            min_systolic: u16::MAX,
            max_systolic: u16::MIN,
            min_diastolic: u16::MAX,
            max_diastolic: u16::MIN,
            duration_ms: (last.timestamp - first.timestamp).num_milliseconds(),
        };

        let (mut hr_sum, mut sys_sum, mut dia_sum) = (0.0, 0.0, 0.0);
        for r in readings {
            hr_sum += r.heart_rate as f64;
            sys_sum += r.systolic as f64;
            dia_sum += r.diastolic as f64;
            stats.min_heart_rate = stats.min_heart_rate.min(r.heart_rate);
            stats.max_heart_rate = stats.max_heart_rate.max(r.heart_rate);
            stats.min_systolic = stats.min_systolic.min(r.systolic);
            stats.max_systolic = stats.max_systolic.max(r.systolic);
            stats.min_diastolic = stats.min_diastolic.min(r.diastolic);
            stats.max_diastolic = stats.max_diastolic.max(r.diastolic);
        }
        stats.mean_heart_rate = hr_sum / n;
        stats.mean_systolic = sys_sum / n;
        stats.mean_diastolic = dia_sum / n;

        Some(stats)
    }

    /// Spread between the fastest and slowest heart rate in the window.
    pub fn heart_rate_variability(&self) -> u16 {
        self.max_heart_rate - self.min_heart_rate
    }

    pub fn monitoring_duration(&self) -> Duration {
        Duration::milliseconds(self.duration_ms)
    }

    pub fn mean_pulse_pressure(&self) -> f64 {
        self.mean_systolic - self.mean_diastolic
    }
}
