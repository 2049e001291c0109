use afya_core::{Assessment, Reading};
use prometheus::{
    register_gauge_vec_with_registry, register_gauge_with_registry,
    register_int_counter_vec_with_registry, register_int_counter_with_registry, Encoder, Gauge,
    GaugeVec, IntCounter, IntCounterVec, Registry, TextEncoder,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus: {0}")]
    Prometheus(#[from] prometheus::Error),
    #[error("metrics text is not utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Series published by the monitor. Registered on a caller-owned registry so
/// several monitors (and tests) do not collide on the global one.
pub struct MonitorMetrics {
    pub heart_rate_bpm: Gauge,
    pub systolic_mmhg: Gauge,
    pub diastolic_mmhg: Gauge,
    pub risk_score: GaugeVec,
    pub readings_total: IntCounter,
    pub assessments_total: IntCounterVec,
    pub scoring_fallbacks_total: IntCounterVec,
    pub status_escalations_total: IntCounter,
}

impl MonitorMetrics {
    pub fn new(registry: &Registry) -> Result<Self, MetricsError> {
        let heart_rate_bpm = register_gauge_with_registry!(
            "afya_heart_rate_bpm",
            "Heart rate of the latest reading",
            registry
        )?;

        let systolic_mmhg = register_gauge_with_registry!(
            "afya_systolic_mmhg",
            "Systolic pressure of the latest reading",
            registry
        )?;

        let diastolic_mmhg = register_gauge_with_registry!(
            "afya_diastolic_mmhg",
            "Diastolic pressure of the latest reading",
            registry
        )?;

        let risk_score = register_gauge_vec_with_registry!(
            "afya_risk_score",
            "Risk score of the latest assessment per source",
            &["source"],
            registry
        )?;

        let readings_total = register_int_counter_with_registry!(
            "afya_readings_total",
            "Readings received from the device",
            registry
        )?;

        let assessments_total = register_int_counter_vec_with_registry!(
            "afya_assessments_total",
            "Assessments produced, by status and source",
            &["status", "source"],
            registry
        )?;

        let scoring_fallbacks_total = register_int_counter_vec_with_registry!(
            "afya_scoring_fallbacks_total",
            "Remote scoring failures replaced by local computation",
            &["kind"],
            registry
        )?;

        let status_escalations_total = register_int_counter_with_registry!(
            "afya_status_escalations_total",
            "Assessments more severe than the one before",
            registry
        )?;

        Ok(Self {
            heart_rate_bpm,
            systolic_mmhg,
            diastolic_mmhg,
            risk_score,
            readings_total,
            assessments_total,
            scoring_fallbacks_total,
            status_escalations_total,
        })
    }

    pub fn observe_reading(&self, reading: &Reading) {
        self.heart_rate_bpm.set(f64::from(reading.heart_rate));
        self.systolic_mmhg.set(f64::from(reading.systolic));
        self.diastolic_mmhg.set(f64::from(reading.diastolic));
        self.readings_total.inc();
    }

    pub fn observe_assessment(&self, assessment: &Assessment) {
        let source = assessment.source();
        self.risk_score
            .with_label_values(&[source])
            .set(f64::from(assessment.risk_score()));
        self.assessments_total
            .with_label_values(&[assessment.status().as_str(), source])
            .inc();
    }

    /// `kind` is "analysis" or "prediction".
    pub fn record_fallback(&self, kind: &str) {
        self.scoring_fallbacks_total.with_label_values(&[kind]).inc();
    }
}

/// Text exposition format of everything on `registry`.
pub fn render(registry: &Registry) -> Result<String, MetricsError> {
    let mut buf = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buf)?;
    Ok(String::from_utf8(buf)?)
}
