pub mod guards;
pub mod metrics;


pub use guards::status_escalated;
pub use metrics::{render, MetricsError, MonitorMetrics};
