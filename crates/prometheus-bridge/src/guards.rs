use crate::MonitorMetrics;
use afya_core::{Assessment, Status};

/// True when `current` is more severe than `previous`; every such rise is
/// counted. The first assessment never counts as an escalation.
pub fn status_escalated(
    metrics: &MonitorMetrics,
    previous: Option<Status>,
    current: &Assessment,
) -> bool {
    let escalated = previous.is_some_and(|before| current.status() > before);
    if escalated {
        metrics.status_escalations_total.inc();
    }
    escalated
}
