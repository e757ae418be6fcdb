use tracing::debug;

use super::{Capability, Notification};
use crate::errors::{log_degraded, MonitorError};
use crate::monitoring::metrics::NetworkStats;
use crate::monitoring::rules::{AlertRule, RuleTable};

/// Turns snapshot changes into user-facing notifications.
///
/// Every rule is checked on every call and each satisfied rule raises one
/// notification. There is no debounce.
#[derive(Debug)]
pub struct NotificationDispatcher {
    rules: RuleTable,
    capability: Capability,
}

impl NotificationDispatcher {
    pub fn new(rules: RuleTable, capability: Capability) -> Self {
        Self { rules, capability }
    }

    pub fn with_capability(capability: Capability) -> Self {
        Self::new(RuleTable::dispatch_defaults(), capability)
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn dispatch(&self, stats: &NetworkStats) -> Vec<Notification> {
        let raised: Vec<Notification> = self
            .rules
            .matches(stats)
            .map(|hit| self.raise(hit.rule, hit.value))
            .collect();

        if !raised.is_empty() {
            debug!(count = raised.len(), "Dispatched notifications");
        }
        raised
    }

    /// Build a notification for `rule` and hand it to the capability.
    pub fn raise(&self, rule: &AlertRule, value: f64) -> Notification {
        let notification = Notification::from_rule(rule, value);
        if let Err(e) = self.capability.deliver(&notification) {
            log_degraded(&MonitorError::from(e), "deliver notification");
        }
        notification
    }
}
