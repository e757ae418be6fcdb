use crate::config::SignalAlertPolicy;
use crate::notifications::{Notification, NotificationDispatcher};

use super::metrics::NetworkStats;
use super::rules::AlertRule;

/// Watches `signal_strength` across snapshots and raises the weak-signal alert.
///
/// Only a changed reading is considered. What counts as alert-worthy after
/// that depends on the [`SignalAlertPolicy`].
#[derive(Debug)]
pub struct SignalWatch {
    rule: AlertRule,
    policy: SignalAlertPolicy,
    last: Option<u8>,
}

impl SignalWatch {
    pub fn new(rule: AlertRule, policy: SignalAlertPolicy) -> Self {
        Self {
            rule,
            policy,
            last: None,
        }
    }

    pub fn policy(&self) -> SignalAlertPolicy {
        self.policy
    }

    pub fn observe(
        &mut self,
        stats: &NetworkStats,
        dispatcher: &NotificationDispatcher,
    ) -> Option<Notification> {
        let current = stats.signal_strength;
        let previous = self.last.replace(current);

        if previous == Some(current) {
            return None;
        }

        let value = f64::from(current);
        if !self.rule.is_violated(value) {
            return None;
        }

        let fire = match self.policy {
            SignalAlertPolicy::OnChange => true,
            SignalAlertPolicy::OnTransition => {
                previous.map_or(true, |p| !self.rule.is_violated(f64::from(p)))
            }
        };

        fire.then(|| dispatcher.raise(&self.rule, value))
    }
}
