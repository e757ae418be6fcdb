pub mod dispatcher;
pub mod sinks;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::NotifyError;
use crate::monitoring::rules::{AlertRule, Severity};

pub use dispatcher::NotificationDispatcher;
pub use sinks::{ChannelSink, FanoutSink, LogSink, MemorySink};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub severity: Severity,
    pub rule_id: String,
    pub title: String,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Notification {
    pub fn from_rule(rule: &AlertRule, value: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            severity: rule.severity,
            rule_id: rule.id.clone(),
            title: rule.title.clone(),
            message: rule.render(value),
            raised_at: Utc::now(),
        }
    }
}

/// Somewhere a notification can be shown: a log, a toast surface, a desktop popup.
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Whether the host can show notifications at all. Injected, never probed.
#[derive(Clone, Default)]
pub enum Capability {
    Available(Arc<dyn NotificationSink>),
    #[default]
    Unavailable,
}

impl Capability {
    pub fn available<S: NotificationSink + 'static>(sink: S) -> Self {
        Capability::Available(Arc::new(sink))
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available(_))
    }

    /// Delivery on an unavailable capability is a silent no-op.
    pub fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        match self {
            Capability::Available(sink) => sink.deliver(notification),
            Capability::Unavailable => Ok(()),
        }
    }
}

impl std::fmt::Debug for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Available(_) => write!(f, "Capability::Available"),
            Capability::Unavailable => write!(f, "Capability::Unavailable"),
        }
    }
}

/// Bounded feed of recent notifications, newest last.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    entries: VecDeque<Notification>,
    capacity: usize,
}

impl NotificationCenter {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, notification: Notification) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(notification);
    }

    pub fn extend<I: IntoIterator<Item = Notification>>(&mut self, notifications: I) {
        for notification in notifications {
            self.push(notification);
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Notification> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn count_for(&self, rule_id: &str) -> usize {
        self.entries.iter().filter(|n| n.rule_id == rule_id).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_drops_oldest_when_full() {
        let rule = AlertRule::weak_signal(30.0);
        let mut center = NotificationCenter::new(2);
        center.extend((0..3).map(|v| Notification::from_rule(&rule, v as f64)));

        assert_eq!(center.len(), 2);
        let messages: Vec<_> = center.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Signal strength dropped to 1.0% (below 30.0%)",
                "Signal strength dropped to 2.0% (below 30.0%)",
            ]
        );
    }

    #[test]
    fn unavailable_capability_swallows_delivery() {
        let rule = AlertRule::weak_signal(30.0);
        let capability = Capability::Unavailable;
        assert!(!capability.is_available());
        assert!(capability.deliver(&Notification::from_rule(&rule, 5.0)).is_ok());
    }
}
