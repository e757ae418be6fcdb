use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::{Notification, NotificationSink};
use crate::errors::NotifyError;
use crate::monitoring::rules::Severity;

/// Writes every notification to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn deliver(&self, n: &Notification) -> Result<(), NotifyError> {
        match n.severity {
            Severity::Error => error!(rule = %n.rule_id, title = %n.title, "{}", n.message),
            Severity::Warning => warn!(rule = %n.rule_id, title = %n.title, "{}", n.message),
            Severity::Info | Severity::Success => {
                info!(rule = %n.rule_id, title = %n.title, "{}", n.message)
            }
        }
        Ok(())
    }
}

/// Forwards notifications to a receiver, e.g. the dashboard's toast feed.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn deliver(&self, n: &Notification) -> Result<(), NotifyError> {
        self.tx
            .send(n.clone())
            .map_err(|_| NotifyError::ChannelClosed)
    }
}

/// Keeps everything it is given. Clones share storage.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    delivered: Arc<Mutex<Vec<Notification>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn count(&self) -> usize {
        self.delivered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn count_for(&self, rule_id: &str) -> usize {
        self.delivered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|n| n.rule_id == rule_id)
            .count()
    }
}

impl NotificationSink for MemorySink {
    fn deliver(&self, n: &Notification) -> Result<(), NotifyError> {
        self.delivered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(n.clone());
        Ok(())
    }
}

/// Sends to every inner sink; the first failure is reported after all have been tried.
pub struct FanoutSink {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Box<dyn NotificationSink>>) -> Self {
        Self { sinks }
    }
}

impl NotificationSink for FanoutSink {
    fn deliver(&self, n: &Notification) -> Result<(), NotifyError> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.deliver(n) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
