use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Configuration Error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Notification Error: {0}")]
    NotifyError(#[from] NotifyError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notification channel closed")]
    ChannelClosed,

    #[error("Sink rejected notification {id}: {reason}")]
    Rejected {
        id: uuid::Uuid,
        reason: String,
    },
}

pub type MonitorResult<T> = Result<T, MonitorError>;

/// Log a failure that the caller chose to swallow.
pub fn log_degraded(error: &MonitorError, operation: &str) {
    warn!(
        error = error.to_string(),
        operation,
        "Operation degraded, continuing"
    );
}
