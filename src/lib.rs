pub mod cli;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod monitoring;
pub mod notifications;
pub mod scheduler;

// Re-exports
pub use config::Settings;
pub use dashboard::start_dashboard;
pub use errors::{MonitorError, MonitorResult};
pub use monitoring::{NetworkMonitor, NetworkStats, Sample};
pub use notifications::{Capability, Notification, NotificationDispatcher};
pub type AsyncMutex<T> = tokio::sync::Mutex<T>;
