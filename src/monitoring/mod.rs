pub mod anomaly_detection;
pub mod metrics;
pub mod monitor;
pub mod rules;
pub mod signal;

pub use anomaly_detection::{Anomaly, AnomalyDetector};
pub use metrics::{MetricsGenerator, NetworkStats, Sample};
pub use monitor::{NetworkMonitor, TickOutcome, TickPipeline};
pub use rules::{AlertRule, Comparison, Metric, MetricSource, RuleTable, Severity};
pub use signal::SignalWatch;
