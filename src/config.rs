pub mod settings;

pub use settings::{
    DashboardSettings, MonitoringSettings, NotificationSettings, SampleSettings, Settings,
    SignalAlertPolicy, ThresholdSettings,
};
