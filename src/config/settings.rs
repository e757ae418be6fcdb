/*
* Network Monitor Configuration
* -----------------------------
*
* Layered configuration, lowest to highest priority:
*
* 1. Hardcoded defaults (the `Default` impls below)
* 2. <config dir>/default.toml
* 3. <config dir>/local.toml (machine specific, not committed)
* 4. Environment variables: NETMON_<SECTION>__<KEY>, e.g.
*    NETMON_MONITORING__INTERVAL_MS=1000
*
* Sections:
* ---------
* monitoring    - tick period, trailing history size, optional rng seed
* samples       - size and spacing of generated sample windows
* thresholds    - every alert threshold used by the rule tables
* notifications - capability toggle, feed capacity, weak-signal policy
* dashboard     - terminal redraw period
*
* Missing files are fine, missing keys fall back to defaults. Whatever
* comes out is checked by `Settings::validate` before anyone uses it.
*/

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::errors::ConfigError;

pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Longest span a sample window may cover, first sample to last: ten years.
pub const MAX_WINDOW_SPAN_SECS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub monitoring: MonitoringSettings,
    pub samples: SampleSettings,
    pub thresholds: ThresholdSettings,
    pub notifications: NotificationSettings,
    pub dashboard: DashboardSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringSettings {
    pub interval_ms: u64,
    pub history_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for MonitoringSettings {
    fn default() -> Self {
        Self {
            interval_ms: 3000,
            history_size: 20,
            seed: None,
        }
    }
}

impl MonitoringSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleSettings {
    pub window_size: usize,
    pub spacing_secs: u64,
}

impl Default for SampleSettings {
    fn default() -> Self {
        Self {
            window_size: 20,
            spacing_secs: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdSettings {
    pub latency_high: f64,
    pub download_low: f64,
    pub upload_low: f64,
    pub speed_low: f64,
    pub ping_high: f64,
    pub speed_excellent: f64,
    pub signal_weak: f64,
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        Self {
            latency_high: 25.0,
            download_low: 40.0,
            upload_low: 15.0,
            speed_low: 5.0,
            ping_high: 100.0,
            speed_excellent: 100.0,
            signal_weak: 30.0,
        }
    }
}

/// When the weak-signal watch raises a notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalAlertPolicy {
    /// Every change to a value below the threshold alerts. An unchanged
    /// reading never alerts twice.
    #[default]
    OnChange,
    /// Only the step from at-or-above the threshold to below it alerts.
    OnTransition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub enabled: bool,
    pub center_capacity: usize,
    pub signal_policy: SignalAlertPolicy,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            center_capacity: 50,
            signal_policy: SignalAlertPolicy::OnChange,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    pub refresh_ms: u64,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self { refresh_ms: 250 }
    }
}

impl Settings {
    /// Load from `CONFIG_PATH` (or `./config`) plus the environment.
    pub fn new() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
        Self::load_from(Path::new(&config_path))
    }

    pub fn load_from(dir: &Path) -> Result<Self, ConfigError> {
        info!("Loading configuration from path: {}", dir.display());

        let config = Config::builder()
            .set_default("monitoring.interval_ms", 3000)?
            .set_default("samples.window_size", 20)?
            .add_source(File::from(dir.join("default")).required(false))
            .add_source(File::from(dir.join("local")).required(false))
            .add_source(
                Environment::with_prefix("NETMON")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.monitoring.interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "monitoring.interval_ms",
                reason: "tick period must be positive".to_string(),
            });
        }
        if self.monitoring.history_size == 0 {
            return Err(ConfigError::Invalid {
                field: "monitoring.history_size",
                reason: "history must hold at least one sample".to_string(),
            });
        }
        if self.samples.window_size == 0 {
            return Err(ConfigError::Invalid {
                field: "samples.window_size",
                reason: "window must hold at least one sample".to_string(),
            });
        }
        if self.samples.spacing_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "samples.spacing_secs",
                reason: "sample spacing must be positive".to_string(),
            });
        }
        let span = self
            .samples
            .spacing_secs
            .checked_mul((self.samples.window_size - 1) as u64);
        if span.map_or(true, |secs| secs > MAX_WINDOW_SPAN_SECS) {
            return Err(ConfigError::Invalid {
                field: "samples.spacing_secs",
                reason: format!(
                    "window of {} samples spaced {} s apart spans more than {} s",
                    self.samples.window_size, self.samples.spacing_secs, MAX_WINDOW_SPAN_SECS
                ),
            });
        }
        if self.notifications.center_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "notifications.center_capacity",
                reason: "notification feed needs room for one entry".to_string(),
            });
        }
        if self.dashboard.refresh_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "dashboard.refresh_ms",
                reason: "redraw period must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

pub fn generate_default_config() -> Settings {
    Settings::default()
}
