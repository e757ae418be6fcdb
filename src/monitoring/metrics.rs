/*
* Synthetic Network Metrics
* -------------------------
*
* Nothing in here touches a socket. Every number is drawn from a uniform
* distribution so the rest of the pipeline (detector, dispatcher, signal
* watch, dashboard) has something believable to chew on.
*
* Key Components:
* -------------
* 1. Sample: one (download, upload, latency) reading at a point in time.
*    Sample windows feed the anomaly detector and the dashboard charts.
*
* 2. NetworkStats: the aggregate snapshot shown on the dashboard. It is
*    always generated whole, never patched field by field.
*
* 3. MetricsGenerator: owns the rng. Seed it when you need the same
*    numbers twice (tests, demos), leave it to entropy otherwise.
*
* Sample ranges (half-open):
* -------------------------
* download [50, 150) Mbps, upload [20, 70) Mbps, latency [10, 30) ms
*/

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::debug;

use super::rules::{Metric, MetricSource};
use crate::config::SampleSettings;
use crate::errors::{ConfigError, MonitorResult};

pub const SAMPLE_DOWNLOAD_RANGE: Range<f64> = 50.0..150.0;
pub const SAMPLE_UPLOAD_RANGE: Range<f64> = 20.0..70.0;
pub const SAMPLE_LATENCY_RANGE: Range<f64> = 10.0..30.0;

pub const STATS_DOWNLOAD_RANGE: Range<f64> = 0.0..150.0;
pub const STATS_UPLOAD_RANGE: Range<f64> = 0.0..60.0;
pub const STATS_PING_RANGE: Range<f64> = 5.0..150.0;
pub const STATS_DATA_TRANSFER_RANGE: Range<f64> = 0.0..1000.0;
pub const MAX_SIGNAL_STRENGTH: u8 = 100;
pub const MAX_CONNECTED_DEVICES: u32 = 32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: DateTime<Utc>,
    pub download: f64,
    pub upload: f64,
    pub latency: f64,
}

impl Sample {
    /// Wall-clock label used on chart axes.
    pub fn label(&self) -> String {
        self.time.format("%H:%M:%S").to_string()
    }
}

impl MetricSource for Sample {
    fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Download => Some(self.download),
            Metric::Upload => Some(self.upload),
            Metric::Latency => Some(self.latency),
            Metric::Ping | Metric::SignalStrength => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats {
    /// Mbps
    pub download: f64,
    /// Mbps
    pub upload: f64,
    /// ms
    pub ping: f64,
    /// percent, 0..=100
    pub signal_strength: u8,
    pub connected_devices: u32,
    /// GB transferred
    pub data_transfer: f64,
    /// Mbps
    pub network_speed: f64,
}

impl MetricSource for NetworkStats {
    fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Download => Some(self.download),
            Metric::Upload => Some(self.upload),
            Metric::Ping => Some(self.ping),
            Metric::SignalStrength => Some(f64::from(self.signal_strength)),
            Metric::Latency => None,
        }
    }
}

pub struct MetricsGenerator {
    rng: StdRng,
    window_size: usize,
    spacing_secs: u64,
}

impl MetricsGenerator {
    pub fn new(settings: &SampleSettings) -> Self {
        Self::with_rng(StdRng::from_entropy(), settings)
    }

    pub fn with_seed(seed: u64, settings: &SampleSettings) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), settings)
    }

    fn with_rng(rng: StdRng, settings: &SampleSettings) -> Self {
        debug!(
            window_size = settings.window_size,
            spacing_secs = settings.spacing_secs,
            "Initializing metrics generator"
        );
        Self {
            rng,
            window_size: settings.window_size,
            spacing_secs: settings.spacing_secs,
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn sample(&mut self, time: DateTime<Utc>) -> Sample {
        Sample {
            time,
            download: self.rng.gen_range(SAMPLE_DOWNLOAD_RANGE),
            upload: self.rng.gen_range(SAMPLE_UPLOAD_RANGE),
            latency: self.rng.gen_range(SAMPLE_LATENCY_RANGE),
        }
    }

    /// `window_size` samples at fixed spacing, oldest first, the last one at `now`.
    ///
    /// Settings that passed `Settings::validate` always produce a window. A
    /// window reaching past the earliest representable timestamp is an error,
    /// and no rng state is consumed in that case.
    pub fn sample_window(&mut self, now: DateTime<Utc>) -> MonitorResult<Vec<Sample>> {
        let times = (0..self.window_size)
            .rev()
            .map(|steps_back| {
                self.offset(steps_back)
                    .and_then(|offset| now.checked_sub_signed(offset))
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ConfigError::Invalid {
                field: "samples.spacing_secs",
                reason: format!(
                    "{} samples spaced {} s apart do not fit before {}",
                    self.window_size, self.spacing_secs, now
                ),
            })?;

        Ok(times.into_iter().map(|time| self.sample(time)).collect())
    }

    fn offset(&self, steps_back: usize) -> Option<chrono::Duration> {
        let secs = self
            .spacing_secs
            .checked_mul(u64::try_from(steps_back).ok()?)?;
        chrono::Duration::try_seconds(i64::try_from(secs).ok()?)
    }

    pub fn snapshot(&mut self) -> NetworkStats {
        let download = self.rng.gen_range(STATS_DOWNLOAD_RANGE);
        NetworkStats {
            download,
            upload: self.rng.gen_range(STATS_UPLOAD_RANGE),
            ping: self.rng.gen_range(STATS_PING_RANGE),
            signal_strength: self.rng.gen_range(0..=MAX_SIGNAL_STRENGTH),
            connected_devices: self.rng.gen_range(1..=MAX_CONNECTED_DEVICES),
            data_transfer: self.rng.gen_range(STATS_DATA_TRANSFER_RANGE),
            network_speed: download,
        }
    }
}
