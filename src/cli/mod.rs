/*
* Network Monitor Command Line Interface
* --------------------------------------
*
* netmon-dashboard
* ├── run [--ticks N]        // headless monitor, notifications go to the log
* ├── dashboard              // terminal UI on top of the same monitor
* ├── samples [--seed S]     // one synthetic sample window plus its anomalies, as JSON
* └── init [--force]         // writes config/default.toml with every default spelled out
*
* Every command takes --config <dir> to point at a different config
* directory. Without it CONFIG_PATH is used, then ./config.
*/

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

use crate::config::settings::{generate_default_config, DEFAULT_CONFIG_DIR};
use crate::config::Settings;
use crate::dashboard::start_dashboard;
use crate::errors::MonitorResult;
use crate::monitoring::{
    Anomaly, AnomalyDetector, MetricsGenerator, NetworkMonitor, RuleTable, Sample,
};
use crate::notifications::{Capability, ChannelSink, FanoutSink, LogSink, NotificationSink};

#[derive(Parser)]
#[command(name = "netmon-dashboard")]
#[command(version)]
#[command(about = "Simulated network monitor with alerting and a terminal dashboard", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding default.toml / local.toml
    #[arg(short, long, value_name = "DIR", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the monitor headless and log notifications
    Run {
        /// Stop after this many ticks
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Treat desktop notifications as unavailable
        #[arg(long)]
        no_notify: bool,
    },
    /// Start the interactive dashboard
    Dashboard,
    /// Print one generated sample window and its anomalies as JSON
    Samples {
        #[arg(short, long)]
        seed: Option<u64>,

        /// Override the configured window size
        #[arg(short, long)]
        window: Option<usize>,
    },
    /// Generate default configuration
    Init {
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Debug, Serialize)]
pub struct SampleReport {
    pub samples: Vec<Sample>,
    pub anomalies: Vec<Anomaly>,
}

pub async fn run(cli: Cli) -> Result<()> {
    let config_dir = cli.config;

    match cli.command {
        Commands::Run { ticks, no_notify } => {
            let settings = load_settings(config_dir.as_deref())?;
            handle_run_command(&settings, ticks, no_notify).await
        }
        Commands::Dashboard => {
            let settings = load_settings(config_dir.as_deref())?;
            handle_dashboard_command(&settings).await
        }
        Commands::Samples { seed, window } => {
            let settings = load_settings(config_dir.as_deref())?;
            let report = sample_report(&settings, seed, window)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Commands::Init { force } => {
            let dir = config_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR));
            handle_init_command(&dir, force)
        }
    }
}

fn load_settings(config_dir: Option<&Path>) -> Result<Settings> {
    let settings = match config_dir {
        Some(path) => Settings::load_from(path)?,
        None => Settings::new()?,
    };
    Ok(settings)
}

fn capability_for(settings: &Settings, extra: Option<Box<dyn NotificationSink>>) -> Capability {
    if !settings.notifications.enabled {
        return Capability::Unavailable;
    }
    match extra {
        Some(sink) => {
            let sinks: Vec<Box<dyn NotificationSink>> = vec![Box::new(LogSink), sink];
            Capability::available(FanoutSink::new(sinks))
        }
        None => Capability::available(LogSink),
    }
}

async fn handle_run_command(settings: &Settings, ticks: Option<u64>, no_notify: bool) -> Result<()> {
    let capability = if no_notify {
        Capability::Unavailable
    } else {
        capability_for(settings, None)
    };
    let mut monitor = NetworkMonitor::from_settings(settings, capability);
    let count = drive(&mut monitor, ticks).await;

    let raised = monitor.notifications().await.len();
    println!(
        "{} {} ticks, {} notifications raised",
        "✓".green(),
        count,
        raised
    );
    Ok(())
}

/// Run `monitor` until it has ticked `limit` times or ctrl-c arrives.
/// Returns the number of ticks taken.
pub async fn drive(monitor: &mut NetworkMonitor, limit: Option<u64>) -> u64 {
    let done = |count: u64| limit.is_some_and(|limit| count >= limit);
    if done(0) {
        return 0;
    }

    let mut updates = monitor.subscribe();
    monitor.start();
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                // The watch channel coalesces, so count ticks at the source.
                let count = monitor.ticks().await;
                let stats = updates.borrow_and_update().clone();
                info!(
                    tick = count,
                    download = stats.download,
                    upload = stats.upload,
                    ping = stats.ping,
                    signal = stats.signal_strength,
                    "Snapshot"
                );
                if done(count) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }
    monitor.stop();
    monitor.ticks().await
}

async fn handle_dashboard_command(settings: &Settings) -> Result<()> {
    let (sink, toasts) = ChannelSink::new();
    let capability = capability_for(settings, Some(Box::new(sink)));
    let mut monitor = NetworkMonitor::from_settings(settings, capability);
    start_dashboard(
        &mut monitor,
        Some(toasts),
        Duration::from_millis(settings.dashboard.refresh_ms),
    )
    .await
}

pub fn sample_report(
    settings: &Settings,
    seed: Option<u64>,
    window: Option<usize>,
) -> MonitorResult<SampleReport> {
    let mut sample_settings = settings.samples.clone();
    if let Some(window) = window {
        sample_settings.window_size = window;
    }
    let mut generator = match seed.or(settings.monitoring.seed) {
        Some(seed) => MetricsGenerator::with_seed(seed, &sample_settings),
        None => MetricsGenerator::new(&sample_settings),
    };
    let detector = AnomalyDetector::new(RuleTable::anomaly_from_settings(&settings.thresholds));

    let samples = generator.sample_window(Utc::now())?;
    let anomalies = detector.analyze(&samples);
    Ok(SampleReport { samples, anomalies })
}

pub fn handle_init_command(config_dir: &Path, force: bool) -> Result<()> {
    let target = config_dir.join("default.toml");
    if target.exists() && !force {
        error!("Configuration already exists at {}. Use --force to overwrite.", target.display());
        return Ok(());
    }

    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating {}", config_dir.display()))?;
    let config_str = generate_default_config().to_toml()?;
    std::fs::write(&target, config_str).with_context(|| format!("writing {}", target.display()))?;

    println!("{} Default configuration generated at {}", "✓".green(), target.display());
    Ok(())
}
