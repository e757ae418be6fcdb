use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

use super::anomaly_detection::{Anomaly, AnomalyDetector};
use super::metrics::{MetricsGenerator, NetworkStats, Sample};
use super::rules::{AlertRule, RuleTable};
use super::signal::SignalWatch;
use crate::config::Settings;
use crate::notifications::{Capability, Notification, NotificationCenter, NotificationDispatcher};
use crate::scheduler::{PeriodicTask, TaskHandle};
use crate::AsyncMutex;

/// Everything one tick produced.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub snapshot: NetworkStats,
    pub sample: Sample,
    pub anomaly: Option<Anomaly>,
    pub notifications: Vec<Notification>,
}

/// The synchronous unit of work behind [`NetworkMonitor`].
pub struct TickPipeline {
    generator: MetricsGenerator,
    detector: AnomalyDetector,
    dispatcher: NotificationDispatcher,
    signal: SignalWatch,
    history: VecDeque<Sample>,
    anomalies: VecDeque<Anomaly>,
    history_size: usize,
    center: NotificationCenter,
    snapshot_tx: watch::Sender<NetworkStats>,
    ticks: u64,
}

impl TickPipeline {
    pub fn new(
        settings: &Settings,
        mut generator: MetricsGenerator,
        dispatcher: NotificationDispatcher,
    ) -> (Self, watch::Receiver<NetworkStats>) {
        let initial = generator.snapshot();
        Self::with_initial(settings, generator, dispatcher, initial)
    }

    /// Start from a given snapshot. It goes through the dispatcher and the
    /// signal watch once, before any tick.
    pub fn with_initial(
        settings: &Settings,
        generator: MetricsGenerator,
        dispatcher: NotificationDispatcher,
        initial: NetworkStats,
    ) -> (Self, watch::Receiver<NetworkStats>) {
        let (snapshot_tx, snapshot_rx) = watch::channel(initial.clone());

        let mut pipeline = Self {
            generator,
            detector: AnomalyDetector::new(RuleTable::anomaly_from_settings(&settings.thresholds)),
            dispatcher,
            signal: SignalWatch::new(
                AlertRule::weak_signal(settings.thresholds.signal_weak),
                settings.notifications.signal_policy,
            ),
            history: VecDeque::with_capacity(settings.monitoring.history_size),
            anomalies: VecDeque::with_capacity(settings.monitoring.history_size),
            history_size: settings.monitoring.history_size.max(1),
            center: NotificationCenter::new(settings.notifications.center_capacity),
            snapshot_tx,
            ticks: 0,
        };

        let mut raised = pipeline.dispatcher.dispatch(&initial);
        raised.extend(pipeline.signal.observe(&initial, &pipeline.dispatcher));
        pipeline.center.extend(raised);

        (pipeline, snapshot_rx)
    }

    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        let snapshot = self.generator.snapshot();
        let sample = self.generator.sample(now);
        self.apply(snapshot, sample)
    }

    /// Everything a tick does after generation: replace the snapshot, record
    /// the sample, then detect, dispatch and watch the signal.
    pub fn apply(&mut self, snapshot: NetworkStats, sample: Sample) -> TickOutcome {
        self.snapshot_tx.send_replace(snapshot.clone());
        push_bounded(&mut self.history, sample.clone(), self.history_size);

        let mut notifications = Vec::new();

        let anomaly = self.detector.detect(&sample).map(|hit| {
            notifications.push(self.dispatcher.raise(hit.rule, hit.value));
            Anomaly::from_match(&sample, &hit)
        });
        if let Some(anomaly) = &anomaly {
            push_bounded(&mut self.anomalies, anomaly.clone(), self.history_size);
        }

        notifications.extend(self.dispatcher.dispatch(&snapshot));
        notifications.extend(self.signal.observe(&snapshot, &self.dispatcher));

        self.center.extend(notifications.iter().cloned());
        self.ticks += 1;

        debug!(
            tick = self.ticks,
            download = snapshot.download,
            ping = snapshot.ping,
            signal = snapshot.signal_strength,
            notifications = notifications.len(),
            "Snapshot replaced"
        );

        TickOutcome {
            snapshot,
            sample,
            anomaly,
            notifications,
        }
    }

    pub fn snapshot(&self) -> NetworkStats {
        self.snapshot_tx.borrow().clone()
    }

    pub fn history(&self) -> Vec<Sample> {
        self.history.iter().cloned().collect()
    }

    pub fn recent_anomalies(&self) -> Vec<Anomaly> {
        self.anomalies.iter().cloned().collect()
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.center
    }

    pub fn clear_notifications(&mut self) {
        self.center.clear();
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

fn push_bounded<T>(queue: &mut VecDeque<T>, item: T, limit: usize) {
    if queue.len() == limit {
        queue.pop_front();
    }
    queue.push_back(item);
}

/// Owns the current [`NetworkStats`] snapshot and the timer that replaces it.
///
/// One monitor runs at most one periodic task. `stop` is idempotent and
/// dropping the monitor stops it.
pub struct NetworkMonitor {
    pipeline: Arc<AsyncMutex<TickPipeline>>,
    snapshot_rx: watch::Receiver<NetworkStats>,
    period: Duration,
    task: Option<TaskHandle>,
}

impl NetworkMonitor {
    pub fn new(
        settings: &Settings,
        generator: MetricsGenerator,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        let (pipeline, snapshot_rx) = TickPipeline::new(settings, generator, dispatcher);
        Self {
            pipeline: Arc::new(AsyncMutex::new(pipeline)),
            snapshot_rx,
            period: settings.monitoring.interval(),
            task: None,
        }
    }

    /// Seeded (or entropy) generator and the configured dispatch rules.
    pub fn from_settings(settings: &Settings, capability: Capability) -> Self {
        let generator = match settings.monitoring.seed {
            Some(seed) => MetricsGenerator::with_seed(seed, &settings.samples),
            None => MetricsGenerator::new(&settings.samples),
        };
        let dispatcher = NotificationDispatcher::new(
            RuleTable::dispatch_from_settings(&settings.thresholds),
            capability,
        );
        Self::new(settings, generator, dispatcher)
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start ticking. A second call while running does nothing.
    pub fn start(&mut self) {
        if self.is_running() {
            debug!("Monitor already running");
            return;
        }

        let pipeline = Arc::clone(&self.pipeline);
        self.task = Some(PeriodicTask::spawn("network-monitor", self.period, move || {
            let pipeline = Arc::clone(&pipeline);
            async move {
                pipeline.lock().await.tick(Utc::now());
            }
        }));
        info!(period_ms = self.period.as_millis() as u64, "Network monitor started");
    }

    pub fn stop(&mut self) {
        if let Some(mut task) = self.task.take() {
            task.stop();
            info!("Network monitor stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(TaskHandle::is_running)
    }

    pub fn snapshot(&self) -> NetworkStats {
        self.snapshot_rx.borrow().clone()
    }

    /// Read-only view that changes whenever the snapshot is replaced.
    pub fn subscribe(&self) -> watch::Receiver<NetworkStats> {
        self.snapshot_rx.clone()
    }

    pub async fn history(&self) -> Vec<Sample> {
        self.pipeline.lock().await.history()
    }

    pub async fn recent_anomalies(&self) -> Vec<Anomaly> {
        self.pipeline.lock().await.recent_anomalies()
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.pipeline.lock().await.notifications().iter().cloned().collect()
    }

    pub async fn clear_notifications(&self) {
        self.pipeline.lock().await.clear_notifications();
    }

    pub async fn ticks(&self) -> u64 {
        self.pipeline.lock().await.ticks()
    }

    /// Run one tick now, outside the timer.
    pub async fn tick_now(&self) -> TickOutcome {
        self.pipeline.lock().await.tick(Utc::now())
    }
}

impl Drop for NetworkMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
