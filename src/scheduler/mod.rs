use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Shortest period a task will run at. `interval_at` rejects zero.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Spawns a repeating job on the tokio runtime.
pub struct PeriodicTask;

impl PeriodicTask {
    /// The first tick runs one full `period` after spawning, not immediately.
    /// Periods below [`MIN_PERIOD`] are raised to it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F, Fut>(name: &str, period: Duration, mut tick: F) -> TaskHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = if period < MIN_PERIOD {
            warn!(task = name, requested_ms = period.as_millis() as u64, "Period too short, using 1 ms");
            MIN_PERIOD
        } else {
            period
        };
        info!(task = name, period_ms = period.as_millis() as u64, "Starting periodic task");

        let task_name = name.to_string();
        let join = tokio::spawn(async move {
            let mut interval_timer = time::interval_at(Instant::now() + period, period);
            interval_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval_timer.tick().await;
                debug!(task = %task_name, "Tick");
                tick().await;
            }
        });

        TaskHandle {
            name: name.to_string(),
            join: Some(join),
        }
    }
}

/// Owns a running [`PeriodicTask`]. Dropping the handle cancels the task.
#[derive(Debug)]
pub struct TaskHandle {
    name: String,
    join: Option<JoinHandle<()>>,
}

impl TaskHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        self.join.as_ref().is_some_and(|join| !join.is_finished())
    }

    /// Cancel the task. Safe to call any number of times.
    pub fn stop(&mut self) {
        if let Some(join) = self.join.take() {
            join.abort();
            info!(task = %self.name, "Stopped periodic task");
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
