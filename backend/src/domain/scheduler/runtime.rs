//! Task spawning and shutdown for scheduled jobs.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::domain::TraceId;

use super::{JobSleeper, ScheduledJob};

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl JobSleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Registry of jobs waiting to be started.
pub struct BackgroundJobs {
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn JobSleeper>,
    jobs: Vec<Arc<dyn ScheduledJob>>,
}

impl BackgroundJobs {
    /// Build a runner that sleeps on the Tokio timer.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_sleeper(clock, Arc::new(TokioSleeper))
    }

    /// Build a runner with an injected sleeper.
    pub fn with_sleeper(clock: Arc<dyn Clock>, sleeper: Arc<dyn JobSleeper>) -> Self {
        Self {
            clock,
            sleeper,
            jobs: Vec::new(),
        }
    }

    /// Add a job.
    #[must_use]
    pub fn register(mut self, job: Arc<dyn ScheduledJob>) -> Self {
        self.jobs.push(job);
        self
    }

    /// Number of registered jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether no jobs are registered.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Spawn one task per job on the current Tokio runtime.
    pub fn start(self) -> BackgroundJobsHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let tasks = self
            .jobs
            .into_iter()
            .map(|job| {
                let runner = JobRunner {
                    job,
                    clock: Arc::clone(&self.clock),
                    sleeper: Arc::clone(&self.sleeper),
                    shutdown: shutdown_rx.clone(),
                };
                tokio::spawn(runner.run())
            })
            .collect();
        BackgroundJobsHandle {
            shutdown: shutdown_tx,
            tasks,
        }
    }
}

/// Handle used to stop running jobs.
pub struct BackgroundJobsHandle {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl BackgroundJobsHandle {
    /// Signal every job to stop and wait for the tasks to finish.
    ///
    /// A run already in progress completes before its task exits.
    pub async fn shutdown(self) {
        // Receivers are held by the tasks; a send error only means all exited.
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            if let Err(err) = task.await {
                warn!(error = %err, "background job task ended abnormally");
            }
        }
    }
}

struct JobRunner {
    job: Arc<dyn ScheduledJob>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn JobSleeper>,
    shutdown: watch::Receiver<bool>,
}

impl JobRunner {
    async fn run(mut self) {
        let name = self.job.name();
        let schedule = self.job.schedule();
        info!(job = name, %schedule, "background job scheduled");

        self.run_once().await;
        loop {
            let delay = schedule.delay_after(self.clock.utc());
            let sender_dropped = tokio::select! {
                biased;
                changed = self.shutdown.changed() => changed.is_err(),
                () = self.sleeper.sleep(delay) => false,
            };
            if sender_dropped || *self.shutdown.borrow() {
                break;
            }
            self.run_once().await;
        }

        info!(job = name, "background job stopped");
    }

    async fn run_once(&self) {
        let name = self.job.name();
        let job = Arc::clone(&self.job);
        TraceId::scope(TraceId::generate(), async move {
            match job.run().await {
                Ok(outcome) => info!(job = name, rows = outcome.rows, "background job completed"),
                Err(err) => error!(
                    job = name,
                    code = ?err.code(),
                    message = %err.message(),
                    "background job failed"
                ),
            }
        })
        .await;
    }
}
