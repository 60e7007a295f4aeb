//! Tests for the background job runner.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use rstest::{fixture, rstest};
use tokio::sync::Notify;

use super::*;
use crate::domain::test_clock::clock_at;

#[fixture]
fn clock() -> Arc<dyn Clock> {
    clock_at(2024, 5, 1, 23, 59, 30)
}

/// Returns immediately `limit` times, then blocks until cancelled.
struct RecordingSleeper {
    limit: usize,
    delays: Mutex<Vec<Duration>>,
    exhausted: Notify,
}

impl RecordingSleeper {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            delays: Mutex::new(Vec::new()),
            exhausted: Notify::new(),
        }
    }

    fn delays(&self) -> Vec<Duration> {
        self.delays.lock().expect("delays mutex").clone()
    }
}

#[async_trait]
impl JobSleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        let calls = {
            let mut delays = self.delays.lock().expect("delays mutex");
            delays.push(duration);
            delays.len()
        };
        if calls > self.limit {
            self.exhausted.notify_one();
            std::future::pending::<()>().await;
        }
    }
}

struct CountingJob {
    schedule: Schedule,
    runs: AtomicUsize,
    fail: bool,
}

impl CountingJob {
    fn new(schedule: Schedule, fail: bool) -> Self {
        Self {
            schedule,
            runs: AtomicUsize::new(0),
            fail,
        }
    }

    fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScheduledJob for CountingJob {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn schedule(&self) -> Schedule {
        self.schedule
    }

    async fn run(&self) -> Result<JobOutcome, Error> {
        let run = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail {
            Err(Error::internal("boom"))
        } else {
            Ok(JobOutcome::rows(run))
        }
    }
}

async fn wait_for(sleeper: &RecordingSleeper) {
    tokio::time::timeout(Duration::from_secs(5), sleeper.exhausted.notified())
        .await
        .expect("sleeper exhausted in time");
}

#[rstest]
#[tokio::test]
async fn runs_job_after_each_sleep_until_shutdown(clock: Arc<dyn Clock>) {
    let sleeper = Arc::new(RecordingSleeper::new(3));
    let job = Arc::new(CountingJob::new(Schedule::midnight(), false));
    let handle = BackgroundJobs::with_sleeper(clock, sleeper.clone())
        .register(job.clone())
        .start();

    wait_for(&sleeper).await;
    handle.shutdown().await;

    assert_eq!(job.runs(), 4);
    let delays = sleeper.delays();
    assert_eq!(delays.len(), 4);
    assert!(delays.iter().all(|d| *d == Duration::from_secs(30)));
}

#[rstest]
#[tokio::test]
async fn failures_do_not_stop_the_schedule(clock: Arc<dyn Clock>) {
    let sleeper = Arc::new(RecordingSleeper::new(2));
    let job = Arc::new(CountingJob::new(
        Schedule::hourly_at(0).expect("valid minute"),
        true,
    ));
    let handle = BackgroundJobs::with_sleeper(clock, sleeper.clone())
        .register(job.clone())
        .start();

    wait_for(&sleeper).await;
    handle.shutdown().await;

    assert_eq!(job.runs(), 3);
}

#[rstest]
#[tokio::test]
async fn runs_once_at_startup_and_shutdown_interrupts_sleep(clock: Arc<dyn Clock>) {
    let sleeper = Arc::new(RecordingSleeper::new(0));
    let job = Arc::new(CountingJob::new(Schedule::midnight(), false));
    let handle = BackgroundJobs::with_sleeper(clock, sleeper.clone())
        .register(job.clone())
        .start();

    wait_for(&sleeper).await;
    tokio::time::timeout(Duration::from_secs(5), handle.shutdown())
        .await
        .expect("shutdown completes");

    assert_eq!(job.runs(), 1);
}

#[rstest]
fn register_collects_jobs(clock: Arc<dyn Clock>) {
    let jobs = BackgroundJobs::new(clock);
    assert!(jobs.is_empty());
    let jobs = jobs
        .register(Arc::new(CountingJob::new(Schedule::midnight(), false)))
        .register(Arc::new(CountingJob::new(Schedule::midnight(), false)));
    assert_eq!(jobs.len(), 2);
}
