//! Background job scheduling owned by the server lifecycle.
//!
//! Jobs implement [`ScheduledJob`] and are registered with
//! [`BackgroundJobs`]. Starting the runner spawns one task per job that runs
//! it once, then sleeps until the job's [`Schedule`] fires again. The
//! returned [`BackgroundJobsHandle`] stops every task when the HTTP server
//! exits.

mod runtime;
mod schedule;

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::Error;

pub use runtime::{BackgroundJobs, BackgroundJobsHandle, TokioSleeper};
pub use schedule::{Schedule, ScheduleError};

/// Summary of one job run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JobOutcome {
    /// Rows written by the run.
    pub rows: usize,
}

impl JobOutcome {
    /// Outcome touching `rows` rows.
    pub const fn rows(rows: usize) -> Self {
        Self { rows }
    }
}

/// A unit of recurring work.
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    /// When the job fires.
    fn schedule(&self) -> Schedule;

    /// Execute the job once.
    async fn run(&self) -> Result<JobOutcome, Error>;
}

/// Async sleep abstraction so tests can drive the runner without real time.
#[async_trait]
pub trait JobSleeper: Send + Sync {
    /// Suspend for `duration`.
    async fn sleep(&self, duration: Duration);
}

#[cfg(test)]
mod tests;
