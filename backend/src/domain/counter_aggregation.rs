//! Hourly recomputation of restaurant interaction counters.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::Error;
use crate::domain::interaction_service::map_interaction_error;
use crate::domain::ports::InteractionRepository;
use crate::domain::scheduler::{JobOutcome, Schedule, ScheduledJob};

/// Job that rewrites `total_upvotes`, `total_favorites`, `total_comments`,
/// and `average_ratings` from the interaction rows.
pub struct CounterAggregationJob<I> {
    interactions: Arc<I>,
    schedule: Schedule,
}

impl<I> CounterAggregationJob<I> {
    /// Create an aggregation job firing on `schedule`.
    pub fn new(interactions: Arc<I>, schedule: Schedule) -> Self {
        Self {
            interactions,
            schedule,
        }
    }
}

#[async_trait]
impl<I> ScheduledJob for CounterAggregationJob<I>
where
    I: InteractionRepository,
{
    fn name(&self) -> &'static str {
        "counter_aggregation"
    }

    fn schedule(&self) -> Schedule {
        self.schedule
    }

    async fn run(&self) -> Result<JobOutcome, Error> {
        let updated = self
            .interactions
            .aggregate_counters()
            .await
            .map_err(map_interaction_error)?;
        info!(restaurants = updated, "interaction counters aggregated");
        Ok(JobOutcome::rows(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{InteractionPersistenceError, MockInteractionRepository};
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn reports_rows_updated() {
        let mut repo = MockInteractionRepository::new();
        repo.expect_aggregate_counters()
            .times(1)
            .return_once(|| Ok(12));
        let job = CounterAggregationJob::new(
            Arc::new(repo),
            Schedule::hourly_at(0).expect("minute"),
        );

        assert_eq!(job.run().await.expect("run"), JobOutcome::rows(12));
        assert_eq!(job.name(), "counter_aggregation");
    }

    #[rstest]
    #[tokio::test]
    async fn connection_failures_are_unavailable() {
        let mut repo = MockInteractionRepository::new();
        repo.expect_aggregate_counters()
            .return_once(|| Err(InteractionPersistenceError::connection("timeout")));
        let job = CounterAggregationJob::new(
            Arc::new(repo),
            Schedule::hourly_at(0).expect("minute"),
        );

        let err = job.run().await.expect_err("failure");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
