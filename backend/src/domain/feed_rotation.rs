//! Daily feed rotation job.
//!
//! Reads every restaurant id, shuffles them for the current UTC date and
//! hands the complete mapping to the feed repository, which swaps it in
//! atomically. A failed run leaves yesterday's feed readable.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::info;

use crate::domain::feed_service::map_feed_error;
use crate::domain::ports::{FeedRepository, RestaurantRepository};
use crate::domain::restaurant_service::map_restaurant_error;
use crate::domain::scheduler::{JobOutcome, Schedule, ScheduledJob};
use crate::domain::{DailyFeed, Error};

/// Job that reshuffles the daily feed.
pub struct FeedRotationJob<R, F> {
    restaurants: Arc<R>,
    feeds: Arc<F>,
    clock: Arc<dyn Clock>,
    schedule: Schedule,
}

impl<R, F> FeedRotationJob<R, F> {
    /// Create a rotation job firing on `schedule`.
    pub fn new(
        restaurants: Arc<R>,
        feeds: Arc<F>,
        clock: Arc<dyn Clock>,
        schedule: Schedule,
    ) -> Self {
        Self {
            restaurants,
            feeds,
            clock,
            schedule,
        }
    }
}

impl<R, F> FeedRotationJob<R, F>
where
    R: RestaurantRepository,
    F: FeedRepository,
{
    /// Build and store today's feed.
    pub async fn rotate(&self) -> Result<DailyFeed, Error> {
        let ids = self
            .restaurants
            .list_ids()
            .await
            .map_err(map_restaurant_error)?;
        let date = self.clock.utc().date_naive();
        let feed = DailyFeed::shuffled(date, ids, &mut SmallRng::from_entropy());
        let written = self
            .feeds
            .replace_daily_feed(&feed)
            .await
            .map_err(map_feed_error)?;
        info!(%date, entries = written, "daily feed rotated");
        Ok(feed)
    }
}

#[async_trait]
impl<R, F> ScheduledJob for FeedRotationJob<R, F>
where
    R: RestaurantRepository,
    F: FeedRepository,
{
    fn name(&self) -> &'static str {
        "feed_rotation"
    }

    fn schedule(&self) -> Schedule {
        self.schedule
    }

    async fn run(&self) -> Result<JobOutcome, Error> {
        self.rotate().await.map(|feed| JobOutcome::rows(feed.len()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::domain::ports::{
        FeedPersistenceError, MockFeedRepository, MockRestaurantRepository,
    };
    use crate::domain::test_clock::clock_at;
    use crate::domain::{ErrorCode, RestaurantId};
    use chrono::NaiveDate;
    use rstest::rstest;

    fn restaurants_with(ids: Vec<i32>) -> MockRestaurantRepository {
        let mut repo = MockRestaurantRepository::new();
        repo.expect_list_ids()
            .times(1)
            .return_once(move || Ok(ids.into_iter().map(RestaurantId::new).collect()));
        repo
    }

    #[rstest]
    #[tokio::test]
    async fn rotation_writes_dense_positions_for_today() {
        let mut feeds = MockFeedRepository::new();
        feeds
            .expect_replace_daily_feed()
            .withf(|feed| {
                let positions: Vec<i32> = feed.entries().iter().map(|e| e.position).collect();
                let ids: BTreeSet<i32> =
                    feed.entries().iter().map(|e| e.restaurant_id.get()).collect();
                feed.date() == NaiveDate::from_ymd_opt(2024, 5, 2).expect("date")
                    && positions == (1..=5).collect::<Vec<_>>()
                    && ids == (10..15).collect::<BTreeSet<_>>()
            })
            .times(1)
            .return_once(|feed| Ok(feed.len()));
        let job = FeedRotationJob::new(
            Arc::new(restaurants_with((10..15).collect())),
            Arc::new(feeds),
            clock_at(2024, 5, 2, 0, 0, 0),
            Schedule::midnight(),
        );

        let outcome = job.run().await.expect("rotation succeeds");
        assert_eq!(outcome, JobOutcome::rows(5));
    }

    #[rstest]
    #[tokio::test]
    async fn rotation_of_empty_catalogue_clears_feed() {
        let mut feeds = MockFeedRepository::new();
        feeds
            .expect_replace_daily_feed()
            .withf(|feed| feed.is_empty())
            .return_once(|_| Ok(0));
        let job = FeedRotationJob::new(
            Arc::new(restaurants_with(Vec::new())),
            Arc::new(feeds),
            clock_at(2024, 5, 2, 0, 0, 0),
            Schedule::midnight(),
        );

        assert_eq!(job.run().await.expect("rotation"), JobOutcome::rows(0));
    }

    #[rstest]
    #[tokio::test]
    async fn rotation_surfaces_storage_failures() {
        let mut feeds = MockFeedRepository::new();
        feeds
            .expect_replace_daily_feed()
            .return_once(|_| Err(FeedPersistenceError::query("deadlock detected")));
        let job = FeedRotationJob::new(
            Arc::new(restaurants_with(vec![1, 2])),
            Arc::new(feeds),
            clock_at(2024, 5, 2, 0, 0, 0),
            Schedule::midnight(),
        );

        let err = job.run().await.expect_err("failure");
        assert_eq!(err.code(), ErrorCode::InternalError);
        assert_eq!(job.name(), "feed_rotation");
    }
}
