//! Port abstraction for the daily feed table.
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{DailyFeed, FeedItem, FeedRequest};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by feed repository adapters.
    pub enum FeedPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "feed repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "feed repository query failed: {message}",
    }
}

/// One page of feed rows plus the filtered total.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedSlice {
    /// Rows in position order.
    pub items: Vec<FeedItem>,
    /// Rows matching the filter before pagination.
    pub total: u64,
}

/// Storage for the daily feed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedRepository: Send + Sync {
    /// Atomically replace every feed row with `feed`.
    ///
    /// Either all of `feed` is visible afterwards or the previous mapping
    /// is left untouched. Returns the number of rows written.
    async fn replace_daily_feed(&self, feed: &DailyFeed) -> Result<usize, FeedPersistenceError>;

    /// Read the latest feed dated on or before `today`.
    async fn page(
        &self,
        today: NaiveDate,
        request: &FeedRequest,
    ) -> Result<FeedSlice, FeedPersistenceError>;
}
