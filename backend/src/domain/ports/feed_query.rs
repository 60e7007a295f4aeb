//! Driving port for reading the daily feed.
use async_trait::async_trait;
use pagination::Page;

use crate::domain::{Error, FeedItem, FeedRequest};

/// Domain use-case port for the paginated feed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedQuery: Send + Sync {
    /// Today's feed after filters and pagination.
    async fn daily_feed(&self, request: &FeedRequest) -> Result<Page<FeedItem>, Error>;
}
