//! Daily feed read service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::Page;

use crate::domain::ports::{FeedPersistenceError, FeedQuery, FeedRepository};
use crate::domain::{Error, FeedItem, FeedRequest};

/// Feed service implementing [`FeedQuery`].
#[derive(Clone)]
pub struct FeedService<F> {
    feeds: Arc<F>,
    clock: Arc<dyn Clock>,
}

impl<F> FeedService<F> {
    /// Create a new service.
    pub fn new(feeds: Arc<F>, clock: Arc<dyn Clock>) -> Self {
        Self { feeds, clock }
    }
}

pub(crate) fn map_feed_error(error: FeedPersistenceError) -> Error {
    match error {
        FeedPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("feed repository unavailable: {message}"))
        }
        FeedPersistenceError::Query { message } => {
            Error::internal(format!("feed repository error: {message}"))
        }
    }
}

#[async_trait]
impl<F> FeedQuery for FeedService<F>
where
    F: FeedRepository,
{
    async fn daily_feed(&self, request: &FeedRequest) -> Result<Page<FeedItem>, Error> {
        let today = self.clock.utc().date_naive();
        let slice = self
            .feeds
            .page(today, request)
            .await
            .map_err(map_feed_error)?;
        Ok(Page::new(slice.items, slice.total, request.window))
    }
}
