//! Driving port for places search.
use async_trait::async_trait;

use crate::domain::{Error, PlaceSearch, RankedPlace};

/// Domain use-case port for provider-backed place search.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlacesQuery: Send + Sync {
    /// Search and rank candidates nearest first.
    async fn search(&self, search: &PlaceSearch) -> Result<Vec<RankedPlace>, Error>;
}
