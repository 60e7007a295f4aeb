//! Driven port for an external places provider.
//!
//! The domain owns the request and candidate shapes so the search service
//! stays provider-agnostic.

use async_trait::async_trait;

use crate::domain::{PlaceCandidate, PlaceSearch};

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while calling the places provider.
    pub enum PlacesSourceError {
        /// Network transport failed before receiving a response.
        Transport { message: String } => "places transport failed: {message}",
        /// The call exceeded its timeout.
        Timeout { message: String } => "places request timed out: {message}",
        /// The provider answered with a non-success status.
        Status { status: u16 } => "places provider returned status {status}",
        /// The response body could not be decoded.
        Decode { message: String } => "places response decode failed: {message}",
        /// No provider credentials are configured.
        NotConfigured => "places provider is not configured",
    }
}

/// Port for free-text place searches.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlacesSource: Send + Sync {
    /// Search for restaurants matching `search` within `radius_km` of its
    /// origin.
    async fn search_text(
        &self,
        search: &PlaceSearch,
        radius_km: f64,
    ) -> Result<Vec<PlaceCandidate>, PlacesSourceError>;
}
