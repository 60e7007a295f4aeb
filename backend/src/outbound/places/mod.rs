//! Google Places outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `PlacesSource`
//! port.

mod dto;
mod http_source;

pub use http_source::{DEFAULT_PLACES_ENDPOINT, GooglePlacesHttpSource};
