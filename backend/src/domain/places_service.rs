//! Provider-backed places search.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::ports::{PlacesQuery, PlacesSource, PlacesSourceError};
use crate::domain::{Error, PlaceSearch, RankedPlace, rank_by_distance};

/// Places service implementing [`PlacesQuery`].
#[derive(Clone)]
pub struct PlacesService<S> {
    source: Arc<S>,
    radius_km: f64,
}

impl<S> PlacesService<S> {
    /// Create a service searching within `radius_km` of the caller.
    pub fn new(source: Arc<S>, radius_km: f64) -> Self {
        Self { source, radius_km }
    }
}

fn map_source_error(error: PlacesSourceError) -> Error {
    match error {
        PlacesSourceError::Transport { message } | PlacesSourceError::Timeout { message } => {
            warn!(%message, "places provider unreachable");
            Error::service_unavailable("places provider is unavailable")
        }
        PlacesSourceError::Status { status } => {
            warn!(status, "places provider returned an error status");
            Error::bad_gateway("places provider returned an error")
        }
        PlacesSourceError::Decode { message } => {
            warn!(%message, "places provider response could not be decoded");
            Error::bad_gateway("places provider returned an unreadable response")
        }
        PlacesSourceError::NotConfigured => {
            Error::service_unavailable("places search is not configured")
        }
    }
}

#[async_trait]
impl<S> PlacesQuery for PlacesService<S>
where
    S: PlacesSource,
{
    async fn search(&self, search: &PlaceSearch) -> Result<Vec<RankedPlace>, Error> {
        let candidates = self
            .source
            .search_text(search, self.radius_km)
            .await
            .map_err(map_source_error)?;
        Ok(rank_by_distance(&search.origin(), candidates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockPlacesSource;
    use crate::domain::{Coordinates, ErrorCode, PlaceCandidate};
    use rstest::rstest;

    fn search() -> PlaceSearch {
        PlaceSearch::new("ramen", Coordinates::new(51.5, -0.12).expect("origin")).expect("search")
    }

    fn candidate(id: &str, latitude: f64) -> PlaceCandidate {
        PlaceCandidate {
            external_id: id.into(),
            name: id.into(),
            address: "somewhere".into(),
            location: Coordinates::new(latitude, -0.12).expect("location"),
            rating: Some(4.0),
            price_range: Some(2),
            website: None,
            link: None,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn ranks_candidates_nearest_first() {
        let mut source = MockPlacesSource::new();
        source
            .expect_search_text()
            .withf(|search, radius| search.text() == "ramen" && (*radius - 25.0).abs() < f64::EPSILON)
            .return_once(|_, _| Ok(vec![candidate("far", 51.6), candidate("near", 51.501)]));
        let service = PlacesService::new(Arc::new(source), 25.0);

        let ranked = service.search(&search()).await.expect("results");
        let ids: Vec<&str> = ranked
            .iter()
            .map(|place| place.candidate.external_id.as_str())
            .collect();
        assert_eq!(ids, vec!["near", "far"]);
    }

    #[rstest]
    #[case(PlacesSourceError::timeout("10s"), ErrorCode::ServiceUnavailable)]
    #[case(PlacesSourceError::transport("dns"), ErrorCode::ServiceUnavailable)]
    #[case(PlacesSourceError::status(500_u16), ErrorCode::BadGateway)]
    #[case(PlacesSourceError::decode("eof"), ErrorCode::BadGateway)]
    #[case(PlacesSourceError::not_configured(), ErrorCode::ServiceUnavailable)]
    #[tokio::test]
    async fn maps_provider_failures(#[case] failure: PlacesSourceError, #[case] code: ErrorCode) {
        let mut source = MockPlacesSource::new();
        source
            .expect_search_text()
            .return_once(move |_, _| Err(failure));
        let service = PlacesService::new(Arc::new(source), 25.0);

        let err = service.search(&search()).await.expect_err("failure");
        assert_eq!(err.code(), code);
    }
}
