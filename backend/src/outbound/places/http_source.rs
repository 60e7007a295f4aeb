//! Reqwest-backed Google Places source adapter.
//!
//! This adapter owns transport details only: request serialisation, timeout and
//! HTTP error mapping, and JSON decoding into domain candidates.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::{
    CircleDto, LatLngDto, LocationBiasDto, SearchTextRequestDto, SearchTextResponseDto,
};
use crate::domain::ports::{PlacesSource, PlacesSourceError};
use crate::domain::{PlaceCandidate, PlaceSearch};

/// Text Search (New) endpoint.
pub const DEFAULT_PLACES_ENDPOINT: &str = "https://places.googleapis.com/v1/places:searchText";

const FIELD_MASK: &str = "places.id,places.displayName,places.formattedAddress,\
places.location,places.rating,places.priceLevel,places.websiteUri,places.googleMapsUri";

/// Google Places adapter that performs HTTP POST requests against one endpoint.
pub struct GooglePlacesHttpSource {
    client: Client,
    endpoint: Url,
    api_key: Option<Zeroizing<String>>,
}

impl GooglePlacesHttpSource {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// Without an API key every search fails with
    /// [`PlacesSourceError::NotConfigured`].
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        api_key: Option<Zeroizing<String>>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }
}

#[async_trait]
impl PlacesSource for GooglePlacesHttpSource {
    async fn search_text(
        &self,
        search: &PlaceSearch,
        radius_km: f64,
    ) -> Result<Vec<PlaceCandidate>, PlacesSourceError> {
        let Some(api_key) = self.api_key.as_ref() else {
            return Err(PlacesSourceError::not_configured());
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("X-Goog-Api-Key", api_key.as_str())
            .header("X-Goog-FieldMask", FIELD_MASK)
            .json(&build_request(search, radius_km))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_candidates(body.as_ref())
    }
}

/// Largest `locationBias` circle the Text Search endpoint accepts.
const MAX_BIAS_RADIUS_METRES: f64 = 50_000.0;

fn build_request(search: &PlaceSearch, radius_km: f64) -> SearchTextRequestDto<'_> {
    let origin = search.origin();
    SearchTextRequestDto {
        text_query: search.text(),
        included_type: "restaurant",
        location_bias: LocationBiasDto {
            circle: CircleDto {
                center: LatLngDto {
                    latitude: origin.latitude(),
                    longitude: origin.longitude(),
                },
                radius: (radius_km * 1000.0).min(MAX_BIAS_RADIUS_METRES),
            },
        },
    }
}

fn parse_candidates(body: &[u8]) -> Result<Vec<PlaceCandidate>, PlacesSourceError> {
    let decoded: SearchTextResponseDto = serde_json::from_slice(body).map_err(|error| {
        PlacesSourceError::decode(format!("invalid places JSON payload: {error}"))
    })?;
    Ok(decoded.into_candidates())
}

fn map_transport_error(error: reqwest::Error) -> PlacesSourceError {
    if error.is_timeout() {
        PlacesSourceError::timeout(error.to_string())
    } else {
        PlacesSourceError::transport(error.to_string())
    }
}

/// Keep the provider body out of the error; it may echo request details.
fn map_status_error(status: StatusCode, body: &[u8]) -> PlacesSourceError {
    debug!(
        status = status.as_u16(),
        body = %String::from_utf8_lossy(body).chars().take(160).collect::<String>(),
        "places provider rejected request"
    );
    PlacesSourceError::status(status.as_u16())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network Google Places mapping helpers.

    use super::*;
    use crate::domain::Coordinates;
    use rstest::rstest;
    use serde_json::json;

    fn search() -> PlaceSearch {
        PlaceSearch::new("  ramen ", Coordinates::new(51.5, -0.12).expect("point"))
            .expect("valid search")
    }

    #[rstest]
    fn request_biases_towards_origin_in_metres() {
        let search = search();
        let value = serde_json::to_value(build_request(&search, 25.0)).expect("serialise");
        assert_eq!(
            value,
            json!({
                "textQuery": "ramen",
                "includedType": "restaurant",
                "locationBias": {
                    "circle": {
                        "center": { "latitude": 51.5, "longitude": -0.12 },
                        "radius": 25000.0
                    }
                }
            })
        );
    }

    #[rstest]
    #[case(50.0, 50_000.0)]
    #[case(120.0, 50_000.0)]
    #[case(0.5, 500.0)]
    fn bias_radius_is_capped_at_the_provider_limit(#[case] radius_km: f64, #[case] metres: f64) {
        let search = search();
        let value = serde_json::to_value(build_request(&search, radius_km)).expect("serialise");
        assert_eq!(value["locationBias"]["circle"]["radius"], json!(metres));
    }

    #[rstest]
    fn parses_places_into_candidates() {
        let body = r#"{
            "places": [
                {
                    "id": "abc",
                    "displayName": { "text": "Noodle Bar", "languageCode": "en" },
                    "formattedAddress": "1 High St",
                    "location": { "latitude": 51.51, "longitude": -0.13 },
                    "rating": 4.4,
                    "priceLevel": "PRICE_LEVEL_MODERATE",
                    "websiteUri": "https://noodle.example",
                    "googleMapsUri": "https://maps.google.com/?cid=1"
                },
                {
                    "id": "def",
                    "location": { "latitude": 51.52, "longitude": -0.14 },
                    "priceLevel": "PRICE_LEVEL_FREE"
                }
            ]
        }"#;

        let candidates = parse_candidates(body.as_bytes()).expect("JSON should decode");
        assert_eq!(candidates.len(), 2);
        let first = candidates.first().expect("first candidate");
        assert_eq!(first.external_id, "abc");
        assert_eq!(first.name, "Noodle Bar");
        assert_eq!(first.price_range, Some(2));
        assert_eq!(first.link.as_deref(), Some("https://maps.google.com/?cid=1"));
        let second = candidates.get(1).expect("second candidate");
        assert_eq!(second.price_range, None);
        assert_eq!(second.name, "");
    }

    #[rstest]
    fn empty_response_has_no_candidates() {
        let candidates = parse_candidates(b"{}").expect("JSON should decode");
        assert!(candidates.is_empty());
    }

    #[rstest]
    #[case(r#"{"places": [{"id": "x"}]}"#)]
    #[case(r#"{"places": [{"id": "x", "location": {"latitude": 95.0, "longitude": 0.0}}]}"#)]
    fn places_without_a_usable_location_are_skipped(#[case] unusable: &str) {
        let mut body: serde_json::Value = serde_json::from_str(unusable).expect("fixture");
        if let Some(places) = body["places"].as_array_mut() {
            places.push(serde_json::json!({
                "id": "ok",
                "location": { "latitude": 51.5, "longitude": -0.12 }
            }));
        }
        let bytes = serde_json::to_vec(&body).expect("fixture bytes");

        let candidates = parse_candidates(&bytes).expect("JSON should decode");

        let ids: Vec<&str> = candidates.iter().map(|c| c.external_id.as_str()).collect();
        assert_eq!(ids, vec!["ok"]);
    }

    #[rstest]
    fn malformed_json_is_a_decode_error() {
        let error = parse_candidates(b"not json").expect_err("decode should fail");
        assert!(matches!(error, PlacesSourceError::Decode { .. }));
    }

    #[rstest]
    #[case(StatusCode::FORBIDDEN)]
    #[case(StatusCode::TOO_MANY_REQUESTS)]
    #[case(StatusCode::INTERNAL_SERVER_ERROR)]
    fn non_success_statuses_keep_only_the_code(#[case] status: StatusCode) {
        let error = map_status_error(status, b"{\"error\":{\"message\":\"API key invalid\"}}");
        assert_eq!(error, PlacesSourceError::status(status.as_u16()));
        assert!(!error.to_string().contains("API key"));
    }

    #[tokio::test]
    async fn missing_api_key_is_not_configured() {
        let endpoint = Url::parse(DEFAULT_PLACES_ENDPOINT).expect("endpoint");
        let source = GooglePlacesHttpSource::new(endpoint, None, Duration::from_secs(1))
            .expect("client");
        let error = source
            .search_text(&search(), 25.0)
            .await
            .expect_err("no key configured");
        assert_eq!(error, PlacesSourceError::not_configured());
    }
}
