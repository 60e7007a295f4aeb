//! DTOs for the Google Places Text Search (New) wire format.
//!
//! Requests serialise from borrowed domain values; responses decode into
//! these transport shapes first and convert to `PlaceCandidate` in one pass.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Coordinates, PlaceCandidate};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SearchTextRequestDto<'a> {
    pub(super) text_query: &'a str,
    pub(super) included_type: &'static str,
    pub(super) location_bias: LocationBiasDto,
}

#[derive(Debug, Serialize)]
pub(super) struct LocationBiasDto {
    pub(super) circle: CircleDto,
}

#[derive(Debug, Serialize)]
pub(super) struct CircleDto {
    pub(super) center: LatLngDto,
    /// Metres.
    pub(super) radius: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct LatLngDto {
    pub(super) latitude: f64,
    pub(super) longitude: f64,
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchTextResponseDto {
    #[serde(default)]
    pub(super) places: Vec<PlaceDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PlaceDto {
    pub(super) id: String,
    pub(super) display_name: Option<LocalizedTextDto>,
    pub(super) formatted_address: Option<String>,
    pub(super) location: Option<LatLngDto>,
    pub(super) rating: Option<f64>,
    pub(super) price_level: Option<String>,
    pub(super) website_uri: Option<String>,
    pub(super) google_maps_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LocalizedTextDto {
    pub(super) text: String,
}

/// Map a provider price level onto the 1-5 price band.
pub(super) fn price_range_for(level: &str) -> Option<i16> {
    match level {
        "PRICE_LEVEL_INEXPENSIVE" => Some(1),
        "PRICE_LEVEL_MODERATE" => Some(2),
        "PRICE_LEVEL_EXPENSIVE" => Some(3),
        "PRICE_LEVEL_VERY_EXPENSIVE" => Some(4),
        _ => None,
    }
}

impl SearchTextResponseDto {
    /// Places without a usable location are skipped; the rest still rank.
    pub(super) fn into_candidates(self) -> Vec<PlaceCandidate> {
        self.places
            .into_iter()
            .filter_map(|place| {
                place
                    .into_candidate()
                    .map_err(|reason| debug!(%reason, "skipping places result"))
                    .ok()
            })
            .collect()
    }
}

impl PlaceDto {
    fn into_candidate(self) -> Result<PlaceCandidate, String> {
        let point = self
            .location
            .ok_or_else(|| format!("place {} missing location", self.id))?;
        let location = Coordinates::new(point.latitude, point.longitude)
            .map_err(|err| format!("place {} has invalid location: {err}", self.id))?;

        Ok(PlaceCandidate {
            name: self
                .display_name
                .map(|name| name.text)
                .unwrap_or_default(),
            address: self.formatted_address.unwrap_or_default(),
            location,
            rating: self.rating.filter(|r| (0.0..=5.0).contains(r)),
            price_range: self.price_level.as_deref().and_then(price_range_for),
            website: self.website_uri,
            link: self.google_maps_uri,
            external_id: self.id,
        })
    }
}
