//! Places search: text queries around a point and ranked candidates.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::geo::Coordinates;

/// Maximum accepted query length in characters.
pub const SEARCH_TEXT_MAX: usize = 200;
/// Assumed walking speed for travel estimates.
pub const WALKING_SPEED_KMH: f64 = 5.0;
/// Assumed urban driving speed for travel estimates.
pub const DRIVING_SPEED_KMH: f64 = 40.0;

/// Validation errors for place searches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceSearchError {
    /// Query text was blank.
    EmptyText,
    /// Query text exceeded [`SEARCH_TEXT_MAX`].
    TextTooLong { max: usize },
}

impl fmt::Display for PlaceSearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyText => write!(f, "search text must not be empty"),
            Self::TextTooLong { max } => write!(f, "search text must be at most {max} characters"),
        }
    }
}

impl std::error::Error for PlaceSearchError {}

/// Free-text search biased towards a location.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceSearch {
    text: String,
    origin: Coordinates,
}

impl PlaceSearch {
    /// Validate the query text.
    pub fn new(text: &str, origin: Coordinates) -> Result<Self, PlaceSearchError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(PlaceSearchError::EmptyText);
        }
        if trimmed.chars().count() > SEARCH_TEXT_MAX {
            return Err(PlaceSearchError::TextTooLong {
                max: SEARCH_TEXT_MAX,
            });
        }
        Ok(Self {
            text: trimmed.to_owned(),
            origin,
        })
    }

    /// Trimmed query text.
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// Search centre.
    pub fn origin(&self) -> Coordinates {
        self.origin
    }
}

/// A place returned by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PlaceCandidate {
    /// Provider identifier, stored as a restaurant's `external_id`.
    pub external_id: String,
    /// Display name.
    pub name: String,
    /// Formatted address.
    pub address: String,
    /// Location.
    pub location: Coordinates,
    /// Provider rating, 0 to 5.
    pub rating: Option<f64>,
    /// Price band derived from the provider's price level.
    pub price_range: Option<i16>,
    /// Website URL.
    pub website: Option<String>,
    /// Maps link.
    pub link: Option<String>,
}

/// Straight-line distance and rough travel times.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TravelSummary {
    /// Great-circle distance in kilometres, rounded to metres.
    pub distance_km: f64,
    /// Estimated minutes on foot.
    pub walking_minutes: u32,
    /// Estimated minutes by car.
    pub driving_minutes: u32,
}

fn minutes_at(distance_km: f64, speed_kmh: f64) -> u32 {
    let minutes = (distance_km / speed_kmh * 60.0).ceil();
    // Bounded by half the Earth's circumference at walking pace.
    minutes.clamp(0.0, f64::from(u32::MAX)) as u32
}

impl TravelSummary {
    /// Summarise the trip from `from` to `to`.
    ///
    /// # Examples
    /// ```
    /// use eatwhatnow::domain::{Coordinates, TravelSummary};
    ///
    /// let here = Coordinates::new(0.0, 0.0).unwrap();
    /// let trip = TravelSummary::between(&here, &here);
    /// assert_eq!(trip.walking_minutes, 0);
    /// ```
    pub fn between(from: &Coordinates, to: &Coordinates) -> Self {
        let distance_km = from.distance_km(to);
        Self {
            distance_km: (distance_km * 1000.0).round() / 1000.0,
            walking_minutes: minutes_at(distance_km, WALKING_SPEED_KMH),
            driving_minutes: minutes_at(distance_km, DRIVING_SPEED_KMH),
        }
    }
}

/// A candidate paired with its travel summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RankedPlace {
    /// Provider candidate.
    #[serde(flatten)]
    pub candidate: PlaceCandidate,
    /// Travel summary from the search origin.
    pub travel: TravelSummary,
}

/// Attach travel summaries and sort nearest first.
pub fn rank_by_distance(origin: &Coordinates, candidates: Vec<PlaceCandidate>) -> Vec<RankedPlace> {
    let mut ranked: Vec<RankedPlace> = candidates
        .into_iter()
        .map(|candidate| RankedPlace {
            travel: TravelSummary::between(origin, &candidate.location),
            candidate,
        })
        .collect();
    ranked.sort_by(|a, b| a.travel.distance_km.total_cmp(&b.travel.distance_km));
    ranked
}
