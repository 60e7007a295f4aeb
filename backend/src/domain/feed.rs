//! Daily feed: shuffled rotation and filtered, paginated reads.
//!
//! A [`DailyFeed`] assigns every restaurant a dense 1-based position for one
//! calendar day. Readers select the most recent day not after today and
//! narrow it with a [`FeedFilter`], optionally windowed by
//! [`pagination::PageWindow`].

use std::fmt;

use chrono::NaiveDate;
use pagination::PageWindow;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::geo::{CoordinateError, Coordinates};
use crate::domain::restaurant::{PriceRange, Rating, Restaurant, RestaurantId};

/// Default upper bound for search radii, in kilometres.
pub const DEFAULT_MAX_RADIUS_KM: f64 = 25.0;

/// Validation errors for feed queries.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedQueryError {
    /// Only one of longitude and latitude was supplied.
    IncompleteLocation,
    /// Coordinates out of range.
    Coordinates(CoordinateError),
    /// Radius not positive, not finite, or above the maximum.
    Radius { value: f64, max: f64 },
    /// Price band outside `1..=5`.
    PriceRange(i64),
    /// Minimum rating outside `[0, 5]`.
    MinRating(f64),
}

impl fmt::Display for FeedQueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncompleteLocation => {
                write!(f, "longitude and latitude must be provided together")
            }
            Self::Coordinates(err) => err.fmt(f),
            Self::Radius { value, max } => {
                write!(f, "radius {value} must be greater than 0 and at most {max} km")
            }
            Self::PriceRange(value) => write!(f, "price range {value} must be between 1 and 5"),
            Self::MinRating(value) => write!(f, "minimum rating {value} must be between 0 and 5"),
        }
    }
}

impl std::error::Error for FeedQueryError {}

/// Centre point and radius for proximity filtering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityFilter {
    /// Search centre.
    pub origin: Coordinates,
    /// Radius in kilometres.
    pub radius_km: f64,
}

/// Filters applied to the daily feed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeedFilter {
    /// Restrict to restaurants within a radius.
    pub proximity: Option<ProximityFilter>,
    /// Exact price band.
    pub price_range: Option<PriceRange>,
    /// Minimum provider rating.
    pub min_rating: Option<Rating>,
}

/// Raw numeric filter inputs, already parsed from text.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeedFilterInput {
    /// Longitude in degrees.
    pub longitude: Option<f64>,
    /// Latitude in degrees.
    pub latitude: Option<f64>,
    /// Radius in kilometres.
    pub radius_km: Option<f64>,
    /// Price band.
    pub price_range: Option<i64>,
    /// Minimum rating.
    pub min_rating: Option<f64>,
}

impl FeedFilter {
    /// Validate raw inputs against `max_radius_km`.
    ///
    /// A location without a radius searches the full `max_radius_km`. A
    /// radius without a location is ignored.
    ///
    /// # Examples
    /// ```
    /// use eatwhatnow::domain::{FeedFilter, FeedFilterInput};
    ///
    /// let input = FeedFilterInput {
    ///     latitude: Some(95.0),
    ///     longitude: Some(0.0),
    ///     ..FeedFilterInput::default()
    /// };
    /// assert!(FeedFilter::try_new(input, 25.0).is_err());
    /// ```
    pub fn try_new(input: FeedFilterInput, max_radius_km: f64) -> Result<Self, FeedQueryError> {
        let proximity = match (input.latitude, input.longitude) {
            (Some(latitude), Some(longitude)) => {
                let origin =
                    Coordinates::new(latitude, longitude).map_err(FeedQueryError::Coordinates)?;
                let radius_km = input.radius_km.unwrap_or(max_radius_km);
                if !radius_km.is_finite() || radius_km <= 0.0 || radius_km > max_radius_km {
                    return Err(FeedQueryError::Radius {
                        value: radius_km,
                        max: max_radius_km,
                    });
                }
                Some(ProximityFilter { origin, radius_km })
            }
            (None, None) => None,
            _ => return Err(FeedQueryError::IncompleteLocation),
        };

        let price_range = input
            .price_range
            .map(|raw| PriceRange::new(raw).map_err(|_| FeedQueryError::PriceRange(raw)))
            .transpose()?;

        let min_rating = input
            .min_rating
            .map(|raw| Rating::new(raw).map_err(|_| FeedQueryError::MinRating(raw)))
            .transpose()?;

        Ok(Self {
            proximity,
            price_range,
            min_rating,
        })
    }
}

/// A feed read request.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeedRequest {
    /// Row filters.
    pub filter: FeedFilter,
    /// Page window; `None` returns every matching row.
    pub window: Option<PageWindow>,
}

/// A restaurant in feed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FeedItem {
    /// Position within the day's shuffle.
    pub position: i32,
    /// Restaurant details.
    #[serde(flatten)]
    pub restaurant: Restaurant,
}

/// One slot of a daily feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedEntry {
    /// 1-based position.
    pub position: i32,
    /// Restaurant at this position.
    pub restaurant_id: RestaurantId,
}

/// A complete shuffle for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyFeed {
    date: NaiveDate,
    entries: Vec<FeedEntry>,
}

impl DailyFeed {
    /// Shuffle `ids` uniformly and number them from 1.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use eatwhatnow::domain::{DailyFeed, RestaurantId};
    /// use rand::SeedableRng;
    /// use rand::rngs::SmallRng;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    /// let ids = (1..=3).map(RestaurantId::new).collect();
    /// let feed = DailyFeed::shuffled(date, ids, &mut SmallRng::seed_from_u64(7));
    /// let positions: Vec<i32> = feed.entries().iter().map(|e| e.position).collect();
    /// assert_eq!(positions, vec![1, 2, 3]);
    /// ```
    pub fn shuffled<R: Rng + ?Sized>(
        date: NaiveDate,
        mut ids: Vec<RestaurantId>,
        rng: &mut R,
    ) -> Self {
        ids.sort_unstable();
        ids.dedup();
        ids.shuffle(rng);
        let entries = (1..=i32::MAX)
            .zip(ids)
            .map(|(position, restaurant_id)| FeedEntry {
                position,
                restaurant_id,
            })
            .collect();
        Self { date, entries }
    }

    /// Day the feed applies to.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Entries in position order.
    pub fn entries(&self) -> &[FeedEntry] {
        &self.entries
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no restaurants exist.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
