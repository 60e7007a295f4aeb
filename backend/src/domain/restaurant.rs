//! Restaurant entity, creation payload, and allow-listed updates.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::changes::{ChangeSet, TaggedChange};
use crate::domain::geo::{CoordinateError, Coordinates};
use crate::domain::user::UserId;

/// Lowest price band.
pub const PRICE_RANGE_MIN: i16 = 1;
/// Highest price band.
pub const PRICE_RANGE_MAX: i16 = 5;
/// Upper bound for ratings and rating averages.
pub const RATING_MAX: f64 = 5.0;

/// Validation errors for restaurant payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum RestaurantValidationError {
    /// Name was blank.
    EmptyName,
    /// Address was blank.
    EmptyAddress,
    /// Coordinates were out of range.
    Coordinates(CoordinateError),
    /// Price band outside `1..=5`.
    PriceRange(i64),
    /// Rating outside `[0, 5]` or not finite.
    Rating(f64),
}

impl fmt::Display for RestaurantValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::EmptyAddress => write!(f, "address must not be empty"),
            Self::Coordinates(err) => err.fmt(f),
            Self::PriceRange(value) => write!(
                f,
                "price range {value} must be between {PRICE_RANGE_MIN} and {PRICE_RANGE_MAX}"
            ),
            Self::Rating(value) => write!(f, "rating {value} must be between 0 and 5"),
        }
    }
}

impl std::error::Error for RestaurantValidationError {}

impl From<CoordinateError> for RestaurantValidationError {
    fn from(value: CoordinateError) -> Self {
        Self::Coordinates(value)
    }
}

/// Database identifier of a restaurant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RestaurantId(i32);

impl RestaurantId {
    /// Wrap a raw identifier.
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Raw identifier.
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for RestaurantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Price band from 1 (cheap) to 5 (expensive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PriceRange(i16);

impl PriceRange {
    /// Validate a price band.
    pub fn new(value: i64) -> Result<Self, RestaurantValidationError> {
        i16::try_from(value)
            .ok()
            .filter(|v| (PRICE_RANGE_MIN..=PRICE_RANGE_MAX).contains(v))
            .map(Self)
            .ok_or(RestaurantValidationError::PriceRange(value))
    }

    /// Raw band.
    pub const fn get(self) -> i16 {
        self.0
    }
}

/// Star rating in `[0, 5]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rating(f64);

impl Rating {
    /// Validate a rating.
    pub fn new(value: f64) -> Result<Self, RestaurantValidationError> {
        if value.is_finite() && (0.0..=RATING_MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RestaurantValidationError::Rating(value))
        }
    }

    /// Raw rating.
    pub const fn get(self) -> f64 {
        self.0
    }
}

/// Restaurant as stored, including denormalised counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Restaurant {
    /// Identifier.
    #[schema(value_type = i32, example = 42)]
    pub id: RestaurantId,
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Price band, 1 to 5.
    pub price_range: Option<i16>,
    /// Provider rating, 0 to 5.
    pub rating: Option<f64>,
    /// Count of users who upvoted.
    pub total_upvotes: i32,
    /// Count of users who favourited.
    pub total_favorites: i32,
    /// Count of non-empty comments.
    pub total_comments: i32,
    /// Mean of user ratings, 0 when none.
    pub average_ratings: f64,
    /// Website URL.
    pub website: Option<String>,
    /// Image URL.
    pub image_url: Option<String>,
    /// Outbound link, typically a maps URL.
    pub link: Option<String>,
    /// User who contributed the restaurant.
    #[schema(value_type = Option<String>)]
    pub contributor_id: Option<UserId>,
    /// Identifier at the places provider.
    pub external_id: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for a new restaurant.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRestaurant {
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Location.
    pub location: Coordinates,
    /// Price band.
    pub price_range: Option<PriceRange>,
    /// Provider rating.
    pub rating: Option<Rating>,
    /// Website URL.
    pub website: Option<String>,
    /// Image URL.
    pub image_url: Option<String>,
    /// Outbound link.
    pub link: Option<String>,
    /// Contributing user.
    pub contributor_id: Option<UserId>,
    /// Identifier at the places provider.
    pub external_id: Option<String>,
}

/// Trim and reject blank text.
pub(crate) fn non_blank(
    value: &str,
    err: RestaurantValidationError,
) -> Result<String, RestaurantValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(err)
    } else {
        Ok(trimmed.to_owned())
    }
}

/// Collapse blank optional text to `None`.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

impl NewRestaurant {
    /// Validate the required fields; optional fields start empty.
    pub fn new(
        name: &str,
        address: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<Self, RestaurantValidationError> {
        Ok(Self {
            name: non_blank(name, RestaurantValidationError::EmptyName)?,
            address: non_blank(address, RestaurantValidationError::EmptyAddress)?,
            location: Coordinates::new(latitude, longitude)?,
            price_range: None,
            rating: None,
            website: None,
            image_url: None,
            link: None,
            contributor_id: None,
            external_id: None,
        })
    }
}

/// One writable restaurant column.
#[derive(Debug, Clone, PartialEq)]
pub enum RestaurantChange {
    /// `name`
    Name(String),
    /// `address`
    Address(String),
    /// `latitude` and `longitude` together.
    Location(Coordinates),
    /// `price_range`
    PriceRange(Option<PriceRange>),
    /// `rating`
    Rating(Option<Rating>),
    /// `website`
    Website(Option<String>),
    /// `image_url`
    ImageUrl(Option<String>),
    /// `link`
    Link(Option<String>),
}

impl TaggedChange for RestaurantChange {
    fn column(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Address(_) => "address",
            Self::Location(_) => "location",
            Self::PriceRange(_) => "price_range",
            Self::Rating(_) => "rating",
            Self::Website(_) => "website",
            Self::ImageUrl(_) => "image_url",
            Self::Link(_) => "link",
        }
    }
}

/// Partial restaurant update.
pub type RestaurantUpdate = ChangeSet<RestaurantChange>;
