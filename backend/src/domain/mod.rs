//! Domain primitives, services, and background jobs.
//!
//! Purpose: Define strongly typed entities shared by the HTTP and
//! persistence adapters, the services implementing the driving ports, and
//! the scheduled jobs that maintain the daily feed and counters.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and its stable code.
//! - Restaurant, Interaction, DailyFeed, UserProfile: core entities.
//! - ChangeSet with RestaurantChange / InteractionChange: allow-listed
//!   partial updates.
//! - Services: AuthService, FeedService, InteractionService,
//!   RestaurantService, PlacesService.
//! - Jobs: FeedRotationJob, CounterAggregationJob, run by `scheduler`.

pub mod auth;
pub mod auth_service;
pub mod changes;
pub mod counter_aggregation;
pub mod error;
pub mod feed;
pub mod feed_rotation;
pub mod feed_service;
pub mod geo;
pub mod interaction;
pub mod interaction_service;
pub mod places;
pub mod places_service;
pub mod ports;
pub mod restaurant;
pub mod restaurant_service;
pub mod scheduler;
pub mod trace_id;
pub mod user;

#[cfg(test)]
pub(crate) mod test_clock;

pub use self::auth::{
    AccessToken, AuthSession, LoginCredentials, LoginValidationError, PASSWORD_MIN, Registration,
    RegistrationValidationError,
};
pub use self::auth_service::AuthService;
pub use self::changes::{ChangeSet, TaggedChange};
pub use self::counter_aggregation::CounterAggregationJob;
pub use self::error::{Error, ErrorCode};
pub use self::feed::{
    DEFAULT_MAX_RADIUS_KM, DailyFeed, FeedEntry, FeedFilter, FeedFilterInput, FeedItem,
    FeedQueryError, FeedRequest, ProximityFilter,
};
pub use self::feed_rotation::FeedRotationJob;
pub use self::feed_service::FeedService;
pub use self::geo::{CoordinateError, Coordinates, EARTH_RADIUS_KM};
pub use self::interaction::{
    Interaction, InteractionChange, InteractionRating, InteractionUpdate,
    InteractionValidationError, UpvoteOutcome, UpvoteTransition, require_changes,
    requested_upvote,
};
pub use self::interaction_service::InteractionService;
pub use self::places::{
    PlaceCandidate, PlaceSearch, PlaceSearchError, RankedPlace, SEARCH_TEXT_MAX, TravelSummary,
    rank_by_distance,
};
pub use self::places_service::PlacesService;
pub use self::restaurant::{
    NewRestaurant, PRICE_RANGE_MAX, PRICE_RANGE_MIN, PriceRange, Rating, Restaurant,
    RestaurantChange, RestaurantId, RestaurantUpdate, RestaurantValidationError,
};
pub use self::restaurant_service::RestaurantService;
pub use self::scheduler::{
    BackgroundJobs, BackgroundJobsHandle, JobOutcome, JobSleeper, Schedule, ScheduleError,
    ScheduledJob, TokioSleeper,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Email, USERNAME_MAX, USERNAME_MIN, UserAccount, UserId, UserProfile, UserValidationError,
    Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use eatwhatnow::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
