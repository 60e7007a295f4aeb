//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_command;
mod credentials;
mod feed_query;
mod feed_repository;
mod interaction_command;
mod interaction_repository;
mod places_query;
mod places_source;
mod restaurant_command;
mod restaurant_repository;
mod user_repository;

pub use auth_command::{AuthCommand, UserProfileQuery};
#[cfg(test)]
pub use auth_command::{MockAuthCommand, MockUserProfileQuery};
#[cfg(test)]
pub use credentials::{MockPasswordHasher, MockTokenService};
pub use credentials::{PasswordHashError, PasswordHasher, TokenError, TokenService};
pub use feed_query::FeedQuery;
#[cfg(test)]
pub use feed_query::MockFeedQuery;
#[cfg(test)]
pub use feed_repository::MockFeedRepository;
pub use feed_repository::{FeedPersistenceError, FeedRepository, FeedSlice};
pub use interaction_command::InteractionCommand;
#[cfg(test)]
pub use interaction_command::MockInteractionCommand;
#[cfg(test)]
pub use interaction_repository::MockInteractionRepository;
pub use interaction_repository::{InteractionPersistenceError, InteractionRepository};
#[cfg(test)]
pub use places_query::MockPlacesQuery;
pub use places_query::PlacesQuery;
#[cfg(test)]
pub use places_source::MockPlacesSource;
pub use places_source::{PlacesSource, PlacesSourceError};
#[cfg(test)]
pub use restaurant_command::MockRestaurantCommand;
pub use restaurant_command::RestaurantCommand;
#[cfg(test)]
pub use restaurant_repository::MockRestaurantRepository;
pub use restaurant_repository::{RestaurantPersistenceError, RestaurantRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};

#[cfg(test)]
mod tests;
