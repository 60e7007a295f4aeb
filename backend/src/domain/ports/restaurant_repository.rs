//! Port abstraction for restaurant persistence.
use async_trait::async_trait;

use crate::domain::{NewRestaurant, Restaurant, RestaurantId, RestaurantUpdate};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by restaurant repository adapters.
    pub enum RestaurantPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "restaurant repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "restaurant repository query failed: {message}",
        /// Another restaurant already carries the external identifier.
        DuplicateExternalId { external_id: String } =>
            "restaurant with external id {external_id} already exists",
        /// The referenced contributor is not a registered user.
        ContributorNotFound { contributor_id: String } =>
            "contributor {contributor_id} does not exist",
    }
}

/// Storage for restaurants.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RestaurantRepository: Send + Sync {
    /// Insert a restaurant and return the stored row.
    async fn create(&self, restaurant: &NewRestaurant)
    -> Result<Restaurant, RestaurantPersistenceError>;

    /// Apply `update`; `None` when the restaurant does not exist.
    async fn update(
        &self,
        id: RestaurantId,
        update: &RestaurantUpdate,
    ) -> Result<Option<Restaurant>, RestaurantPersistenceError>;

    /// Delete a restaurant; `false` when it did not exist.
    async fn delete(&self, id: RestaurantId) -> Result<bool, RestaurantPersistenceError>;

    /// Every restaurant identifier.
    async fn list_ids(&self) -> Result<Vec<RestaurantId>, RestaurantPersistenceError>;
}
