//! Driving port for restaurant administration.
use async_trait::async_trait;

use crate::domain::{Error, NewRestaurant, Restaurant, RestaurantId, RestaurantUpdate};

/// Domain use-case port for creating, editing, and removing restaurants.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RestaurantCommand: Send + Sync {
    /// Create a restaurant.
    async fn create(&self, restaurant: NewRestaurant) -> Result<Restaurant, Error>;

    /// Apply a partial update.
    async fn update(
        &self,
        id: RestaurantId,
        update: RestaurantUpdate,
    ) -> Result<Restaurant, Error>;

    /// Remove a restaurant and everything that references it.
    async fn delete(&self, id: RestaurantId) -> Result<(), Error>;
}
