//! Restaurant administration service.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{RestaurantCommand, RestaurantPersistenceError, RestaurantRepository};
use crate::domain::{Error, NewRestaurant, Restaurant, RestaurantId, RestaurantUpdate};

/// Restaurant service implementing [`RestaurantCommand`].
#[derive(Clone)]
pub struct RestaurantService<R> {
    restaurants: Arc<R>,
}

impl<R> RestaurantService<R> {
    /// Create a new service.
    pub fn new(restaurants: Arc<R>) -> Self {
        Self { restaurants }
    }
}

pub(crate) fn map_restaurant_error(error: RestaurantPersistenceError) -> Error {
    match error {
        RestaurantPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("restaurant repository unavailable: {message}"))
        }
        RestaurantPersistenceError::Query { message } => {
            Error::internal(format!("restaurant repository error: {message}"))
        }
        RestaurantPersistenceError::DuplicateExternalId { external_id } => {
            Error::conflict(format!("restaurant with external id {external_id} already exists"))
                .with_details(json!({ "field": "external_id", "code": "duplicate" }))
        }
        RestaurantPersistenceError::ContributorNotFound { contributor_id } => {
            Error::invalid_request(format!("contributor {contributor_id} does not exist"))
                .with_details(json!({ "field": "contributor_id", "code": "unknown_contributor" }))
        }
    }
}

fn not_found(id: RestaurantId) -> Error {
    Error::not_found(format!("restaurant {id} not found"))
}

#[async_trait]
impl<R> RestaurantCommand for RestaurantService<R>
where
    R: RestaurantRepository,
{
    async fn create(&self, restaurant: NewRestaurant) -> Result<Restaurant, Error> {
        let created = self
            .restaurants
            .create(&restaurant)
            .await
            .map_err(map_restaurant_error)?;
        info!(restaurant_id = %created.id, "restaurant created");
        Ok(created)
    }

    async fn update(
        &self,
        id: RestaurantId,
        update: RestaurantUpdate,
    ) -> Result<Restaurant, Error> {
        if update.is_empty() {
            return Err(
                Error::invalid_request("at least one restaurant field must be provided")
                    .with_details(json!({ "field": "body", "code": "empty_update" })),
            );
        }
        self.restaurants
            .update(id, &update)
            .await
            .map_err(map_restaurant_error)?
            .ok_or_else(|| not_found(id))
    }

    async fn delete(&self, id: RestaurantId) -> Result<(), Error> {
        let removed = self
            .restaurants
            .delete(id)
            .await
            .map_err(map_restaurant_error)?;
        if removed {
            info!(restaurant_id = %id, "restaurant deleted");
            Ok(())
        } else {
            Err(not_found(id))
        }
    }
}
