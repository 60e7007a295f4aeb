//! Driving port for interaction writes.
use async_trait::async_trait;

use crate::domain::{
    Error, Interaction, InteractionUpdate, RestaurantId, UpvoteOutcome, UserId,
};

/// Domain use-case port for recording interactions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InteractionCommand: Send + Sync {
    /// Upsert the caller's interaction with a restaurant.
    async fn record(
        &self,
        user_id: &UserId,
        restaurant_id: RestaurantId,
        update: InteractionUpdate,
    ) -> Result<Interaction, Error>;

    /// Toggle or set the caller's upvote.
    async fn toggle_upvote(
        &self,
        user_id: &UserId,
        restaurant_id: RestaurantId,
        requested: Option<bool>,
    ) -> Result<UpvoteOutcome, Error>;
}
