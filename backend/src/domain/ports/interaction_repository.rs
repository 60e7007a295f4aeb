//! Port abstraction for per-user interactions and restaurant counters.
use async_trait::async_trait;

use crate::domain::{Interaction, InteractionUpdate, RestaurantId, UpvoteOutcome, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by interaction repository adapters.
    pub enum InteractionPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "interaction repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "interaction repository query failed: {message}",
        /// The referenced restaurant does not exist.
        RestaurantNotFound { restaurant_id: i32 } => "restaurant {restaurant_id} not found",
    }
}

/// Storage for interactions and counter maintenance.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InteractionRepository: Send + Sync {
    /// Insert or update the row for `(user_id, restaurant_id)`.
    async fn upsert(
        &self,
        user_id: &UserId,
        restaurant_id: RestaurantId,
        update: &InteractionUpdate,
    ) -> Result<Interaction, InteractionPersistenceError>;

    /// Flip or set the upvote flag and adjust `total_upvotes` in one
    /// transaction.
    ///
    /// The current row is locked while the transition is decided so
    /// concurrent toggles by the same user serialise.
    async fn toggle_upvote(
        &self,
        user_id: &UserId,
        restaurant_id: RestaurantId,
        requested: Option<bool>,
    ) -> Result<UpvoteOutcome, InteractionPersistenceError>;

    /// Recompute every restaurant's counters from interaction rows.
    ///
    /// Returns the number of restaurants updated.
    async fn aggregate_counters(&self) -> Result<usize, InteractionPersistenceError>;
}
