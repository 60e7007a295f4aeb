//! Interaction write service.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::domain::ports::{InteractionCommand, InteractionPersistenceError, InteractionRepository};
use crate::domain::{
    Error, Interaction, InteractionUpdate, InteractionValidationError, RestaurantId,
    UpvoteOutcome, UserId, require_changes,
};

/// Interaction service implementing [`InteractionCommand`].
#[derive(Clone)]
pub struct InteractionService<I> {
    interactions: Arc<I>,
}

impl<I> InteractionService<I> {
    /// Create a new service.
    pub fn new(interactions: Arc<I>) -> Self {
        Self { interactions }
    }
}

pub(crate) fn map_interaction_error(error: InteractionPersistenceError) -> Error {
    match error {
        InteractionPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("interaction repository unavailable: {message}"))
        }
        InteractionPersistenceError::Query { message } => {
            Error::internal(format!("interaction repository error: {message}"))
        }
        InteractionPersistenceError::RestaurantNotFound { restaurant_id } => {
            Error::not_found(format!("restaurant {restaurant_id} not found"))
        }
    }
}

#[async_trait]
impl<I> InteractionCommand for InteractionService<I>
where
    I: InteractionRepository,
{
    async fn record(
        &self,
        user_id: &UserId,
        restaurant_id: RestaurantId,
        update: InteractionUpdate,
    ) -> Result<Interaction, Error> {
        let update = require_changes(update).map_err(|err: InteractionValidationError| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": "body", "code": "empty_update" }))
        })?;
        debug!(%user_id, %restaurant_id, columns = ?update.columns(), "upserting interaction");
        self.interactions
            .upsert(user_id, restaurant_id, &update)
            .await
            .map_err(map_interaction_error)
    }

    async fn toggle_upvote(
        &self,
        user_id: &UserId,
        restaurant_id: RestaurantId,
        requested: Option<bool>,
    ) -> Result<UpvoteOutcome, Error> {
        self.interactions
            .toggle_upvote(user_id, restaurant_id, requested)
            .await
            .map_err(map_interaction_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockInteractionRepository;
    use crate::domain::{ErrorCode, InteractionChange};
    use chrono::Utc;
    use rstest::rstest;

    fn interaction(user_id: UserId, restaurant_id: RestaurantId, upvoted: bool) -> Interaction {
        let now = Utc::now();
        Interaction {
            id: 1,
            user_id,
            restaurant_id,
            upvoted,
            favorited: false,
            rating: None,
            comment: Some("great noodles".into()),
            visited_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn record_passes_changes_through() {
        let user_id = UserId::random();
        let restaurant_id = RestaurantId::new(3);
        let stored = interaction(user_id, restaurant_id, false);
        let mut repo = MockInteractionRepository::new();
        repo.expect_upsert()
            .withf(move |user, restaurant, update| {
                *user == user_id
                    && *restaurant == restaurant_id
                    && update.columns() == vec!["comment"]
            })
            .times(1)
            .return_once(move |_, _, _| Ok(stored));
        let service = InteractionService::new(Arc::new(repo));

        let update = InteractionUpdate::new()
            .with(InteractionChange::Comment(Some("great noodles".into())));
        let result = service
            .record(&user_id, restaurant_id, update)
            .await
            .expect("recorded");
        assert_eq!(result.comment.as_deref(), Some("great noodles"));
    }

    #[rstest]
    #[tokio::test]
    async fn record_rejects_empty_updates_without_touching_storage() {
        let service = InteractionService::new(Arc::new(MockInteractionRepository::new()));
        let err = service
            .record(&UserId::random(), RestaurantId::new(1), InteractionUpdate::new())
            .await
            .expect_err("empty");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_restaurant_is_not_found() {
        let mut repo = MockInteractionRepository::new();
        repo.expect_toggle_upvote()
            .return_once(|_, _, _| Err(InteractionPersistenceError::restaurant_not_found(9)));
        let service = InteractionService::new(Arc::new(repo));

        let err = service
            .toggle_upvote(&UserId::random(), RestaurantId::new(9), None)
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn toggle_returns_counter() {
        let user_id = UserId::random();
        let restaurant_id = RestaurantId::new(2);
        let outcome = UpvoteOutcome {
            interaction: interaction(user_id, restaurant_id, true),
            total_upvotes: 1,
        };
        let mut repo = MockInteractionRepository::new();
        repo.expect_toggle_upvote()
            .withf(|_, _, requested| requested.is_none())
            .return_once(move |_, _, _| Ok(outcome));
        let service = InteractionService::new(Arc::new(repo));

        let result = service
            .toggle_upvote(&user_id, restaurant_id, None)
            .await
            .expect("toggled");
        assert!(result.interaction.upvoted);
        assert_eq!(result.total_upvotes, 1);
    }
}
