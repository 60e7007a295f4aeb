//! Interaction handlers for the signed-in user.
//!
//! ```text
//! POST /api/v1/restaurants/user         {"restaurantId":42,"favorited":true,"comment":null}
//! POST /api/v1/restaurants/user/upvote  {"restaurantId":42}
//! ```

use actix_web::{post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Error, Interaction, InteractionChange, InteractionRating, InteractionUpdate, RestaurantId,
    UpvoteOutcome,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::Envelope;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    ErrorCode, FieldName, field_error, nullable, require,
};

const RESTAURANT_ID: FieldName = FieldName::new("restaurantId");

/// Body for `POST /api/v1/restaurants/user`.
///
/// Absent keys leave the column untouched; `null` clears `rating`,
/// `comment`, or `visitedAt`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InteractionRequest {
    #[schema(value_type = i32, example = 42)]
    pub restaurant_id: Option<i32>,
    pub upvoted: Option<bool>,
    pub favorited: Option<bool>,
    /// 1 to 5 stars.
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i64>)]
    pub rating: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub comment: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub visited_at: Option<Option<DateTime<Utc>>>,
}

impl InteractionRequest {
    fn into_parts(self) -> Result<(RestaurantId, InteractionUpdate), Error> {
        let restaurant_id = RestaurantId::new(require(self.restaurant_id, RESTAURANT_ID)?);
        let rating = self
            .rating
            .map(|raw| raw.map(InteractionRating::new).transpose())
            .transpose()
            .map_err(|err| {
                field_error(FieldName::new("rating"), ErrorCode::OutOfRange, err.to_string())
            })?;
        let update = InteractionUpdate::new()
            .with_opt(self.upvoted.map(InteractionChange::Upvoted))
            .with_opt(self.favorited.map(InteractionChange::Favorited))
            .with_opt(rating.map(InteractionChange::Rating))
            .with_opt(self.comment.map(InteractionChange::Comment))
            .with_opt(self.visited_at.map(InteractionChange::VisitedAt));
        Ok((restaurant_id, update))
    }
}

/// Body for `POST /api/v1/restaurants/user/upvote`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpvoteRequest {
    #[schema(value_type = i32, example = 42)]
    pub restaurant_id: Option<i32>,
    /// Explicit target state; omitted flips the current value.
    pub upvoted: Option<bool>,
}

/// Create or update the caller's interaction with a restaurant.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/user",
    request_body = InteractionRequest,
    responses(
        (status = 200, description = "Interaction stored", body = Envelope<Interaction>),
        (status = 400, description = "Invalid or empty update", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Restaurant not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["interactions"],
    operation_id = "recordInteraction",
    security(("bearer" = []))
)]
#[post("/restaurants/user")]
pub async fn record_interaction(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<InteractionRequest>,
) -> ApiResult<web::Json<Envelope<Interaction>>> {
    let (restaurant_id, update) = payload.into_inner().into_parts()?;
    let interaction = state
        .interactions
        .record(user.user_id(), restaurant_id, update)
        .await?;
    Ok(web::Json(Envelope::new(interaction)))
}

/// Toggle, or explicitly set, the caller's upvote.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/user/upvote",
    request_body = UpvoteRequest,
    responses(
        (status = 200, description = "Upvote state and restaurant counter", body = Envelope<UpvoteOutcome>),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Restaurant not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["interactions"],
    operation_id = "toggleUpvote",
    security(("bearer" = []))
)]
#[post("/restaurants/user/upvote")]
pub async fn toggle_upvote(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<UpvoteRequest>,
) -> ApiResult<web::Json<Envelope<UpvoteOutcome>>> {
    let UpvoteRequest {
        restaurant_id,
        upvoted,
    } = payload.into_inner();
    let restaurant_id = RestaurantId::new(require(restaurant_id, RESTAURANT_ID)?);
    let outcome = state
        .interactions
        .toggle_upvote(user.user_id(), restaurant_id, upvoted)
        .await?;
    Ok(web::Json(Envelope::new(outcome)))
}

#[cfg(test)]
#[path = "interactions_tests.rs"]
mod tests;
