//! Places search handler.
//!
//! ```text
//! POST /api/v1/restaurants/google/search-by-text {"text":"ramen","location":{"latitude":51.5,"longitude":-0.12}}
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{CoordinateError, Coordinates, Error, PlaceSearch, PlaceSearchError, RankedPlace};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::Envelope;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{ErrorCode, FieldName, field_error, field_value_error};

/// Point the results are biased towards and ranked from.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LocationBody {
    #[schema(example = 51.5)]
    pub latitude: f64,
    #[schema(example = -0.12)]
    pub longitude: f64,
}

/// Body for `POST /api/v1/restaurants/google/search-by-text`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SearchByTextRequest {
    #[schema(example = "ramen")]
    pub text: String,
    pub location: LocationBody,
}

impl TryFrom<SearchByTextRequest> for PlaceSearch {
    type Error = Error;

    fn try_from(value: SearchByTextRequest) -> Result<Self, Self::Error> {
        let origin = Coordinates::new(value.location.latitude, value.location.longitude)
            .map_err(map_coordinate_error)?;
        Self::new(&value.text, origin).map_err(map_search_error)
    }
}

fn map_coordinate_error(err: CoordinateError) -> Error {
    let (field, value) = match err {
        CoordinateError::Latitude(value) => ("location.latitude", value),
        CoordinateError::Longitude(value) => ("location.longitude", value),
    };
    field_value_error(
        FieldName::new(field),
        ErrorCode::OutOfRange,
        value.to_string(),
        err.to_string(),
    )
}

fn map_search_error(err: PlaceSearchError) -> Error {
    let code = match err {
        PlaceSearchError::EmptyText => ErrorCode::Empty,
        PlaceSearchError::TextTooLong { .. } => ErrorCode::TooLong,
    };
    field_error(FieldName::new("text"), code, err.to_string())
}

/// Search the places provider and rank results nearest first.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/google/search-by-text",
    request_body = SearchByTextRequest,
    responses(
        (status = 200, description = "Ranked candidates", body = Envelope<Vec<RankedPlace>>),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 502, description = "Provider returned an error", body = Error),
        (status = 503, description = "Provider unavailable or not configured", body = Error)
    ),
    tags = ["places"],
    operation_id = "searchPlacesByText",
    security(("bearer" = []))
)]
#[post("/restaurants/google/search-by-text")]
pub async fn search_by_text(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
    payload: web::Json<SearchByTextRequest>,
) -> ApiResult<web::Json<Envelope<Vec<RankedPlace>>>> {
    let search = PlaceSearch::try_from(payload.into_inner())?;
    let places = state.places.search(&search).await?;
    Ok(web::Json(Envelope::new(places)))
}
