//! Restaurant administration handlers, guarded by `x-api-key`.
//!
//! ```text
//! POST   /api/v1/restaurants        {"name":"Noodle Bar","address":"1 High St","latitude":51.5,"longitude":-0.12}
//! PUT    /api/v1/restaurants/{id}   {"rating":4.5,"website":null}
//! DELETE /api/v1/restaurants/{id}
//! ```
//!
//! Update bodies are allow-listed: each recognised key maps to exactly one
//! [`RestaurantChange`], unknown keys are rejected, and `null` clears an
//! optional column.

use actix_web::{HttpResponse, delete, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::restaurant::{non_blank, optional_text};
use crate::domain::{
    CoordinateError, Coordinates, Error, NewRestaurant, PriceRange, Rating, Restaurant,
    RestaurantChange, RestaurantId, RestaurantUpdate, RestaurantValidationError, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::ApiKey;
use crate::inbound::http::schemas::Envelope;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    ErrorCode, FieldName, field_error, field_value_error, nullable,
};

/// Body for `POST /api/v1/restaurants`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateRestaurantRequest {
    #[schema(example = "Noodle Bar")]
    pub name: String,
    #[schema(example = "1 High Street, London")]
    pub address: String,
    #[schema(example = 51.5)]
    pub latitude: f64,
    #[schema(example = -0.12)]
    pub longitude: f64,
    pub price_range: Option<i64>,
    pub rating: Option<f64>,
    pub website: Option<String>,
    pub image_url: Option<String>,
    pub link: Option<String>,
    /// UUID of the contributing user.
    pub contributor_id: Option<String>,
    /// Places provider identifier; unique when present.
    pub external_id: Option<String>,
}

impl TryFrom<CreateRestaurantRequest> for NewRestaurant {
    type Error = Error;

    fn try_from(value: CreateRestaurantRequest) -> Result<Self, Self::Error> {
        let mut restaurant =
            Self::new(&value.name, &value.address, value.latitude, value.longitude)
                .map_err(map_restaurant_validation_error)?;
        restaurant.price_range = value
            .price_range
            .map(PriceRange::new)
            .transpose()
            .map_err(map_restaurant_validation_error)?;
        restaurant.rating = value
            .rating
            .map(Rating::new)
            .transpose()
            .map_err(map_restaurant_validation_error)?;
        restaurant.website = optional_text(value.website);
        restaurant.image_url = optional_text(value.image_url);
        restaurant.link = optional_text(value.link);
        restaurant.external_id = optional_text(value.external_id);
        restaurant.contributor_id = optional_text(value.contributor_id)
            .map(|raw| {
                UserId::new(&raw).map_err(|_| {
                    field_value_error(
                        FieldName::new("contributor_id"),
                        ErrorCode::InvalidFormat,
                        raw.clone(),
                        "contributor_id must be a valid UUID",
                    )
                })
            })
            .transpose()?;
        Ok(restaurant)
    }
}

/// Body for `PUT /api/v1/restaurants/{id}`. Every key is optional.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateRestaurantRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    /// Must be sent together with `longitude`.
    pub latitude: Option<f64>,
    /// Must be sent together with `latitude`.
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i64>)]
    pub price_range: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<f64>)]
    pub rating: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub website: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub link: Option<Option<String>>,
}

impl TryFrom<UpdateRestaurantRequest> for RestaurantUpdate {
    type Error = Error;

    fn try_from(value: UpdateRestaurantRequest) -> Result<Self, Self::Error> {
        let name = value
            .name
            .map(|raw| required_text(&raw, RestaurantValidationError::EmptyName))
            .transpose()?;
        let address = value
            .address
            .map(|raw| required_text(&raw, RestaurantValidationError::EmptyAddress))
            .transpose()?;
        let location = match (value.latitude, value.longitude) {
            (Some(latitude), Some(longitude)) => Some(
                Coordinates::new(latitude, longitude)
                    .map_err(|err| map_restaurant_validation_error(err.into()))?,
            ),
            (None, None) => None,
            _ => {
                return Err(field_error(
                    FieldName::new("location"),
                    ErrorCode::IncompleteLocation,
                    "latitude and longitude must be provided together",
                ));
            }
        };
        let price_range = value
            .price_range
            .map(|raw| raw.map(PriceRange::new).transpose())
            .transpose()
            .map_err(map_restaurant_validation_error)?;
        let rating = value
            .rating
            .map(|raw| raw.map(Rating::new).transpose())
            .transpose()
            .map_err(map_restaurant_validation_error)?;

        Ok(Self::new()
            .with_opt(name.map(RestaurantChange::Name))
            .with_opt(address.map(RestaurantChange::Address))
            .with_opt(location.map(RestaurantChange::Location))
            .with_opt(price_range.map(RestaurantChange::PriceRange))
            .with_opt(rating.map(RestaurantChange::Rating))
            .with_opt(value.website.map(|v| RestaurantChange::Website(optional_text(v))))
            .with_opt(value.image_url.map(|v| RestaurantChange::ImageUrl(optional_text(v))))
            .with_opt(value.link.map(|v| RestaurantChange::Link(optional_text(v)))))
    }
}

fn required_text(raw: &str, blank: RestaurantValidationError) -> Result<String, Error> {
    non_blank(raw, blank).map_err(map_restaurant_validation_error)
}

fn map_restaurant_validation_error(err: RestaurantValidationError) -> Error {
    let message = err.to_string();
    match err {
        RestaurantValidationError::EmptyName => {
            field_error(FieldName::new("name"), ErrorCode::Empty, message)
        }
        RestaurantValidationError::EmptyAddress => {
            field_error(FieldName::new("address"), ErrorCode::Empty, message)
        }
        RestaurantValidationError::Coordinates(CoordinateError::Latitude(value)) => {
            field_value_error(
                FieldName::new("latitude"),
                ErrorCode::OutOfRange,
                value.to_string(),
                message,
            )
        }
        RestaurantValidationError::Coordinates(CoordinateError::Longitude(value)) => {
            field_value_error(
                FieldName::new("longitude"),
                ErrorCode::OutOfRange,
                value.to_string(),
                message,
            )
        }
        RestaurantValidationError::PriceRange(value) => field_value_error(
            FieldName::new("price_range"),
            ErrorCode::OutOfRange,
            value.to_string(),
            message,
        ),
        RestaurantValidationError::Rating(value) => field_value_error(
            FieldName::new("rating"),
            ErrorCode::OutOfRange,
            value.to_string(),
            message,
        ),
    }
}

/// Create a restaurant.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants",
    request_body = CreateRestaurantRequest,
    responses(
        (status = 201, description = "Restaurant created", body = Envelope<Restaurant>),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Missing API key", body = Error),
        (status = 403, description = "Invalid API key", body = Error),
        (status = 409, description = "Duplicate external id", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["restaurants"],
    operation_id = "createRestaurant",
    security(("api_key" = []))
)]
#[post("/restaurants")]
pub async fn create_restaurant(
    state: web::Data<HttpState>,
    _key: ApiKey,
    payload: web::Json<CreateRestaurantRequest>,
) -> ApiResult<HttpResponse> {
    let restaurant = NewRestaurant::try_from(payload.into_inner())?;
    let created = state.restaurants.create(restaurant).await?;
    Ok(HttpResponse::Created().json(Envelope::new(created)))
}

/// Apply a partial update.
#[utoipa::path(
    put,
    path = "/api/v1/restaurants/{id}",
    params(("id" = i32, Path, description = "Restaurant id")),
    request_body = UpdateRestaurantRequest,
    responses(
        (status = 200, description = "Restaurant updated", body = Envelope<Restaurant>),
        (status = 400, description = "Invalid or empty update", body = Error),
        (status = 401, description = "Missing API key", body = Error),
        (status = 403, description = "Invalid API key", body = Error),
        (status = 404, description = "Restaurant not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["restaurants"],
    operation_id = "updateRestaurant",
    security(("api_key" = []))
)]
#[put("/restaurants/{id}")]
pub async fn update_restaurant(
    state: web::Data<HttpState>,
    _key: ApiKey,
    path: web::Path<i32>,
    payload: web::Json<UpdateRestaurantRequest>,
) -> ApiResult<web::Json<Envelope<Restaurant>>> {
    let id = RestaurantId::new(path.into_inner());
    let update = RestaurantUpdate::try_from(payload.into_inner())?;
    let updated = state.restaurants.update(id, update).await?;
    Ok(web::Json(Envelope::new(updated)))
}

/// Remove a restaurant together with its feed rows and interactions.
#[utoipa::path(
    delete,
    path = "/api/v1/restaurants/{id}",
    params(("id" = i32, Path, description = "Restaurant id")),
    responses(
        (status = 204, description = "Restaurant deleted"),
        (status = 401, description = "Missing API key", body = Error),
        (status = 403, description = "Invalid API key", body = Error),
        (status = 404, description = "Restaurant not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["restaurants"],
    operation_id = "deleteRestaurant",
    security(("api_key" = []))
)]
#[delete("/restaurants/{id}")]
pub async fn delete_restaurant(
    state: web::Data<HttpState>,
    _key: ApiKey,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    state
        .restaurants
        .delete(RestaurantId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "restaurants_tests.rs"]
mod tests;
