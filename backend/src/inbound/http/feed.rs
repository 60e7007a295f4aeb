//! Daily feed handler.
//!
//! ```text
//! GET /api/v1/feed?latitude=51.5&longitude=-0.12&radius=5&priceRange=2&minRating=4&limit=20&offset=0
//! ```
//!
//! Filter values are parsed strictly: a non-numeric or out-of-range value is
//! a 400. Pagination is lenient: anything but a positive `limit` and a
//! non-negative `offset` returns the whole day's feed.

use actix_web::{get, web};
use pagination::{Page, PageWindow};
use serde::Deserialize;

use crate::domain::{
    CoordinateError, Error, FeedFilter, FeedFilterInput, FeedItem, FeedQueryError, FeedRequest,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    ErrorCode, FieldName, field_error, field_value_error, parse_optional_f64, parse_optional_i64,
};

const LONGITUDE: FieldName = FieldName::new("longitude");
const LATITUDE: FieldName = FieldName::new("latitude");
const RADIUS: FieldName = FieldName::new("radius");
const PRICE_RANGE: FieldName = FieldName::new("priceRange");
const MIN_RATING: FieldName = FieldName::new("minRating");

/// Raw query string for `GET /api/v1/feed`.
///
/// Values stay as strings so parse failures can name the offending field.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FeedQueryParams {
    /// Longitude of the search centre, `[-180, 180]`.
    #[param(value_type = Option<f64>)]
    pub longitude: Option<String>,
    /// Latitude of the search centre, `[-90, 90]`.
    #[param(value_type = Option<f64>)]
    pub latitude: Option<String>,
    /// Search radius in kilometres; defaults to the configured maximum.
    #[param(value_type = Option<f64>)]
    pub radius: Option<String>,
    /// Price band, 1 to 5.
    #[param(value_type = Option<i32>)]
    pub price_range: Option<String>,
    /// Minimum rating, 0 to 5.
    #[param(value_type = Option<f64>)]
    pub min_rating: Option<String>,
    /// Page size; must be positive to enable pagination.
    #[param(value_type = Option<u32>)]
    pub limit: Option<String>,
    /// Items to skip; defaults to 0.
    #[param(value_type = Option<u64>)]
    pub offset: Option<String>,
}

impl FeedQueryParams {
    fn into_request(self, max_radius_km: f64) -> Result<FeedRequest, Error> {
        let input = FeedFilterInput {
            longitude: parse_optional_f64(self.longitude.as_deref(), LONGITUDE)?,
            latitude: parse_optional_f64(self.latitude.as_deref(), LATITUDE)?,
            radius_km: parse_optional_f64(self.radius.as_deref(), RADIUS)?,
            price_range: parse_optional_i64(self.price_range.as_deref(), PRICE_RANGE)?,
            min_rating: parse_optional_f64(self.min_rating.as_deref(), MIN_RATING)?,
        };
        let filter = FeedFilter::try_new(input, max_radius_km).map_err(map_feed_query_error)?;
        Ok(FeedRequest {
            filter,
            window: PageWindow::from_query(self.limit.as_deref(), self.offset.as_deref()),
        })
    }
}

fn map_feed_query_error(err: FeedQueryError) -> Error {
    let message = err.to_string();
    match err {
        FeedQueryError::IncompleteLocation => field_error(
            FieldName::new("location"),
            ErrorCode::IncompleteLocation,
            message,
        ),
        FeedQueryError::Coordinates(CoordinateError::Latitude(value)) => {
            field_value_error(LATITUDE, ErrorCode::OutOfRange, value.to_string(), message)
        }
        FeedQueryError::Coordinates(CoordinateError::Longitude(value)) => {
            field_value_error(LONGITUDE, ErrorCode::OutOfRange, value.to_string(), message)
        }
        FeedQueryError::Radius { value, .. } => {
            field_value_error(RADIUS, ErrorCode::OutOfRange, value.to_string(), message)
        }
        FeedQueryError::PriceRange(value) => {
            field_value_error(PRICE_RANGE, ErrorCode::OutOfRange, value.to_string(), message)
        }
        FeedQueryError::MinRating(value) => {
            field_value_error(MIN_RATING, ErrorCode::OutOfRange, value.to_string(), message)
        }
    }
}

/// Today's feed, filtered and optionally paginated.
#[utoipa::path(
    get,
    path = "/api/v1/feed",
    params(FeedQueryParams),
    responses(
        (status = 200, description = "Feed page", body = crate::inbound::http::schemas::FeedPageSchema),
        (status = 400, description = "Invalid filter", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Database unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["feed"],
    operation_id = "dailyFeed",
    security(("bearer" = []))
)]
#[get("/feed")]
pub async fn daily_feed(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
    query: web::Query<FeedQueryParams>,
) -> ApiResult<web::Json<Page<FeedItem>>> {
    let request = query.into_inner().into_request(state.max_radius_km)?;
    let page = state.feed.daily_feed(&request).await?;
    Ok(web::Json(page))
}

#[cfg(test)]
#[path = "feed_tests.rs"]
mod tests;
