//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and never
//! leave it. Conversions to and from domain types live next to each struct.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer};
use uuid::Uuid;

use crate::domain::{
    InteractionChange, InteractionUpdate, NewRestaurant, Restaurant, RestaurantChange,
    RestaurantId, RestaurantUpdate, UserAccount, UserId, UserProfile,
};

use super::schema::{restaurant_user, restaurants, restaurants_daily_feed, users};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for UserAccount {
    fn from(row: UserRow) -> Self {
        Self {
            profile: UserProfile {
                id: UserId::from_uuid(row.id),
                email: row.email,
                username: row.username,
                full_name: row.full_name,
                avatar_url: row.avatar_url,
                is_active: row.is_active,
                is_verified: row.is_verified,
                created_at: row.created_at,
            },
            password_hash: row.password_hash,
        }
    }
}

/// Insertable struct for creating user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub username: &'a str,
    pub password_hash: &'a str,
    pub full_name: &'a str,
    pub avatar_url: Option<&'a str>,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a UserAccount> for NewUserRow<'a> {
    fn from(account: &'a UserAccount) -> Self {
        let profile = &account.profile;
        Self {
            id: *profile.id.as_uuid(),
            email: profile.email.as_str(),
            username: profile.username.as_str(),
            password_hash: account.password_hash.as_str(),
            full_name: profile.full_name.as_str(),
            avatar_url: profile.avatar_url.as_deref(),
            is_active: profile.is_active,
            is_verified: profile.is_verified,
            created_at: profile.created_at,
            updated_at: profile.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Restaurants
// ---------------------------------------------------------------------------

/// Row struct for reading restaurants, also usable from raw SQL results.
#[derive(Debug, Clone, Queryable, Selectable, QueryableByName)]
#[diesel(table_name = restaurants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RestaurantRow {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub longitude: f64,
    pub latitude: f64,
    pub price_range: Option<i16>,
    pub rating: Option<f64>,
    pub total_upvotes: i32,
    pub total_favorites: i32,
    pub total_comments: i32,
    pub average_ratings: f64,
    pub website: Option<String>,
    pub image_url: Option<String>,
    pub link: Option<String>,
    pub contributor_id: Option<Uuid>,
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RestaurantRow> for Restaurant {
    fn from(row: RestaurantRow) -> Self {
        Self {
            id: RestaurantId::new(row.id),
            name: row.name,
            address: row.address,
            longitude: row.longitude,
            latitude: row.latitude,
            price_range: row.price_range,
            rating: row.rating,
            total_upvotes: row.total_upvotes,
            total_favorites: row.total_favorites,
            total_comments: row.total_comments,
            average_ratings: row.average_ratings,
            website: row.website,
            image_url: row.image_url,
            link: row.link,
            contributor_id: row.contributor_id.map(UserId::from_uuid),
            external_id: row.external_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insertable struct for creating restaurants.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = restaurants)]
pub(crate) struct NewRestaurantRow<'a> {
    pub name: &'a str,
    pub address: &'a str,
    pub longitude: f64,
    pub latitude: f64,
    pub price_range: Option<i16>,
    pub rating: Option<f64>,
    pub website: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub link: Option<&'a str>,
    pub contributor_id: Option<Uuid>,
    pub external_id: Option<&'a str>,
}

impl<'a> From<&'a NewRestaurant> for NewRestaurantRow<'a> {
    fn from(restaurant: &'a NewRestaurant) -> Self {
        Self {
            name: restaurant.name.as_str(),
            address: restaurant.address.as_str(),
            longitude: restaurant.location.longitude(),
            latitude: restaurant.location.latitude(),
            price_range: restaurant.price_range.map(|p| p.get()),
            rating: restaurant.rating.map(|r| r.get()),
            website: restaurant.website.as_deref(),
            image_url: restaurant.image_url.as_deref(),
            link: restaurant.link.as_deref(),
            contributor_id: restaurant.contributor_id.map(|id| *id.as_uuid()),
            external_id: restaurant.external_id.as_deref(),
        }
    }
}

/// Changeset for partial restaurant updates.
///
/// Outer `None` leaves a column untouched; `Some(None)` writes `NULL`.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = restaurants)]
pub(crate) struct RestaurantChangesetRow {
    pub name: Option<String>,
    pub address: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub price_range: Option<Option<i16>>,
    pub rating: Option<Option<f64>>,
    pub website: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
    pub link: Option<Option<String>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RestaurantChangesetRow {
    /// Translate each tagged change into exactly one column assignment.
    pub(crate) fn from_update(update: &RestaurantUpdate, now: DateTime<Utc>) -> Self {
        let mut row = Self {
            updated_at: Some(now),
            ..Self::default()
        };
        for change in update {
            match change {
                RestaurantChange::Name(name) => row.name = Some(name.clone()),
                RestaurantChange::Address(address) => row.address = Some(address.clone()),
                RestaurantChange::Location(location) => {
                    row.latitude = Some(location.latitude());
                    row.longitude = Some(location.longitude());
                }
                RestaurantChange::PriceRange(price) => {
                    row.price_range = Some(price.map(|p| p.get()));
                }
                RestaurantChange::Rating(rating) => row.rating = Some(rating.map(|r| r.get())),
                RestaurantChange::Website(website) => row.website = Some(website.clone()),
                RestaurantChange::ImageUrl(url) => row.image_url = Some(url.clone()),
                RestaurantChange::Link(link) => row.link = Some(link.clone()),
            }
        }
        row
    }
}

// ---------------------------------------------------------------------------
// Interactions
// ---------------------------------------------------------------------------

/// Row struct for reading interactions.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = restaurant_user)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InteractionRow {
    pub id: i64,
    pub user_id: Uuid,
    pub restaurant_id: i32,
    pub upvoted: bool,
    pub favorited: bool,
    pub rating: Option<i16>,
    pub comment: Option<String>,
    pub visited_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<InteractionRow> for crate::domain::Interaction {
    fn from(row: InteractionRow) -> Self {
        Self {
            id: row.id,
            user_id: UserId::from_uuid(row.user_id),
            restaurant_id: RestaurantId::new(row.restaurant_id),
            upvoted: row.upvoted,
            favorited: row.favorited,
            rating: row.rating,
            comment: row.comment,
            visited_at: row.visited_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insertable struct for the first write of a (user, restaurant) pair.
///
/// Columns absent from the update take their table defaults.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = restaurant_user)]
pub(crate) struct NewInteractionRow {
    pub user_id: Uuid,
    pub restaurant_id: i32,
    pub upvoted: bool,
    pub favorited: bool,
    pub rating: Option<i16>,
    pub comment: Option<String>,
    pub visited_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset applied when the pair already has a row.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = restaurant_user)]
pub(crate) struct InteractionChangesetRow {
    pub upvoted: Option<bool>,
    pub favorited: Option<bool>,
    pub rating: Option<Option<i16>>,
    pub comment: Option<Option<String>>,
    pub visited_at: Option<Option<DateTime<Utc>>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl InteractionChangesetRow {
    /// Translate each tagged change into exactly one column assignment.
    pub(crate) fn from_update(update: &InteractionUpdate, now: DateTime<Utc>) -> Self {
        let mut row = Self {
            updated_at: Some(now),
            ..Self::default()
        };
        for change in update {
            match change {
                InteractionChange::Upvoted(value) => row.upvoted = Some(*value),
                InteractionChange::Favorited(value) => row.favorited = Some(*value),
                InteractionChange::Rating(rating) => row.rating = Some(rating.map(|r| r.get())),
                InteractionChange::Comment(comment) => row.comment = Some(comment.clone()),
                InteractionChange::VisitedAt(at) => row.visited_at = Some(*at),
            }
        }
        row
    }

    /// Insert values for a new row, defaulting untouched columns.
    pub(crate) fn to_new_row(
        &self,
        user_id: Uuid,
        restaurant_id: i32,
        now: DateTime<Utc>,
    ) -> NewInteractionRow {
        NewInteractionRow {
            user_id,
            restaurant_id,
            upvoted: self.upvoted.unwrap_or(false),
            favorited: self.favorited.unwrap_or(false),
            rating: self.rating.flatten(),
            comment: self.comment.clone().flatten(),
            visited_at: self.visited_at.flatten(),
            created_at: now,
            updated_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// Daily feed
// ---------------------------------------------------------------------------

/// Insertable feed slot.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = restaurants_daily_feed)]
pub(crate) struct NewFeedRow {
    pub feed_date: NaiveDate,
    pub position: i32,
    pub restaurant_id: i32,
}

/// Feed slot joined with its restaurant, read through raw SQL.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct FeedRow {
    #[diesel(sql_type = Integer)]
    pub position: i32,
    #[diesel(embed)]
    pub restaurant: RestaurantRow,
}

/// Single `COUNT(*)` result.
#[derive(Debug, Clone, Copy, QueryableByName)]
pub(crate) struct CountRow {
    #[diesel(sql_type = BigInt)]
    pub total: i64,
}
