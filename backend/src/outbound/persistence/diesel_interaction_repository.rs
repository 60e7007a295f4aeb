//! PostgreSQL-backed `InteractionRepository` implementation using Diesel ORM.
//!
//! The `(user_id, restaurant_id)` unique constraint makes every write an
//! upsert. Any write that sets `upvoted` locks the restaurant row first so
//! two first-time upvotes for the same pair cannot both observe "no row" and
//! double count, then moves `total_upvotes` by the resulting delta.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sql_types::Integer;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{InteractionPersistenceError, InteractionRepository};
use crate::domain::{
    Interaction, InteractionUpdate, RestaurantId, UpvoteOutcome, UpvoteTransition, UserId,
    requested_upvote,
};

use super::diesel_error_mapping::{DieselFailure, classify};
use super::models::{InteractionChangesetRow, InteractionRow, NewInteractionRow};
use super::pool::{DbPool, PoolError};
use super::schema::{restaurant_user, restaurants};

diesel::define_sql_function!(fn greatest(a: Integer, b: Integer) -> Integer);

/// Recompute every denormalised counter from `restaurant_user`.
const AGGREGATE_SQL: &str = "\
    UPDATE restaurants AS r SET \
        total_upvotes = (SELECT COUNT(*) FROM restaurant_user ru \
            WHERE ru.restaurant_id = r.id AND ru.upvoted)::INTEGER, \
        total_favorites = (SELECT COUNT(*) FROM restaurant_user ru \
            WHERE ru.restaurant_id = r.id AND ru.favorited)::INTEGER, \
        total_comments = (SELECT COUNT(*) FROM restaurant_user ru \
            WHERE ru.restaurant_id = r.id \
            AND ru.comment IS NOT NULL AND BTRIM(ru.comment) <> '')::INTEGER, \
        average_ratings = COALESCE((SELECT AVG(ru.rating)::DOUBLE PRECISION \
            FROM restaurant_user ru WHERE ru.restaurant_id = r.id), 0)";

/// Diesel-backed implementation of the `InteractionRepository` port.
#[derive(Clone)]
pub struct DieselInteractionRepository {
    pool: DbPool,
}

impl DieselInteractionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> InteractionPersistenceError {
    InteractionPersistenceError::connection(error.into_message())
}

/// Map a Diesel error for a statement touching `restaurant_id`.
///
/// A foreign-key violation on the restaurant column, or a missing locked
/// restaurant row, both mean the restaurant does not exist.
fn map_diesel_error(
    error: diesel::result::Error,
    restaurant_id: RestaurantId,
) -> InteractionPersistenceError {
    match classify(error) {
        DieselFailure::Connection(message) => InteractionPersistenceError::connection(message),
        DieselFailure::ForeignKeyViolation { constraint }
            if constraint
                .as_deref()
                .is_some_and(|name| name.contains("restaurant_id")) =>
        {
            InteractionPersistenceError::restaurant_not_found(restaurant_id.get())
        }
        DieselFailure::ForeignKeyViolation { .. } => {
            InteractionPersistenceError::query("user does not exist")
        }
        DieselFailure::NotFound => {
            InteractionPersistenceError::restaurant_not_found(restaurant_id.get())
        }
        DieselFailure::UniqueViolation { .. } => {
            InteractionPersistenceError::query("duplicate interaction")
        }
        DieselFailure::Query(message) => InteractionPersistenceError::query(message),
    }
}

/// Lock the restaurant row; `NotFound` when it does not exist.
async fn lock_restaurant(conn: &mut AsyncPgConnection, restaurant: i32) -> QueryResult<()> {
    restaurants::table
        .find(restaurant)
        .select(restaurants::id)
        .for_update()
        .first::<i32>(conn)
        .await
        .map(|_| ())
}

async fn stored_upvote(
    conn: &mut AsyncPgConnection,
    user: Uuid,
    restaurant: i32,
) -> QueryResult<Option<bool>> {
    restaurant_user::table
        .filter(restaurant_user::user_id.eq(user))
        .filter(restaurant_user::restaurant_id.eq(restaurant))
        .select(restaurant_user::upvoted)
        .for_update()
        .first(conn)
        .await
        .optional()
}

/// Apply `delta` to `total_upvotes`, never below zero.
async fn adjust_upvotes(
    conn: &mut AsyncPgConnection,
    restaurant: i32,
    delta: i32,
) -> QueryResult<i32> {
    diesel::update(restaurants::table.find(restaurant))
        .set(restaurants::total_upvotes.eq(greatest(restaurants::total_upvotes + delta, 0)))
        .returning(restaurants::total_upvotes)
        .get_result(conn)
        .await
}

#[async_trait]
impl InteractionRepository for DieselInteractionRepository {
    async fn upsert(
        &self,
        user_id: &UserId,
        restaurant_id: RestaurantId,
        update: &InteractionUpdate,
    ) -> Result<Interaction, InteractionPersistenceError> {
        let now = Utc::now();
        let changes = InteractionChangesetRow::from_update(update, now);
        let insert = changes.to_new_row(*user_id.as_uuid(), restaurant_id.get(), now);
        let requested = requested_upvote(update);
        let (changes, insert) = (&changes, &insert);
        let (user, restaurant) = (*user_id.as_uuid(), restaurant_id.get());

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction::<Interaction, diesel::result::Error, _>(|conn| {
            async move {
                // Upvote writes keep `total_upvotes` in step, as toggles do.
                let transition = match requested {
                    Some(upvoted) => {
                        lock_restaurant(conn, restaurant).await?;
                        let current = stored_upvote(conn, user, restaurant).await?;
                        Some(UpvoteTransition::resolve(current, Some(upvoted)))
                    }
                    None => None,
                };

                let row: InteractionRow = diesel::insert_into(restaurant_user::table)
                    .values(insert)
                    .on_conflict((restaurant_user::user_id, restaurant_user::restaurant_id))
                    .do_update()
                    .set(changes)
                    .returning(InteractionRow::as_returning())
                    .get_result(conn)
                    .await?;

                if let Some(transition) = transition.filter(|t| t.delta != 0) {
                    debug!(?transition, "upvote written through interaction upsert");
                    adjust_upvotes(conn, restaurant, transition.delta).await?;
                }
                Ok(row.into())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_diesel_error(err, restaurant_id))
    }

    async fn toggle_upvote(
        &self,
        user_id: &UserId,
        restaurant_id: RestaurantId,
        requested: Option<bool>,
    ) -> Result<UpvoteOutcome, InteractionPersistenceError> {
        let user = *user_id.as_uuid();
        let restaurant = restaurant_id.get();

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction::<UpvoteOutcome, diesel::result::Error, _>(|conn| {
            async move {
                lock_restaurant(conn, restaurant).await?;
                let current = stored_upvote(conn, user, restaurant).await?;
                let transition = UpvoteTransition::resolve(current, requested);
                debug!(?current, ?transition, "resolved upvote transition");

                let now = Utc::now();
                let row: InteractionRow = diesel::insert_into(restaurant_user::table)
                    .values(NewInteractionRow {
                        user_id: user,
                        restaurant_id: restaurant,
                        upvoted: transition.upvoted,
                        favorited: false,
                        rating: None,
                        comment: None,
                        visited_at: None,
                        created_at: now,
                        updated_at: now,
                    })
                    .on_conflict((restaurant_user::user_id, restaurant_user::restaurant_id))
                    .do_update()
                    .set((
                        restaurant_user::upvoted.eq(excluded(restaurant_user::upvoted)),
                        restaurant_user::updated_at.eq(excluded(restaurant_user::updated_at)),
                    ))
                    .returning(InteractionRow::as_returning())
                    .get_result(conn)
                    .await?;

                let total_upvotes = adjust_upvotes(conn, restaurant, transition.delta).await?;

                Ok(UpvoteOutcome {
                    interaction: row.into(),
                    total_upvotes,
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_diesel_error(err, restaurant_id))
    }

    async fn aggregate_counters(&self) -> Result<usize, InteractionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::sql_query(AGGREGATE_SQL)
            .execute(&mut conn)
            .await
            .map_err(|err| match classify(err) {
                DieselFailure::Connection(message) => {
                    InteractionPersistenceError::connection(message)
                }
                _ => InteractionPersistenceError::query("counter aggregation failed"),
            })
    }
}
