//! PostgreSQL-backed `FeedRepository` implementation using Diesel ORM.
//!
//! Rotation swaps the whole `restaurants_daily_feed` table inside one
//! transaction, so readers see either yesterday's mapping or today's and
//! never a partial one. Feed reads join the slot table with `restaurants`
//! through raw SQL because the distance predicate is easier to express
//! directly than through the query builder.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Date, Double, Nullable, SmallInt};
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{FeedPersistenceError, FeedRepository, FeedSlice};
use crate::domain::{DailyFeed, FeedFilter, FeedItem, FeedRequest, Restaurant};

use super::diesel_error_mapping::{DieselFailure, classify};
use super::models::{CountRow, FeedRow, NewFeedRow};
use super::pool::{DbPool, PoolError};
use super::schema::restaurants_daily_feed;

/// Rows per insert statement; three binds each keeps well under the
/// PostgreSQL parameter limit.
const INSERT_CHUNK: usize = 10_000;

/// Shared FROM/WHERE clause for the page and count queries.
///
/// Binds: `$1` today, `$2`/`$3` latitude/longitude, `$4` radius in km,
/// `$5` price range, `$6` minimum rating.
macro_rules! feed_filter_sql {
    () => {
        " FROM restaurants_daily_feed f \
          JOIN restaurants r ON r.id = f.restaurant_id \
          WHERE f.feed_date = ( \
              SELECT MAX(feed_date) FROM restaurants_daily_feed WHERE feed_date <= $1 \
          ) \
          AND ($2::DOUBLE PRECISION IS NULL OR \
              2 * 6371.0088 * ASIN(LEAST(1.0, SQRT( \
                  POWER(SIN(RADIANS(r.latitude - $2) / 2), 2) \
                  + COS(RADIANS($2)) * COS(RADIANS(r.latitude)) \
                  * POWER(SIN(RADIANS(r.longitude - $3) / 2), 2) \
              ))) <= $4) \
          AND ($5::SMALLINT IS NULL OR r.price_range = $5) \
          AND ($6::DOUBLE PRECISION IS NULL OR r.rating >= $6)"
    };
}

const PAGE_SQL: &str = concat!(
    "SELECT f.position, r.*",
    feed_filter_sql!(),
    " ORDER BY f.position ASC LIMIT $7 OFFSET $8"
);

const COUNT_SQL: &str = concat!("SELECT COUNT(*) AS total", feed_filter_sql!());

/// Diesel-backed implementation of the `FeedRepository` port.
#[derive(Clone)]
pub struct DieselFeedRepository {
    pool: DbPool,
}

impl DieselFeedRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> FeedPersistenceError {
    FeedPersistenceError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> FeedPersistenceError {
    match classify(error) {
        DieselFailure::Connection(message) => FeedPersistenceError::connection(message),
        DieselFailure::ForeignKeyViolation { .. } => {
            FeedPersistenceError::query("feed references a missing restaurant")
        }
        DieselFailure::UniqueViolation { .. } => {
            FeedPersistenceError::query("duplicate feed position")
        }
        DieselFailure::NotFound => FeedPersistenceError::query("record not found"),
        DieselFailure::Query(message) => FeedPersistenceError::query(message),
    }
}

/// Bind values for the filter clause, `None` disabling a predicate.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FilterBinds {
    latitude: Option<f64>,
    longitude: Option<f64>,
    radius_km: Option<f64>,
    price_range: Option<i16>,
    min_rating: Option<f64>,
}

impl From<&FeedFilter> for FilterBinds {
    fn from(filter: &FeedFilter) -> Self {
        Self {
            latitude: filter.proximity.map(|p| p.origin.latitude()),
            longitude: filter.proximity.map(|p| p.origin.longitude()),
            radius_km: filter.proximity.map(|p| p.radius_km),
            price_range: filter.price_range.map(|p| p.get()),
            min_rating: filter.min_rating.map(|r| r.get()),
        }
    }
}

/// `(LIMIT, OFFSET)` binds; `NULL` means no limit and no offset.
fn window_binds(request: &FeedRequest) -> (Option<i64>, Option<i64>) {
    request.window.map_or((None, None), |window| {
        (
            Some(i64::from(window.limit())),
            Some(i64::try_from(window.offset()).unwrap_or(i64::MAX)),
        )
    })
}

async fn load_slice(
    conn: &mut AsyncPgConnection,
    today: NaiveDate,
    binds: FilterBinds,
    window: (Option<i64>, Option<i64>),
) -> Result<FeedSlice, diesel::result::Error> {
    let rows: Vec<FeedRow> = diesel::sql_query(PAGE_SQL)
        .bind::<Date, _>(today)
        .bind::<Nullable<Double>, _>(binds.latitude)
        .bind::<Nullable<Double>, _>(binds.longitude)
        .bind::<Nullable<Double>, _>(binds.radius_km)
        .bind::<Nullable<SmallInt>, _>(binds.price_range)
        .bind::<Nullable<Double>, _>(binds.min_rating)
        .bind::<Nullable<BigInt>, _>(window.0)
        .bind::<Nullable<BigInt>, _>(window.1)
        .load(conn)
        .await?;

    let count: CountRow = diesel::sql_query(COUNT_SQL)
        .bind::<Date, _>(today)
        .bind::<Nullable<Double>, _>(binds.latitude)
        .bind::<Nullable<Double>, _>(binds.longitude)
        .bind::<Nullable<Double>, _>(binds.radius_km)
        .bind::<Nullable<SmallInt>, _>(binds.price_range)
        .bind::<Nullable<Double>, _>(binds.min_rating)
        .get_result(conn)
        .await?;

    let items = rows
        .into_iter()
        .map(|row| FeedItem {
            position: row.position,
            restaurant: Restaurant::from(row.restaurant),
        })
        .collect();
    Ok(FeedSlice {
        items,
        total: u64::try_from(count.total).unwrap_or_default(),
    })
}

#[async_trait]
impl FeedRepository for DieselFeedRepository {
    async fn replace_daily_feed(&self, feed: &DailyFeed) -> Result<usize, FeedPersistenceError> {
        let rows: Vec<NewFeedRow> = feed
            .entries()
            .iter()
            .map(|entry| NewFeedRow {
                feed_date: feed.date(),
                position: entry.position,
                restaurant_id: entry.restaurant_id.get(),
            })
            .collect();

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction::<usize, diesel::result::Error, _>(|conn| {
            async move {
                let removed = diesel::delete(restaurants_daily_feed::table)
                    .execute(conn)
                    .await?;
                debug!(removed, "cleared previous feed");

                let mut written = 0;
                for chunk in rows.chunks(INSERT_CHUNK) {
                    written += diesel::insert_into(restaurants_daily_feed::table)
                        .values(chunk)
                        .on_conflict((
                            restaurants_daily_feed::feed_date,
                            restaurants_daily_feed::position,
                        ))
                        .do_update()
                        .set(
                            restaurants_daily_feed::restaurant_id
                                .eq(excluded(restaurants_daily_feed::restaurant_id)),
                        )
                        .execute(conn)
                        .await?;
                }
                Ok(written)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn page(
        &self,
        today: NaiveDate,
        request: &FeedRequest,
    ) -> Result<FeedSlice, FeedPersistenceError> {
        let binds = FilterBinds::from(&request.filter);
        let window = window_binds(request);

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.build_transaction()
            .read_only()
            .repeatable_read()
            .run::<FeedSlice, diesel::result::Error, _>(|conn| {
                async move { load_slice(conn, today, binds, window).await }.scope_boxed()
            })
            .await
            .map_err(map_diesel_error)
    }
}
