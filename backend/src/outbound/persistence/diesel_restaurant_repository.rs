//! PostgreSQL-backed `RestaurantRepository` implementation using Diesel ORM.
//!
//! Partial updates go through [`RestaurantChangesetRow`], which maps each
//! tagged change to a fixed column. Deleting a restaurant relies on the
//! `ON DELETE CASCADE` foreign keys to drop its feed slots and interactions.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RestaurantPersistenceError, RestaurantRepository};
use crate::domain::{NewRestaurant, Restaurant, RestaurantId, RestaurantUpdate};

use super::diesel_error_mapping::{DieselFailure, classify};
use super::models::{NewRestaurantRow, RestaurantChangesetRow, RestaurantRow};
use super::pool::{DbPool, PoolError};
use super::schema::restaurants;

/// Diesel-backed implementation of the `RestaurantRepository` port.
#[derive(Clone)]
pub struct DieselRestaurantRepository {
    pool: DbPool,
}

impl DieselRestaurantRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RestaurantPersistenceError {
    RestaurantPersistenceError::connection(error.into_message())
}

/// Translate a Diesel failure; `inserted` identifies the row being created so
/// constraint violations can name the offending value.
fn map_diesel_error(
    error: diesel::result::Error,
    inserted: Option<&NewRestaurant>,
) -> RestaurantPersistenceError {
    let external_id = inserted.and_then(|row| row.external_id.as_deref());
    let contributor = inserted.and_then(|row| row.contributor_id.as_ref());
    match classify(error) {
        DieselFailure::Connection(message) => RestaurantPersistenceError::connection(message),
        DieselFailure::UniqueViolation { .. } => {
            RestaurantPersistenceError::duplicate_external_id(external_id.unwrap_or("unknown"))
        }
        DieselFailure::ForeignKeyViolation { .. } => match contributor {
            Some(id) => RestaurantPersistenceError::contributor_not_found(id.to_string()),
            None => RestaurantPersistenceError::query("foreign key violation"),
        },
        DieselFailure::NotFound => RestaurantPersistenceError::query("record not found"),
        DieselFailure::Query(message) => RestaurantPersistenceError::query(message),
    }
}

#[async_trait]
impl RestaurantRepository for DieselRestaurantRepository {
    async fn create(
        &self,
        restaurant: &NewRestaurant,
    ) -> Result<Restaurant, RestaurantPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: RestaurantRow = diesel::insert_into(restaurants::table)
            .values(NewRestaurantRow::from(restaurant))
            .returning(RestaurantRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, Some(restaurant)))?;
        Ok(row.into())
    }

    async fn update(
        &self,
        id: RestaurantId,
        update: &RestaurantUpdate,
    ) -> Result<Option<Restaurant>, RestaurantPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = RestaurantChangesetRow::from_update(update, Utc::now());
        let row: Option<RestaurantRow> = diesel::update(restaurants::table.find(id.get()))
            .set(&changes)
            .returning(RestaurantRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, None))?;
        Ok(row.map(Restaurant::from))
    }

    async fn delete(&self, id: RestaurantId) -> Result<bool, RestaurantPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(restaurants::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, None))?;
        Ok(deleted > 0)
    }

    async fn list_ids(&self) -> Result<Vec<RestaurantId>, RestaurantPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ids: Vec<i32> = restaurants::table
            .select(restaurants::id)
            .order(restaurants::id.asc())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, None))?;
        Ok(ids.into_iter().map(RestaurantId::new).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_errors_map_to_connection() {
        let err = map_pool_error(PoolError::build("bad url"));
        assert_eq!(err, RestaurantPersistenceError::connection("bad url"));
    }

    #[rstest]
    fn other_errors_map_to_query() {
        let restaurant = NewRestaurant::new("Noodle Bar", "1 Main St", 51.5, -0.12).expect("valid");
        let err = map_diesel_error(diesel::result::Error::RollbackTransaction, Some(&restaurant));
        assert!(matches!(err, RestaurantPersistenceError::Query { .. }));
    }
}
