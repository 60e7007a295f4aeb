//! Shared helpers for backend integration tests.
//!
//! Each suite provisions a fresh database on an embedded PostgreSQL cluster,
//! applies the embedded migrations, and talks to it through the real Diesel
//! adapters.

pub mod pg_embed;

use chrono::Utc;
use eatwhatnow::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};
use tokio::runtime::Runtime;
use uuid::Uuid;

/// Render a `postgres` error with enough detail to be useful in CI logs.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}

/// Returns true when `REQUIRE_TEST_CLUSTER` is set to a truthy value.
pub fn test_cluster_required() -> bool {
    std::env::var("REQUIRE_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip when the cluster cannot start, unless `REQUIRE_TEST_CLUSTER` demands
/// one.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if test_cluster_required() {
        panic!("Test cluster setup failed: {reason}. Unset REQUIRE_TEST_CLUSTER to skip.");
    }
    eprintln!("SKIP-TEST-CLUSTER: {reason}");
    None
}

/// A migrated database on its own embedded cluster.
pub struct TestDatabase {
    pub pool: DbPool,
    pub runtime: Runtime,
    pub url: String,
    _cluster: TestCluster,
}

impl TestDatabase {
    /// Start a cluster, create a uniquely named database, and migrate it.
    pub fn provision() -> Result<Self, String> {
        let runtime = Runtime::new().map_err(|err| err.to_string())?;
        let cluster = pg_embed::test_cluster()?;
        let name = format!("ewn_test_{}", Uuid::new_v4().simple());

        let admin_url = cluster.connection().database_url("postgres");
        let mut admin =
            Client::connect(&admin_url, NoTls).map_err(|err| format_postgres_error(&err))?;
        admin
            .batch_execute(&format!("CREATE DATABASE \"{name}\""))
            .map_err(|err| format_postgres_error(&err))?;

        let url = cluster.connection().database_url(&name);
        run_pending_migrations(&url).map_err(|err| err.to_string())?;

        let config = PoolConfig::new(&url).with_max_size(4).with_min_idle(Some(1));
        let pool = runtime
            .block_on(DbPool::new(config))
            .map_err(|err| err.to_string())?;

        Ok(Self {
            pool,
            runtime,
            url,
            _cluster: cluster,
        })
    }

    /// Synchronous client for seeding and assertions.
    pub fn client(&self) -> Client {
        Client::connect(&self.url, NoTls).expect("connect to test database")
    }

    /// Insert a user row directly and return its id.
    pub fn seed_user(&self, username: &str) -> Uuid {
        let id = Uuid::new_v4();
        let email = format!("{username}@example.com");
        self.client()
            .execute(
                "INSERT INTO users (id, email, username, password_hash, full_name) \
                 VALUES ($1, $2, $3, 'not-a-hash', $3)",
                &[&id, &email, &username],
            )
            .expect("seed user");
        id
    }

    /// Insert a restaurant row directly and return its id.
    pub fn seed_restaurant(&self, name: &str, latitude: f64, longitude: f64) -> i32 {
        let row = self
            .client()
            .query_one(
                "INSERT INTO restaurants (name, address, latitude, longitude) \
                 VALUES ($1, '1 Test Street', $2, $3) RETURNING id",
                &[&name, &latitude, &longitude],
            )
            .expect("seed restaurant");
        row.get(0)
    }

    /// Count rows matching a scalar query.
    pub fn count(&self, sql: &str) -> i64 {
        self.client()
            .query_one(sql, &[])
            .expect("count query")
            .get(0)
    }
}

/// Today's UTC date, matching what the jobs and feed service use.
pub fn today() -> chrono::NaiveDate {
    Utc::now().date_naive()
}

/// Provision a database or skip the calling test.
pub fn provision_or_skip() -> Option<TestDatabase> {
    match TestDatabase::provision() {
        Ok(db) => Some(db),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}
