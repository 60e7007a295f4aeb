//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of domain repository ports
//! backed by PostgreSQL via the Diesel ORM with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: Diesel failures are classified once in
//!   `diesel_error_mapping` and mapped onto each port's error type.
//!
//! # Example
//!
//! ```ignore
//! use eatwhatnow::outbound::persistence::{DbPool, DieselFeedRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/eatwhatnow")).await?;
//! let feeds = DieselFeedRepository::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_feed_repository;
mod diesel_interaction_repository;
mod diesel_restaurant_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_feed_repository::DieselFeedRepository;
pub use diesel_interaction_repository::DieselInteractionRepository;
pub use diesel_restaurant_repository::DieselRestaurantRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
