//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **auth**: Argon2 password hashing and JWT signing
//! - **places**: Google Places Text Search over HTTP
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod auth;
pub mod persistence;
pub mod places;
