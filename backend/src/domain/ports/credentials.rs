//! Driven ports for password hashing and bearer token signing.
//!
//! Password hashing is async: key stretching takes tens of milliseconds of
//! CPU, and adapters move it off the request worker. HMAC token signing is
//! cheap and stays synchronous.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{AccessToken, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHashError {
        /// Hashing failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// The stored hash could not be parsed.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

define_port_error! {
    /// Errors raised by token adapters.
    pub enum TokenError {
        /// The token could not be signed.
        Signing { message: String } => "token signing failed: {message}",
        /// The token was malformed, tampered with, or used the wrong key.
        Invalid { message: String } => "token is invalid: {message}",
        /// The token is past its expiry.
        Expired => "token has expired",
    }
}

/// One-way password hashing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` with a fresh salt.
    async fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Check `password` against a stored hash.
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError>;

    /// Spend the same work as [`PasswordHasher::verify`] when no account
    /// matched, so response time does not reveal which emails exist.
    async fn verify_unknown(&self, password: &str);
}

/// Issue and verify bearer tokens.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Sign a token for `user_id` issued at `issued_at`.
    fn issue(&self, user_id: &UserId, issued_at: DateTime<Utc>) -> Result<AccessToken, TokenError>;

    /// Validate `token` and return its subject.
    fn verify(&self, token: &str) -> Result<UserId, TokenError>;
}
