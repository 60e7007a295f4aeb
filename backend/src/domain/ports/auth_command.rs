//! Driving ports for authentication and the current user's profile.
//!
//! Inbound adapters call these to sign users in, register accounts, and
//! resolve bearer tokens without importing persistence or crypto adapters.

use async_trait::async_trait;

use crate::domain::{AuthSession, Error, LoginCredentials, Registration, UserId, UserProfile};

/// Domain use-case port for sign-in and sign-up.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthCommand: Send + Sync {
    /// Verify credentials and issue a token.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthSession, Error>;

    /// Create an account and issue a token.
    async fn register(&self, registration: &Registration) -> Result<AuthSession, Error>;

    /// Resolve a bearer token to an active user.
    async fn authenticate(&self, token: &str) -> Result<UserId, Error>;
}

/// Domain use-case port for reading the current user's profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Return the profile for the authenticated user.
    async fn fetch_profile(&self, user_id: &UserId) -> Result<UserProfile, Error>;
}
