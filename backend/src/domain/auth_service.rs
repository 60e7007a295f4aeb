//! Authentication and profile services.
//!
//! Implements [`AuthCommand`] and [`UserProfileQuery`] on top of the user
//! repository, a password hasher, and a token signer. Unknown emails and
//! wrong passwords produce the same `unauthorized` error so callers cannot
//! probe which addresses are registered.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    AuthCommand, PasswordHashError, PasswordHasher, TokenError, TokenService,
    UserPersistenceError, UserProfileQuery, UserRepository,
};
use crate::domain::{
    AuthSession, Email, Error, LoginCredentials, Registration, UserAccount, UserId, UserProfile,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Authentication service implementing the auth driving ports.
#[derive(Clone)]
pub struct AuthService<U, H, T> {
    users: Arc<U>,
    hasher: Arc<H>,
    tokens: Arc<T>,
    clock: Arc<dyn Clock>,
}

impl<U, H, T> AuthService<U, H, T> {
    /// Create a new service.
    pub fn new(users: Arc<U>, hasher: Arc<H>, tokens: Arc<T>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
        }
    }
}

impl<U, H, T> AuthService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher,
    T: TokenService,
{
    fn map_user_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::DuplicateEmail => Error::conflict("email is already registered")
                .with_details(json!({ "field": "email", "code": "duplicate" })),
            UserPersistenceError::DuplicateUsername => Error::conflict("username is already taken")
                .with_details(json!({ "field": "username", "code": "duplicate" })),
        }
    }

    fn map_hash_error(error: PasswordHashError) -> Error {
        Error::internal(error.to_string())
    }

    fn map_token_error(error: TokenError) -> Error {
        match error {
            TokenError::Expired => Error::unauthorized("token has expired"),
            TokenError::Invalid { .. } => Error::unauthorized("invalid token"),
            TokenError::Signing { message } => {
                Error::internal(format!("token signing failed: {message}"))
            }
        }
    }

    fn issue_session(&self, profile: UserProfile) -> Result<AuthSession, Error> {
        let token = self
            .tokens
            .issue(&profile.id, self.clock.utc())
            .map_err(Self::map_token_error)?;
        Ok(AuthSession { profile, token })
    }

    fn ensure_active(account: &UserAccount) -> Result<(), Error> {
        if account.profile.is_active {
            Ok(())
        } else {
            Err(Error::forbidden("account is disabled"))
        }
    }
}

#[async_trait]
impl<U, H, T> AuthCommand for AuthService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher,
    T: TokenService,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthSession, Error> {
        let Ok(email) = Email::new(credentials.email()) else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let found = self
            .users
            .find_by_email(&email)
            .await
            .map_err(Self::map_user_error)?;
        let Some(account) = found else {
            self.hasher.verify_unknown(credentials.password()).await;
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let matches = self
            .hasher
            .verify(credentials.password(), &account.password_hash)
            .await
            .map_err(Self::map_hash_error)?;
        if !matches {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        Self::ensure_active(&account)?;

        self.issue_session(account.profile)
    }

    async fn register(&self, registration: &Registration) -> Result<AuthSession, Error> {
        let password_hash = self
            .hasher
            .hash(registration.password())
            .await
            .map_err(Self::map_hash_error)?;
        let account = UserAccount {
            profile: UserProfile {
                id: UserId::random(),
                email: registration.email().as_ref().to_owned(),
                username: registration.username().as_ref().to_owned(),
                full_name: registration.full_name().to_owned(),
                avatar_url: None,
                is_active: true,
                is_verified: false,
                created_at: self.clock.utc(),
            },
            password_hash,
        };

        self.users
            .create(&account)
            .await
            .map_err(Self::map_user_error)?;
        info!(user_id = %account.profile.id, "user registered");

        self.issue_session(account.profile)
    }

    async fn authenticate(&self, token: &str) -> Result<UserId, Error> {
        let user_id = self.tokens.verify(token).map_err(Self::map_token_error)?;
        let account = self
            .users
            .find_by_id(&user_id)
            .await
            .map_err(Self::map_user_error)?
            .ok_or_else(|| Error::unauthorized("unknown user"))?;
        Self::ensure_active(&account)?;
        Ok(user_id)
    }
}

#[async_trait]
impl<U, H, T> UserProfileQuery for AuthService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher,
    T: TokenService,
{
    async fn fetch_profile(&self, user_id: &UserId) -> Result<UserProfile, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(Self::map_user_error)?
            .map(|account| account.profile)
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
