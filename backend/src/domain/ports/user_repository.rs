//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{Email, UserAccount, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the email address.
        DuplicateEmail => "email address is already registered",
        /// Another account already uses the username.
        DuplicateUsername => "username is already taken",
    }
}

/// Storage for user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account.
    ///
    /// Fails with [`UserPersistenceError::DuplicateEmail`] or
    /// [`UserPersistenceError::DuplicateUsername`] when a unique constraint
    /// rejects the row.
    async fn create(&self, account: &UserAccount) -> Result<(), UserPersistenceError>;

    /// Fetch an account by its lower-cased email.
    async fn find_by_email(&self, email: &Email)
    -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserPersistenceError>;
}
