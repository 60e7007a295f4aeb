//! Argon2id adapter for the `PasswordHasher` port.
//!
//! Every hash and verification runs on tokio's blocking pool so the actix
//! worker that accepted the request keeps serving others.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher as _, PasswordVerifier as _};
use async_trait::async_trait;
use tracing::warn;
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Well-formed Argon2id hash with default parameters that no password
/// produces. Unknown-account logins are verified against it.
const UNKNOWN_ACCOUNT_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHRzYWx0$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Hashes passwords with Argon2id default parameters and a random salt,
/// storing the PHC string.
#[derive(Clone, Default)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Create a hasher with default parameters.
    pub fn new() -> Self {
        Self::default()
    }
}

fn hash_blocking(argon2: &Argon2<'_>, password: &str) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordHashError::hash(err.to_string()))
}

fn verify_blocking(
    argon2: &Argon2<'_>,
    password: &str,
    hash: &str,
) -> Result<bool, PasswordHashError> {
    let parsed =
        PasswordHash::new(hash).map_err(|err| PasswordHashError::malformed_hash(err.to_string()))?;
    match argon2.verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => Err(PasswordHashError::hash(err.to_string())),
    }
}

async fn off_worker<T, F>(work: F) -> Result<T, PasswordHashError>
where
    F: FnOnce() -> Result<T, PasswordHashError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| PasswordHashError::hash(format!("hashing task failed: {err}")))?
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let argon2 = self.argon2.clone();
        let password = Zeroizing::new(password.to_owned());
        off_worker(move || hash_blocking(&argon2, &password)).await
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        let argon2 = self.argon2.clone();
        let password = Zeroizing::new(password.to_owned());
        let hash = hash.to_owned();
        off_worker(move || verify_blocking(&argon2, &password, &hash)).await
    }

    async fn verify_unknown(&self, password: &str) {
        if let Err(error) = self.verify(password, UNKNOWN_ACCOUNT_HASH).await {
            warn!(%error, "unknown-account verification failed");
        }
    }
}
