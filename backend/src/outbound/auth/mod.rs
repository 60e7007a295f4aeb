//! Credential adapters: Argon2 password hashing and HS256 bearer tokens.

mod argon2_hasher;
mod jwt;

pub use argon2_hasher::Argon2PasswordHasher;
pub use jwt::{JWT_SECRET_MIN_BYTES, JwtConfigError, JwtTokenService, TOKEN_LIFETIME_DAYS};
