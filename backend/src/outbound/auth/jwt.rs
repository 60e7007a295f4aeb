//! HS256 JSON Web Token adapter for the `TokenService` port.
//!
//! Tokens carry `{sub, iat, exp}` where `sub` is the user UUID and `exp` sits
//! one year after `iat`. The signing secret stays zeroised in memory.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::ports::{TokenError, TokenService};
use crate::domain::{AccessToken, UserId};

/// Shortest secret accepted for HMAC signing.
pub const JWT_SECRET_MIN_BYTES: usize = 32;

/// Validity window of issued tokens, in days.
pub const TOKEN_LIFETIME_DAYS: i64 = 365;

fn token_lifetime() -> TimeDelta {
    TimeDelta::days(TOKEN_LIFETIME_DAYS)
}

/// Errors raised while configuring the signer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JwtConfigError {
    /// The secret is shorter than [`JWT_SECRET_MIN_BYTES`].
    #[error("jwt secret must be at least {min} bytes")]
    SecretTooShort {
        /// Required length.
        min: usize,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies bearer tokens with a shared HMAC secret.
pub struct JwtTokenService {
    secret: Zeroizing<Vec<u8>>,
    validation: Validation,
}

impl JwtTokenService {
    /// Build a signer from `secret`.
    ///
    /// # Errors
    ///
    /// Returns [`JwtConfigError::SecretTooShort`] for secrets under
    /// [`JWT_SECRET_MIN_BYTES`].
    pub fn new(secret: &Zeroizing<String>) -> Result<Self, JwtConfigError> {
        if secret.len() < JWT_SECRET_MIN_BYTES {
            return Err(JwtConfigError::SecretTooShort {
                min: JWT_SECRET_MIN_BYTES,
            });
        }
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        Ok(Self {
            secret: Zeroizing::new(secret.as_bytes().to_vec()),
            validation,
        })
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user_id: &UserId, issued_at: DateTime<Utc>) -> Result<AccessToken, TokenError> {
        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + token_lifetime()).timestamp(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map(AccessToken::new)
        .map_err(|err| TokenError::signing(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &self.validation,
        )
        .map_err(|err| match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::expired(),
            _ => TokenError::invalid(err.to_string()),
        })?;
        UserId::new(&data.claims.sub).map_err(|err| TokenError::invalid(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    //! Round trips against the real signer; expiry uses a backdated issue time.
    use super::*;
    use rstest::{fixture, rstest};

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[fixture]
    fn service() -> JwtTokenService {
        JwtTokenService::new(&Zeroizing::new(SECRET.to_owned())).expect("valid secret")
    }

    #[rstest]
    fn issued_token_verifies_to_subject(service: JwtTokenService) {
        let user = UserId::random();
        let token = service.issue(&user, Utc::now()).expect("sign");
        assert_eq!(service.verify(token.as_str()).expect("verify"), user);
    }

    #[rstest]
    fn tokens_expire_after_a_year(service: JwtTokenService) {
        let issued = Utc::now() - token_lifetime() - TimeDelta::days(1);
        let token = service.issue(&UserId::random(), issued).expect("sign");
        assert_eq!(service.verify(token.as_str()), Err(TokenError::expired()));
    }

    #[rstest]
    fn tokens_from_another_secret_are_invalid(service: JwtTokenService) {
        let other = JwtTokenService::new(&Zeroizing::new("f".repeat(JWT_SECRET_MIN_BYTES)))
            .expect("valid secret");
        let token = other.issue(&UserId::random(), Utc::now()).expect("sign");
        assert!(matches!(
            service.verify(token.as_str()),
            Err(TokenError::Invalid { .. })
        ));
    }

    #[rstest]
    #[case("")]
    #[case("not-a-jwt")]
    fn garbage_is_invalid(service: JwtTokenService, #[case] token: &str) {
        assert!(matches!(
            service.verify(token),
            Err(TokenError::Invalid { .. })
        ));
    }

    #[rstest]
    fn short_secrets_are_rejected() {
        let err = JwtTokenService::new(&Zeroizing::new("short".to_owned()))
            .err()
            .expect("too short");
        assert_eq!(
            err,
            JwtConfigError::SecretTooShort {
                min: JWT_SECRET_MIN_BYTES
            }
        );
    }
}
