//! Request authentication extractors.
//!
//! Keep the HTTP modules focused on request/response mapping by concentrating
//! credential checks and user identity derivation here.
//!
//! - [`AuthenticatedUser`] resolves `Authorization: Bearer <jwt>` through
//!   [`crate::domain::ports::AuthCommand::authenticate`].
//! - [`ApiKey`] guards administrative routes with the `x-api-key` header.

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use sha2::{Digest, Sha256};

use crate::domain::{Error, UserId};
use crate::inbound::http::state::HttpState;

/// Header carrying the administrative API key.
pub const API_KEY_HEADER: &str = "x-api-key";

const BEARER_PREFIX: &str = "Bearer ";

fn state_from(req: &HttpRequest) -> Result<web::Data<HttpState>, Error> {
    req.app_data::<web::Data<HttpState>>()
        .cloned()
        .ok_or_else(|| Error::internal("http state is not configured"))
}

fn bearer_token(headers: &HeaderMap) -> Result<String, Error> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    let raw = value
        .to_str()
        .map_err(|_| Error::unauthorized("invalid authorization header"))?;
    raw.strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))
}

/// Identity of the caller, resolved from a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(UserId);

impl AuthenticatedUser {
    /// Authenticated user id.
    pub fn user_id(&self) -> &UserId {
        &self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = state_from(req);
        let token = bearer_token(req.headers());
        Box::pin(async move {
            let state = state?;
            let token = token?;
            let user_id = state.auth.authenticate(&token).await?;
            Ok(Self(user_id))
        })
    }
}

/// SHA-256 digest of the configured API key.
///
/// Comparing fixed-length digests keeps the check independent of where the
/// supplied key first differs.
#[derive(Clone, Default)]
pub struct ApiKeyDigest(Option<[u8; 32]>);

impl ApiKeyDigest {
    /// Digest `key`; blank or absent keys disable the administrative routes.
    pub fn from_configured(key: Option<&str>) -> Self {
        Self(
            key.map(str::trim)
                .filter(|key| !key.is_empty())
                .map(digest),
        )
    }

    fn verify(&self, supplied: &str) -> Result<(), Error> {
        match self.0 {
            None => Err(Error::forbidden("api key authentication is not configured")),
            Some(expected) if expected == digest(supplied) => Ok(()),
            Some(_) => Err(Error::forbidden("invalid api key")),
        }
    }
}

impl std::fmt::Debug for ApiKeyDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiKeyDigest")
            .field(&self.0.map(|_| "<redacted>"))
            .finish()
    }
}

fn digest(key: &str) -> [u8; 32] {
    Sha256::digest(key.as_bytes()).into()
}

/// Proof that the request carried the configured `x-api-key`.
#[derive(Debug, Clone, Copy)]
pub struct ApiKey;

impl FromRequest for ApiKey {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(check_api_key(req).map_err(Into::into))
    }
}

fn check_api_key(req: &HttpRequest) -> Result<ApiKey, Error> {
    let state = state_from(req)?;
    let supplied = req
        .headers()
        .get(API_KEY_HEADER)
        .ok_or_else(|| Error::unauthorized("missing api key"))?
        .to_str()
        .map_err(|_| Error::forbidden("invalid api key"))?;
    state.api_key.verify(supplied)?;
    Ok(ApiKey)
}
