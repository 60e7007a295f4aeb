//! Application settings loaded via OrthoConfig and the resolved server
//! configuration built from them.

use std::fmt;
use std::net::SocketAddr;

use chrono::NaiveTime;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::domain::{DEFAULT_MAX_RADIUS_KM, Schedule, ScheduleError};
use crate::outbound::auth::JWT_SECRET_MIN_BYTES;
use crate::outbound::persistence::{DbPool, PoolConfig};
use crate::outbound::places::DEFAULT_PLACES_ENDPOINT;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_ROTATION_TIME: &str = "00:00";

/// Raw settings from CLI flags, `EWN_*` environment variables, and config
/// files.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "EWN")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// HS256 signing secret for bearer tokens.
    pub jwt_secret: Option<String>,
    /// Shared key for restaurant administration.
    pub api_key: Option<String>,
    /// Google Places API key. Search answers 503 without it.
    pub google_places_api_key: Option<String>,
    /// Override for the Text Search endpoint.
    pub google_places_endpoint: Option<String>,
    /// Upper bound for feed and places search radii.
    pub max_radius_km: Option<f64>,
    /// UTC time of day for feed rotation, as `HH:MM`.
    pub feed_rotation_time: Option<String>,
    /// Minute past each hour for counter aggregation.
    pub aggregation_minute: Option<u32>,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = false)]
    pub run_migrations: bool,
    /// Pool size.
    pub db_max_connections: Option<u32>,
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redacted(value: &Option<String>) -> Option<&'static str> {
            value.as_ref().map(|_| "<redacted>")
        }

        f.debug_struct("AppSettings")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &redacted(&self.database_url))
            .field("jwt_secret", &redacted(&self.jwt_secret))
            .field("api_key", &redacted(&self.api_key))
            .field(
                "google_places_api_key",
                &redacted(&self.google_places_api_key),
            )
            .field("google_places_endpoint", &self.google_places_endpoint)
            .field("max_radius_km", &self.max_radius_km)
            .field("feed_rotation_time", &self.feed_rotation_time)
            .field("aggregation_minute", &self.aggregation_minute)
            .field("run_migrations", &self.run_migrations)
            .field("db_max_connections", &self.db_max_connections)
            .finish()
    }
}

/// Settings that cannot be turned into a running server.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("bind_addr `{0}` is not a socket address")]
    BindAddr(String),
    #[error("jwt_secret must be at least {JWT_SECRET_MIN_BYTES} bytes")]
    JwtSecretTooShort,
    #[error("google_places_endpoint `{0}` is not a valid URL")]
    PlacesEndpoint(String),
    #[error("max_radius_km must be a positive number, got {0}")]
    MaxRadius(f64),
    #[error("feed_rotation_time `{0}` must look like HH:MM")]
    RotationTime(String),
    #[error("aggregation_minute is invalid: {0}")]
    AggregationMinute(ScheduleError),
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|raw| raw.trim()).filter(|raw| !raw.is_empty())
}

fn secret(value: Option<&String>) -> Option<Zeroizing<String>> {
    non_blank(value).map(|raw| Zeroizing::new(raw.to_owned()))
}

impl AppSettings {
    /// Listen address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = non_blank(self.bind_addr.as_ref()).unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse()
            .map_err(|_| ConfigError::BindAddr(raw.to_owned()))
    }

    /// Pool configuration for the required database URL.
    pub fn pool_config(&self) -> Result<PoolConfig, ConfigError> {
        let url = non_blank(self.database_url.as_ref()).ok_or(ConfigError::Missing("database_url"))?;
        let config = PoolConfig::new(url);
        Ok(match self.db_max_connections {
            Some(max) => config.with_max_size(max),
            None => config,
        })
    }

    /// Signing secret; at least [`JWT_SECRET_MIN_BYTES`] long.
    pub fn jwt_secret(&self) -> Result<Zeroizing<String>, ConfigError> {
        let secret = secret(self.jwt_secret.as_ref()).ok_or(ConfigError::Missing("jwt_secret"))?;
        if secret.len() < JWT_SECRET_MIN_BYTES {
            return Err(ConfigError::JwtSecretTooShort);
        }
        Ok(secret)
    }

    /// Administration key; blank counts as unset.
    pub fn api_key(&self) -> Option<Zeroizing<String>> {
        secret(self.api_key.as_ref())
    }

    /// Places provider key; blank counts as unset.
    pub fn google_places_api_key(&self) -> Option<Zeroizing<String>> {
        secret(self.google_places_api_key.as_ref())
    }

    /// Text Search endpoint, defaulting to Google's public URL.
    pub fn google_places_endpoint(&self) -> Result<Url, ConfigError> {
        let raw = non_blank(self.google_places_endpoint.as_ref()).unwrap_or(DEFAULT_PLACES_ENDPOINT);
        Url::parse(raw).map_err(|_| ConfigError::PlacesEndpoint(raw.to_owned()))
    }

    /// Maximum search radius in kilometres.
    pub fn max_radius_km(&self) -> Result<f64, ConfigError> {
        let radius = self.max_radius_km.unwrap_or(DEFAULT_MAX_RADIUS_KM);
        if radius.is_finite() && radius > 0.0 {
            Ok(radius)
        } else {
            Err(ConfigError::MaxRadius(radius))
        }
    }

    /// Daily trigger for the feed rotation job.
    pub fn rotation_schedule(&self) -> Result<Schedule, ConfigError> {
        let raw = non_blank(self.feed_rotation_time.as_ref()).unwrap_or(DEFAULT_ROTATION_TIME);
        NaiveTime::parse_from_str(raw, "%H:%M")
            .map(Schedule::daily_at)
            .map_err(|_| ConfigError::RotationTime(raw.to_owned()))
    }

    /// Hourly trigger for the counter aggregation job.
    pub fn aggregation_schedule(&self) -> Result<Schedule, ConfigError> {
        Schedule::hourly_at(self.aggregation_minute.unwrap_or(0))
            .map_err(ConfigError::AggregationMinute)
    }
}

/// Fully resolved configuration for [`super::create_server`].
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) jwt_secret: Zeroizing<String>,
    pub(crate) api_key: Option<Zeroizing<String>>,
    pub(crate) places_api_key: Option<Zeroizing<String>>,
    pub(crate) places_endpoint: Url,
    pub(crate) max_radius_km: f64,
    pub(crate) rotation: Schedule,
    pub(crate) aggregation: Schedule,
}

impl ServerConfig {
    /// Validate `settings` and attach the connection pool.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn from_settings(settings: &AppSettings, db_pool: DbPool) -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: settings.bind_addr()?,
            db_pool,
            jwt_secret: settings.jwt_secret()?,
            api_key: settings.api_key(),
            places_api_key: settings.google_places_api_key(),
            places_endpoint: settings.google_places_endpoint()?,
            max_radius_km: settings.max_radius_km()?,
            rotation: settings.rotation_schedule()?,
            aggregation: settings.aggregation_schedule()?,
        })
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
