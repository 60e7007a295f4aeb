//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use zeroize::Zeroizing;

use crate::domain::DEFAULT_MAX_RADIUS_KM;
use crate::domain::ports::{
    AuthCommand, FeedQuery, InteractionCommand, PlacesQuery, RestaurantCommand, UserProfileQuery,
};
use crate::inbound::http::auth::ApiKeyDigest;

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub auth: Arc<dyn AuthCommand>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub feed: Arc<dyn FeedQuery>,
    pub interactions: Arc<dyn InteractionCommand>,
    pub restaurants: Arc<dyn RestaurantCommand>,
    pub places: Arc<dyn PlacesQuery>,
}

/// Request policy knobs that handlers consult directly.
#[derive(Clone)]
pub struct HttpPolicy {
    /// Key expected in `x-api-key` on administrative routes.
    pub api_key: Option<Zeroizing<String>>,
    /// Upper bound for feed search radii, in kilometres.
    pub max_radius_km: f64,
}

impl Default for HttpPolicy {
    fn default() -> Self {
        Self {
            api_key: None,
            max_radius_km: DEFAULT_MAX_RADIUS_KM,
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<dyn AuthCommand>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub feed: Arc<dyn FeedQuery>,
    pub interactions: Arc<dyn InteractionCommand>,
    pub restaurants: Arc<dyn RestaurantCommand>,
    pub places: Arc<dyn PlacesQuery>,
    pub api_key: ApiKeyDigest,
    pub max_radius_km: f64,
}

impl HttpState {
    /// Construct state from the ports bundle and request policy.
    ///
    /// The API key is digested once here; the plaintext is dropped with the
    /// policy.
    pub fn new(ports: HttpStatePorts, policy: HttpPolicy) -> Self {
        let HttpStatePorts {
            auth,
            profile,
            feed,
            interactions,
            restaurants,
            places,
        } = ports;
        let HttpPolicy {
            api_key,
            max_radius_km,
        } = policy;
        Self {
            auth,
            profile,
            feed,
            interactions,
            restaurants,
            places,
            api_key: ApiKeyDigest::from_configured(api_key.as_deref().map(String::as_str)),
            max_radius_km,
        }
    }
}
