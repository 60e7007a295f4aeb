//! Builders wiring repositories, services, and jobs onto one pool.

use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;

use crate::domain::{
    AuthService, BackgroundJobs, CounterAggregationJob, FeedRotationJob, FeedService,
    InteractionService, PlacesService, RestaurantService,
};
use crate::inbound::http::state::{HttpPolicy, HttpState, HttpStatePorts};
use crate::outbound::auth::{Argon2PasswordHasher, JwtTokenService};
use crate::outbound::persistence::{
    DieselFeedRepository, DieselInteractionRepository, DieselRestaurantRepository,
    DieselUserRepository,
};
use crate::outbound::places::GooglePlacesHttpSource;

use super::ServerConfig;

const PLACES_TIMEOUT: Duration = Duration::from_secs(10);

/// Repository adapters sharing the server's pool.
pub(crate) struct Repositories {
    users: Arc<DieselUserRepository>,
    restaurants: Arc<DieselRestaurantRepository>,
    feeds: Arc<DieselFeedRepository>,
    interactions: Arc<DieselInteractionRepository>,
}

impl Repositories {
    pub(crate) fn new(config: &ServerConfig) -> Self {
        let pool = &config.db_pool;
        Self {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            restaurants: Arc::new(DieselRestaurantRepository::new(pool.clone())),
            feeds: Arc::new(DieselFeedRepository::new(pool.clone())),
            interactions: Arc::new(DieselInteractionRepository::new(pool.clone())),
        }
    }
}

/// Build the handler state from repositories and configured adapters.
///
/// # Errors
///
/// Fails when the signing secret is rejected or the HTTP client for the
/// places provider cannot be built.
pub(crate) fn build_http_state(
    config: &ServerConfig,
    repos: &Repositories,
    clock: Arc<dyn Clock>,
) -> std::io::Result<HttpState> {
    let tokens = JwtTokenService::new(&config.jwt_secret)
        .map_err(|err| std::io::Error::other(format!("jwt configuration rejected: {err}")))?;
    let auth = Arc::new(AuthService::new(
        Arc::clone(&repos.users),
        Arc::new(Argon2PasswordHasher::new()),
        Arc::new(tokens),
        Arc::clone(&clock),
    ));

    let places_source = GooglePlacesHttpSource::new(
        config.places_endpoint.clone(),
        config.places_api_key.clone(),
        PLACES_TIMEOUT,
    )
    .map_err(|err| std::io::Error::other(format!("places client setup failed: {err}")))?;

    let ports = HttpStatePorts {
        auth: auth.clone(),
        profile: auth,
        feed: Arc::new(FeedService::new(Arc::clone(&repos.feeds), clock)),
        interactions: Arc::new(InteractionService::new(Arc::clone(&repos.interactions))),
        restaurants: Arc::new(RestaurantService::new(Arc::clone(&repos.restaurants))),
        places: Arc::new(PlacesService::new(
            Arc::new(places_source),
            config.max_radius_km,
        )),
    };
    let policy = HttpPolicy {
        api_key: config.api_key.clone(),
        max_radius_km: config.max_radius_km,
    };
    Ok(HttpState::new(ports, policy))
}

/// Register the feed rotation and counter aggregation jobs.
pub(crate) fn build_background_jobs(
    config: &ServerConfig,
    repos: &Repositories,
    clock: Arc<dyn Clock>,
) -> BackgroundJobs {
    let rotation = FeedRotationJob::new(
        Arc::clone(&repos.restaurants),
        Arc::clone(&repos.feeds),
        Arc::clone(&clock),
        config.rotation,
    );
    let aggregation =
        CounterAggregationJob::new(Arc::clone(&repos.interactions), config.aggregation);
    BackgroundJobs::new(clock)
        .register(Arc::new(rotation))
        .register(Arc::new(aggregation))
}
