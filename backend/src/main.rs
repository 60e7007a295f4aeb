//! Backend entry-point: loads settings, prepares the database, and runs the
//! HTTP server alongside its background jobs.

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use eatwhatnow::inbound::http::health::HealthState;
use eatwhatnow::outbound::persistence::{DbPool, run_pending_migrations};
use eatwhatnow::server::{AppSettings, ServerConfig, ServerParts, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .wrap_err("failed to load settings")?;
    let pool_config = settings.pool_config()?;

    if settings.run_migrations {
        let url = pool_config.database_url().to_owned();
        let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&url))
            .await
            .wrap_err("migration task panicked")??;
        info!(applied, "database migrations applied");
    }

    let pool = DbPool::new(pool_config)
        .await
        .wrap_err("failed to build database pool")?;
    let config = ServerConfig::from_settings(&settings, pool)?;
    let bind_addr = config.bind_addr();

    let health_state = web::Data::new(HealthState::new());
    let ServerParts { server, jobs } = create_server(health_state.clone(), config)?;
    let jobs = jobs.start();
    info!(%bind_addr, "server listening");

    let served = server.await;
    health_state.mark_unhealthy();
    jobs.shutdown().await;
    info!("server stopped");
    served.wrap_err("server terminated with an error")
}
