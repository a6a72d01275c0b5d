//! Backend entry-point: loads settings, connects storage and serves the
//! booking API.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use clinic_backend::inbound::http::health::HealthState;
use clinic_backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use clinic_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

#[cfg(feature = "metrics")]
use server::build_metrics;
use server::{ServerConfig, ServerSettings, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load()
        .map_err(|err| std::io::Error::other(format!("load settings: {err}")))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let utc_offset = settings.utc_offset().map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(session, bind_addr, utc_offset)
        .with_password_iterations(settings.password_iterations());

    if let Some(database_url) = settings.database_url.as_deref() {
        if settings.run_migrations() {
            run_pending_migrations(database_url)
                .await
                .map_err(std::io::Error::other)?;
        }
        let pool = DbPool::new(
            PoolConfig::new(database_url).with_max_size(settings.pool_max_size()),
        )
        .await
        .map_err(std::io::Error::other)?;
        config = config.with_db_pool(pool);
    }

    #[cfg(feature = "metrics")]
    {
        config = config.with_metrics(Some(build_metrics()?));
    }

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting clinic backend");
    create_server(health_state, config)?.await
}
