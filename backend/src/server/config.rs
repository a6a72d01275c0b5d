//! Server settings loaded via OrthoConfig and the runtime configuration
//! assembled from them.

use std::net::{IpAddr, SocketAddr};

use chrono::FixedOffset;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use clinic_backend::inbound::http::session_config::SessionSettings;
use clinic_backend::outbound::persistence::DbPool;
use clinic_backend::outbound::security::DEFAULT_PBKDF2_ITERATIONS;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_POOL_SIZE: u32 = 10;
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Settings read from `CLINIC_*` environment variables, config files and
/// command-line flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CLINIC")]
pub struct ServerSettings {
    /// Interface to bind; defaults to all interfaces.
    pub host: Option<String>,
    /// TCP port; defaults to 8080.
    pub port: Option<u16>,
    /// PostgreSQL URL. Without it the server keeps data in memory.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Clinic timezone as minutes east of UTC; used for "now" when
    /// filtering past slots and rejecting past bookings.
    pub utc_offset_minutes: Option<i32>,
    /// PBKDF2 work factor for new password digests.
    pub password_iterations: Option<u32>,
    /// Apply embedded migrations before serving; defaults to true.
    pub run_migrations: Option<bool>,
}

/// Invalid server settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind host {host}")]
    InvalidHost { host: String },
    #[error("UTC offset must be within ±{MAX_UTC_OFFSET_MINUTES} minutes (got {minutes})")]
    InvalidUtcOffset { minutes: i32 },
}

impl ServerSettings {
    /// Socket address to bind.
    ///
    /// # Errors
    /// Returns [`SettingsError::InvalidHost`] when the host is not an IP
    /// address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let host = self.host.as_deref().unwrap_or(DEFAULT_HOST);
        let ip: IpAddr = host.parse().map_err(|_| SettingsError::InvalidHost {
            host: host.to_owned(),
        })?;
        Ok(SocketAddr::new(ip, self.port.unwrap_or(DEFAULT_PORT)))
    }

    /// Clinic timezone offset.
    ///
    /// # Errors
    /// Returns [`SettingsError::InvalidUtcOffset`] outside ±14 hours.
    pub fn utc_offset(&self) -> Result<FixedOffset, SettingsError> {
        let minutes = self.utc_offset_minutes.unwrap_or(0);
        if minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(SettingsError::InvalidUtcOffset { minutes });
        }
        FixedOffset::east_opt(minutes * 60).ok_or(SettingsError::InvalidUtcOffset { minutes })
    }

    /// Connection pool ceiling; defaults to 10.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_SIZE)
    }

    /// PBKDF2 work factor for new digests.
    pub fn password_iterations(&self) -> u32 {
        self.password_iterations
            .unwrap_or(DEFAULT_PBKDF2_ITERATIONS)
    }

    /// Whether embedded migrations run at startup.
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }
}

/// Where repositories keep their data.
pub enum Storage {
    Memory,
    Postgres(DbPool),
}

/// Everything `create_server` needs, already validated.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) storage: Storage,
    pub(crate) utc_offset: FixedOffset,
    pub(crate) password_iterations: u32,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// In-memory configuration; attach a pool with [`Self::with_db_pool`].
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr, utc_offset: FixedOffset) -> Self {
        Self {
            session,
            bind_addr,
            storage: Storage::Memory,
            utc_offset,
            password_iterations: DEFAULT_PBKDF2_ITERATIONS,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Persist through PostgreSQL instead of memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.storage = Storage::Postgres(pool);
        self
    }

    #[must_use]
    pub fn with_password_iterations(mut self, iterations: u32) -> Self {
        self.password_iterations = iterations;
        self
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
