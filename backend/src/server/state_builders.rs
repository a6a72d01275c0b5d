//! Builders wiring repositories into the HTTP state.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::info;

use clinic_backend::domain::ClinicClock;
use clinic_backend::inbound::http::state::{HttpState, StateRepositories};
use clinic_backend::outbound::memory::MemoryStore;
use clinic_backend::outbound::persistence::{
    DieselAppointmentRepository, DieselDoctorRepository, DieselProfileRepository,
    DieselScheduleRepository,
};
use clinic_backend::outbound::security::Pbkdf2PasswordHasher;

use super::config::{ServerConfig, Storage};

/// Build the handler state for the configured storage backend.
pub(crate) fn build_http_state(config: &ServerConfig) -> HttpState {
    let clock = ClinicClock::new(Arc::new(DefaultClock), config.utc_offset);
    let hasher = Arc::new(Pbkdf2PasswordHasher::new(config.password_iterations));

    match &config.storage {
        Storage::Postgres(pool) => {
            info!("using PostgreSQL repositories");
            HttpState::from_repositories(StateRepositories {
                profiles: Arc::new(DieselProfileRepository::new(pool.clone())),
                doctors: Arc::new(DieselDoctorRepository::new(pool.clone())),
                schedules: Arc::new(DieselScheduleRepository::new(pool.clone())),
                appointments: Arc::new(DieselAppointmentRepository::new(pool.clone())),
                hasher,
                clock,
            })
        }
        Storage::Memory => {
            info!("no database configured; data is kept in memory");
            let store = Arc::new(MemoryStore::new());
            HttpState::from_repositories(StateRepositories {
                profiles: store.clone(),
                doctors: store.clone(),
                schedules: store.clone(),
                appointments: store,
                hasher,
                clock,
            })
        }
    }
}
