//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the repository ports backed by PostgreSQL via
//! `diesel-async` and `bb8` connection pooling.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Rules that need atomicity (unique email, one doctor per
//!   profile, one active booking per slot) live in database indexes.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Typed errors**: database failures map onto each port's error enum.
//!
//! # Example
//!
//! ```no_run
//! use clinic_backend::outbound::persistence::{DbPool, DieselProfileRepository, PoolConfig};
//!
//! # async fn connect() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/clinic")).await?;
//! let profiles = DieselProfileRepository::new(pool);
//! # let _ = profiles;
//! # Ok(())
//! # }
//! ```

mod diesel_appointment_repository;
mod diesel_basic_error_mapping;
mod diesel_doctor_repository;
mod diesel_profile_repository;
mod diesel_schedule_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_appointment_repository::DieselAppointmentRepository;
pub use diesel_doctor_repository::DieselDoctorRepository;
pub use diesel_profile_repository::DieselProfileRepository;
pub use diesel_schedule_repository::DieselScheduleRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
