//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod appointment_command;
mod appointment_query;
mod appointment_repository;
mod doctor_command;
mod doctor_query;
mod doctor_repository;
mod password_hasher;
mod profile_command;
mod profile_query;
mod profile_repository;
mod schedule_command;
mod schedule_query;
mod schedule_repository;
mod slot_query;

pub use account_command::AccountCommand;
pub use appointment_command::{AppointmentCommand, BookingRequest};
pub use appointment_query::AppointmentQuery;
#[cfg(test)]
pub use appointment_repository::MockAppointmentRepository;
pub use appointment_repository::{
    AppointmentRepository, AppointmentRepositoryError, AppointmentScope,
};
pub use doctor_command::{DoctorCommand, NewDoctor};
pub use doctor_query::DoctorQuery;
#[cfg(test)]
pub use doctor_repository::MockDoctorRepository;
pub use doctor_repository::{DoctorRepository, DoctorRepositoryError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
pub use profile_command::ProfileCommand;
pub use profile_query::ProfileQuery;
#[cfg(test)]
pub use profile_repository::MockProfileRepository;
pub use profile_repository::{ProfileRepository, ProfileRepositoryError, StoredCredential};
pub use schedule_command::{NewScheduleEntry, ScheduleCommand};
pub use schedule_query::ScheduleQuery;
#[cfg(test)]
pub use schedule_repository::MockScheduleRepository;
pub use schedule_repository::{ScheduleRepository, ScheduleRepositoryError};
#[cfg(test)]
pub use slot_query::MockSlotQuery;
pub use slot_query::SlotQuery;
