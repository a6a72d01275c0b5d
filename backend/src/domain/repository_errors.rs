//! Translation from driven-port errors into domain [`Error`]s.
//!
//! Connection failures become `service_unavailable`, query failures become
//! `internal_error`, and uniqueness violations become `conflict`.

use crate::domain::Error;
use crate::domain::ports::{
    AppointmentRepositoryError, DoctorRepositoryError, PasswordHashError, ProfileRepositoryError,
    ScheduleRepositoryError,
};

pub(crate) fn map_profile_error(error: ProfileRepositoryError) -> Error {
    match error {
        ProfileRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("profile repository unavailable: {message}"))
        }
        ProfileRepositoryError::Query { message } => {
            Error::internal(format!("profile repository error: {message}"))
        }
        ProfileRepositoryError::DuplicateEmail { .. } => {
            Error::conflict("email is already registered")
        }
    }
}

pub(crate) fn map_doctor_error(error: DoctorRepositoryError) -> Error {
    match error {
        DoctorRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("doctor repository unavailable: {message}"))
        }
        DoctorRepositoryError::Query { message } => {
            Error::internal(format!("doctor repository error: {message}"))
        }
        DoctorRepositoryError::DuplicateProfile { .. } => {
            Error::conflict("profile already has a doctor record")
        }
    }
}

pub(crate) fn map_schedule_error(error: ScheduleRepositoryError) -> Error {
    match error {
        ScheduleRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("schedule repository unavailable: {message}"))
        }
        ScheduleRepositoryError::Query { message } => {
            Error::internal(format!("schedule repository error: {message}"))
        }
        ScheduleRepositoryError::DuplicateEntry { .. } => {
            Error::conflict("a schedule entry already starts at this day and time")
        }
    }
}

pub(crate) fn map_appointment_error(error: AppointmentRepositoryError) -> Error {
    match error {
        AppointmentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("appointment repository unavailable: {message}"))
        }
        AppointmentRepositoryError::Query { message } => {
            Error::internal(format!("appointment repository error: {message}"))
        }
        AppointmentRepositoryError::SlotTaken { .. } => {
            Error::conflict("failed to book appointment")
        }
        AppointmentRepositoryError::StatusChanged { .. } => {
            Error::conflict("appointment was modified concurrently")
        }
    }
}

pub(crate) fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}
