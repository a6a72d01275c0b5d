//! Port abstraction for appointment persistence.
//!
//! Adapters own the two coordination points of the booking flow: the
//! active-slot uniqueness check on insert and the status compare-and-swap.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use crate::domain::{Appointment, AppointmentId, AppointmentStatus, DoctorId, ProfileId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by appointment repository adapters.
    pub enum AppointmentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "appointment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "appointment repository query failed: {message}",
        /// An active appointment already holds this doctor, date and time.
        SlotTaken { message: String } => "slot already booked: {message}",
        /// The stored status no longer matches the expected one.
        StatusChanged { expected: String } =>
            "appointment status is no longer {expected}",
    }
}

/// Which appointments a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentScope {
    Patient(ProfileId),
    Doctor(DoctorId),
    All,
}

/// Port for appointment storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Insert a new appointment.
    ///
    /// Fails with [`AppointmentRepositoryError::SlotTaken`] when another
    /// pending or confirmed appointment exists for the same doctor, date
    /// and time. Exactly one of several concurrent inserts succeeds.
    async fn insert(&self, appointment: &Appointment) -> Result<(), AppointmentRepositoryError>;

    /// Fetch an appointment by identifier.
    async fn find_by_id(
        &self,
        id: &AppointmentId,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError>;

    /// List appointments in `scope`, ordered by date then time.
    async fn list(
        &self,
        scope: AppointmentScope,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Appointment>, AppointmentRepositoryError>;

    /// Times held by pending or confirmed appointments for a doctor on a date.
    async fn booked_times(
        &self,
        doctor_id: &DoctorId,
        date: NaiveDate,
    ) -> Result<Vec<NaiveTime>, AppointmentRepositoryError>;

    /// Store the new status of `appointment` only while the stored status
    /// still equals `expected`.
    async fn update_status(
        &self,
        appointment: &Appointment,
        expected: AppointmentStatus,
    ) -> Result<(), AppointmentRepositoryError>;

    /// Store the three note fields of `appointment`.
    async fn update_notes(&self, appointment: &Appointment)
    -> Result<(), AppointmentRepositoryError>;
}
