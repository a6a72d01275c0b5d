//! Driving port for reading appointments.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Actor, Appointment, AppointmentId, Error};

/// Domain use-case port for fetch-appointments.
#[async_trait]
pub trait AppointmentQuery: Send + Sync {
    /// Appointments visible to `actor` ordered by date then time: a patient's
    /// own bookings, a doctor's incoming bookings, or everything for admins.
    async fn list(&self, actor: &Actor, date: Option<NaiveDate>)
    -> Result<Vec<Appointment>, Error>;

    /// Read one appointment. Outsiders get `not_found`.
    async fn get(&self, actor: &Actor, id: &AppointmentId) -> Result<Appointment, Error>;
}
