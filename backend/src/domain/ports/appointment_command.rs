//! Driving port for booking and appointment lifecycle changes.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use crate::domain::{
    Actor, Appointment, AppointmentId, AppointmentNotes, AppointmentStatus, DoctorId, Error,
    NoteField, ProfileId,
};

/// Booking payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    /// Patient the appointment is for; defaults to the actor at the edge.
    pub patient_id: ProfileId,
    pub doctor_id: DoctorId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub notes: Option<AppointmentNotes>,
}

/// Domain use-case port for appointment mutations.
#[async_trait]
pub trait AppointmentCommand: Send + Sync {
    /// Book a pending appointment in a currently available slot.
    async fn book(&self, actor: &Actor, request: BookingRequest) -> Result<Appointment, Error>;

    /// Move an appointment to `status`.
    async fn change_status(
        &self,
        actor: &Actor,
        id: &AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Appointment, Error>;

    /// Replace one note field.
    async fn edit_notes(
        &self,
        actor: &Actor,
        id: &AppointmentId,
        field: NoteField,
        notes: Option<AppointmentNotes>,
    ) -> Result<Appointment, Error>;
}
