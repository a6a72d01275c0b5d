//! Appointment aggregate and its status state machine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::ids::define_uuid_id;
use super::{DoctorId, ProfileId};

define_uuid_id! {
    /// Stable appointment identifier.
    AppointmentId => "appointment id"
}

/// Maximum length of each free-text note.
pub const NOTES_MAX: usize = 2000;

/// Validation and lifecycle errors raised by the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppointmentError {
    #[error("notes must be at most {max} characters")]
    NotesTooLong { max: usize },
    #[error("status must be pending, confirmed, cancelled or completed (got {0})")]
    UnknownStatus(String),
    #[error("cannot move appointment from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
}

/// Appointment lifecycle state.
///
/// `pending → confirmed | cancelled`, `confirmed → completed | cancelled`.
/// `cancelled` and `completed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    /// Requested by the patient, awaiting the doctor.
    Pending,
    /// Accepted by the doctor.
    Confirmed,
    /// Withdrawn or declined; terminal.
    Cancelled,
    /// Took place; terminal.
    Completed,
}

impl AppointmentStatus {
    /// Lower-case wire and storage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Whether the state machine permits moving from `self` to `next`.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Completed | Self::Cancelled)
        )
    }

    /// No further transitions are allowed.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }

    /// Active appointments occupy their slot; terminal ones release it.
    pub fn blocks_slot(self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = AppointmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            other => Err(AppointmentError::UnknownStatus(other.to_owned())),
        }
    }
}

/// Bounded free-text note. Blank input normalises to no note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentNotes(String);

impl AppointmentNotes {
    pub fn new(raw: impl AsRef<str>) -> Result<Option<Self>, AppointmentError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if trimmed.chars().count() > NOTES_MAX {
            return Err(AppointmentError::NotesTooLong { max: NOTES_MAX });
        }
        Ok(Some(Self(trimmed.to_owned())))
    }
}

impl AsRef<str> for AppointmentNotes {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Which of the three note fields an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum NoteField {
    /// Written by the patient at booking time.
    Patient,
    /// Written by the doctor.
    Doctor,
    /// General notes, maintained by the doctor.
    General,
}

/// Booked reservation of a doctor's slot by a patient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    id: AppointmentId,
    patient_id: ProfileId,
    doctor_id: DoctorId,
    date: NaiveDate,
    time: NaiveTime,
    status: AppointmentStatus,
    patient_notes: Option<AppointmentNotes>,
    doctor_notes: Option<AppointmentNotes>,
    notes: Option<AppointmentNotes>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Persisted field bundle used to rebuild an [`Appointment`].
#[derive(Debug, Clone)]
pub struct AppointmentDraft {
    pub id: AppointmentId,
    pub patient_id: ProfileId,
    pub doctor_id: DoctorId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    pub patient_notes: Option<AppointmentNotes>,
    pub doctor_notes: Option<AppointmentNotes>,
    pub notes: Option<AppointmentNotes>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Rehydrate an appointment from storage.
    pub fn new(draft: AppointmentDraft) -> Self {
        let AppointmentDraft {
            id,
            patient_id,
            doctor_id,
            date,
            time,
            status,
            patient_notes,
            doctor_notes,
            notes,
            created_at,
            updated_at,
        } = draft;
        Self {
            id,
            patient_id,
            doctor_id,
            date,
            time,
            status,
            patient_notes,
            doctor_notes,
            notes,
            created_at,
            updated_at,
        }
    }

    /// Create a fresh booking in the `pending` state.
    pub fn book(
        patient_id: ProfileId,
        doctor_id: DoctorId,
        date: NaiveDate,
        time: NaiveTime,
        patient_notes: Option<AppointmentNotes>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AppointmentId::random(),
            patient_id,
            doctor_id,
            date,
            time,
            status: AppointmentStatus::Pending,
            patient_notes,
            doctor_notes: None,
            notes: None,
            created_at: at,
            updated_at: at,
        }
    }

    pub fn id(&self) -> &AppointmentId {
        &self.id
    }

    pub fn patient_id(&self) -> &ProfileId {
        &self.patient_id
    }

    pub fn doctor_id(&self) -> &DoctorId {
        &self.doctor_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// Scheduled start as a naive local datetime.
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    pub fn status(&self) -> AppointmentStatus {
        self.status
    }

    pub fn patient_notes(&self) -> Option<&AppointmentNotes> {
        self.patient_notes.as_ref()
    }

    pub fn doctor_notes(&self) -> Option<&AppointmentNotes> {
        self.doctor_notes.as_ref()
    }

    pub fn notes(&self) -> Option<&AppointmentNotes> {
        self.notes.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Move to `next`, failing when the state machine forbids it.
    pub fn transition(
        &mut self,
        next: AppointmentStatus,
        at: DateTime<Utc>,
    ) -> Result<(), AppointmentError> {
        if !self.status.can_transition_to(next) {
            return Err(AppointmentError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = at;
        Ok(())
    }

    /// Replace one note field.
    pub fn set_note(&mut self, field: NoteField, value: Option<AppointmentNotes>, at: DateTime<Utc>) {
        let slot = match field {
            NoteField::Patient => &mut self.patient_notes,
            NoteField::Doctor => &mut self.doctor_notes,
            NoteField::General => &mut self.notes,
        };
        *slot = value;
        self.updated_at = at;
    }
}

#[cfg(test)]
mod tests {
    //! State machine and note validation coverage.
    use super::*;
    use rstest::{fixture, rstest};
    use AppointmentStatus::{Cancelled, Completed, Confirmed, Pending};

    #[fixture]
    fn appointment() -> Appointment {
        Appointment::book(
            ProfileId::random(),
            DoctorId::random(),
            NaiveDate::from_ymd_opt(2024, 6, 3).expect("date"),
            NaiveTime::from_hms_opt(9, 30, 0).expect("time"),
            None,
            Utc::now(),
        )
    }

    #[rstest]
    #[case(Pending, Confirmed, true)]
    #[case(Pending, Cancelled, true)]
    #[case(Pending, Completed, false)]
    #[case(Pending, Pending, false)]
    #[case(Confirmed, Completed, true)]
    #[case(Confirmed, Cancelled, true)]
    #[case(Confirmed, Pending, false)]
    #[case(Confirmed, Confirmed, false)]
    #[case(Cancelled, Pending, false)]
    #[case(Cancelled, Confirmed, false)]
    #[case(Completed, Cancelled, false)]
    #[case(Completed, Pending, false)]
    fn transition_table(
        #[case] from: AppointmentStatus,
        #[case] to: AppointmentStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[rstest]
    fn booking_starts_pending(appointment: Appointment) {
        assert_eq!(appointment.status(), Pending);
        assert!(appointment.status().blocks_slot());
    }

    #[rstest]
    fn terminal_states_reject_every_transition(mut appointment: Appointment) {
        appointment.transition(Cancelled, Utc::now()).expect("cancel");
        for next in [Pending, Confirmed, Cancelled, Completed] {
            let err = appointment
                .transition(next, Utc::now())
                .expect_err("terminal state");
            assert_eq!(
                err,
                AppointmentError::InvalidTransition {
                    from: Cancelled,
                    to: next,
                }
            );
        }
        assert!(!appointment.status().blocks_slot());
    }

    #[rstest]
    fn full_lifecycle(mut appointment: Appointment) {
        appointment.transition(Confirmed, Utc::now()).expect("confirm");
        appointment.transition(Completed, Utc::now()).expect("complete");
        assert!(appointment.status().is_terminal());
    }

    #[rstest]
    fn notes_are_bounded() {
        let raw = "n".repeat(NOTES_MAX + 1);
        assert_eq!(
            AppointmentNotes::new(raw),
            Err(AppointmentError::NotesTooLong { max: NOTES_MAX })
        );
        assert_eq!(AppointmentNotes::new("  "), Ok(None));
    }

    #[rstest]
    fn set_note_targets_one_field(mut appointment: Appointment) {
        let note = AppointmentNotes::new("bring x-rays").expect("valid note");
        appointment.set_note(NoteField::Doctor, note, Utc::now());
        assert_eq!(
            appointment.doctor_notes().map(|n| n.as_ref()),
            Some("bring x-rays")
        );
        assert!(appointment.patient_notes().is_none());
        assert!(appointment.notes().is_none());
    }

    #[rstest]
    fn status_parses_round_trip() {
        for status in [Pending, Confirmed, Cancelled, Completed] {
            assert_eq!(status.as_str().parse::<AppointmentStatus>(), Ok(status));
        }
        assert!("expired".parse::<AppointmentStatus>().is_err());
    }
}
