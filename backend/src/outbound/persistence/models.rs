//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Reading a row back re-validates every
//! field so a hand-edited database cannot smuggle invalid values into the
//! domain.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Appointment, AppointmentDraft, AppointmentId, AppointmentNotes, AvatarUrl, ConsultationFee,
    DayOfWeek, Doctor, DoctorDraft, DoctorId, EmailAddress, FullName, PasswordDigest,
    PhoneNumber, Profile, ProfileDraft, ProfileId, ScheduleEntry, ScheduleEntryId, Specialization,
    TimeWindow,
};

use super::schema::{appointments, doctor_schedules, doctors, profiles};

/// A stored row failed domain validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stored {table} row {id} is invalid: {message}")]
pub(crate) struct CorruptRow {
    pub table: &'static str,
    pub id: Uuid,
    pub message: String,
}

fn corrupt(table: &'static str, id: Uuid) -> impl Fn(String) -> CorruptRow {
    move |message| CorruptRow { table, id, message }
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProfileRow {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = CorruptRow;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let fail = corrupt("profiles", row.id);
        let invalid = |err: crate::domain::ProfileValidationError| fail(err.to_string());
        Ok(Profile::new(ProfileDraft {
            id: ProfileId::from_uuid(row.id),
            email: EmailAddress::new(&row.email).map_err(invalid)?,
            full_name: FullName::new(&row.full_name).map_err(invalid)?,
            role: row.role.parse().map_err(invalid)?,
            phone: row.phone.map(PhoneNumber::new).transpose().map_err(invalid)?,
            avatar_url: row
                .avatar_url
                .map(AvatarUrl::new)
                .transpose()
                .map_err(invalid)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CredentialRow {
    pub id: Uuid,
    pub password_digest: String,
}

impl CredentialRow {
    pub fn digest(&self) -> PasswordDigest {
        PasswordDigest::from_encoded(self.password_digest.as_str())
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = profiles)]
pub(crate) struct NewProfileRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_digest: &'a str,
    pub full_name: &'a str,
    pub role: &'a str,
    pub phone: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewProfileRow<'a> {
    pub fn new(profile: &'a Profile, digest: &'a PasswordDigest) -> Self {
        Self {
            id: *profile.id().as_uuid(),
            email: profile.email().as_ref(),
            password_digest: digest.as_str(),
            full_name: profile.full_name().as_ref(),
            role: profile.role().as_str(),
            phone: profile.phone().map(AsRef::as_ref),
            avatar_url: profile.avatar_url().map(AsRef::as_ref),
            created_at: profile.created_at(),
            updated_at: profile.updated_at(),
        }
    }
}

/// Mutable profile columns. `None` writes SQL `NULL`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = profiles)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProfileUpdate<'a> {
    pub full_name: &'a str,
    pub role: &'a str,
    pub phone: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Profile> for ProfileUpdate<'a> {
    fn from(profile: &'a Profile) -> Self {
        Self {
            full_name: profile.full_name().as_ref(),
            role: profile.role().as_str(),
            phone: profile.phone().map(AsRef::as_ref),
            avatar_url: profile.avatar_url().map(AsRef::as_ref),
            updated_at: profile.updated_at(),
        }
    }
}

// ---------------------------------------------------------------------------
// Doctors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = doctors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct DoctorRow {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub specialization: String,
    pub experience_years: i32,
    pub consultation_fee: i64,
    pub qualification: Option<String>,
    pub bio: Option<String>,
    pub is_verified: bool,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Doctor> for DoctorRow {
    fn from(doctor: &Doctor) -> Self {
        Self {
            id: *doctor.id().as_uuid(),
            profile_id: *doctor.profile_id().as_uuid(),
            specialization: doctor.specialization().as_ref().to_owned(),
            experience_years: i32::from(doctor.experience_years()),
            consultation_fee: i64::from(doctor.consultation_fee().minor_units()),
            qualification: doctor.qualification().map(str::to_owned),
            bio: doctor.bio().map(str::to_owned),
            is_verified: doctor.is_verified(),
            is_available: doctor.is_available(),
            created_at: doctor.created_at(),
            updated_at: doctor.updated_at(),
        }
    }
}

impl TryFrom<DoctorRow> for Doctor {
    type Error = CorruptRow;

    fn try_from(row: DoctorRow) -> Result<Self, Self::Error> {
        let fail = corrupt("doctors", row.id);
        let invalid = |err: crate::domain::DoctorValidationError| fail(err.to_string());
        Ok(Doctor::new(DoctorDraft {
            id: DoctorId::from_uuid(row.id),
            profile_id: ProfileId::from_uuid(row.profile_id),
            specialization: Specialization::new(&row.specialization).map_err(invalid)?,
            experience_years: crate::domain::doctor::experience_years(i64::from(
                row.experience_years,
            ))
            .map_err(invalid)?,
            consultation_fee: ConsultationFee::try_from_i64(row.consultation_fee)
                .map_err(invalid)?,
            qualification: row.qualification,
            bio: row.bio,
            is_verified: row.is_verified,
            is_available: row.is_available,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = doctor_schedules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ScheduleRow {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_available: bool,
}

impl From<&ScheduleEntry> for ScheduleRow {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            id: *entry.id().as_uuid(),
            doctor_id: *entry.doctor_id().as_uuid(),
            day_of_week: i16::from(entry.day_of_week().index()),
            start_time: entry.start_time(),
            end_time: entry.end_time(),
            is_available: entry.is_available(),
        }
    }
}

impl TryFrom<ScheduleRow> for ScheduleEntry {
    type Error = CorruptRow;

    fn try_from(row: ScheduleRow) -> Result<Self, Self::Error> {
        let fail = corrupt("doctor_schedules", row.id);
        let invalid = |err: crate::domain::ScheduleValidationError| fail(err.to_string());
        Ok(ScheduleEntry::new(
            ScheduleEntryId::from_uuid(row.id),
            DoctorId::from_uuid(row.doctor_id),
            DayOfWeek::new(i64::from(row.day_of_week)).map_err(invalid)?,
            TimeWindow::new(row.start_time, row.end_time).map_err(invalid)?,
            row.is_available,
        ))
    }
}

// ---------------------------------------------------------------------------
// Appointments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = appointments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AppointmentRow {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub status: String,
    pub patient_notes: Option<String>,
    pub doctor_notes: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn note_text(note: Option<&AppointmentNotes>) -> Option<String> {
    note.map(|text| text.as_ref().to_owned())
}

impl From<&Appointment> for AppointmentRow {
    fn from(appointment: &Appointment) -> Self {
        Self {
            id: *appointment.id().as_uuid(),
            patient_id: *appointment.patient_id().as_uuid(),
            doctor_id: *appointment.doctor_id().as_uuid(),
            appointment_date: appointment.date(),
            appointment_time: appointment.time(),
            status: appointment.status().as_str().to_owned(),
            patient_notes: note_text(appointment.patient_notes()),
            doctor_notes: note_text(appointment.doctor_notes()),
            notes: note_text(appointment.notes()),
            created_at: appointment.created_at(),
            updated_at: appointment.updated_at(),
        }
    }
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = CorruptRow;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        let fail = corrupt("appointments", row.id);
        let invalid = |err: crate::domain::AppointmentError| fail(err.to_string());
        let note = |text: Option<String>| {
            text.map_or(Ok(None), AppointmentNotes::new)
                .map_err(invalid)
        };
        Ok(Appointment::new(AppointmentDraft {
            id: AppointmentId::from_uuid(row.id),
            patient_id: ProfileId::from_uuid(row.patient_id),
            doctor_id: DoctorId::from_uuid(row.doctor_id),
            date: row.appointment_date,
            time: row.appointment_time,
            status: row.status.parse().map_err(invalid)?,
            patient_notes: note(row.patient_notes)?,
            doctor_notes: note(row.doctor_notes)?,
            notes: note(row.notes)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }
}

/// Note columns written by a notes edit. `None` writes SQL `NULL`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = appointments)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct AppointmentNotesUpdate {
    pub patient_notes: Option<String>,
    pub doctor_notes: Option<String>,
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Appointment> for AppointmentNotesUpdate {
    fn from(appointment: &Appointment) -> Self {
        Self {
            patient_notes: note_text(appointment.patient_notes()),
            doctor_notes: note_text(appointment.doctor_notes()),
            notes: note_text(appointment.notes()),
            updated_at: appointment.updated_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion coverage.
    use super::*;
    use crate::domain::Role;
    use crate::domain::test_fixtures::{appointment_for, doctor_for, fixture_now, profile};
    use rstest::rstest;

    #[rstest]
    fn profile_rows_reject_unknown_roles() {
        let patient = profile(Role::Patient);
        let row = ProfileRow {
            id: *patient.id().as_uuid(),
            email: patient.email().as_ref().to_owned(),
            full_name: patient.full_name().as_ref().to_owned(),
            role: "superuser".to_owned(),
            phone: None,
            avatar_url: None,
            created_at: fixture_now(),
            updated_at: fixture_now(),
        };
        let err = Profile::try_from(row).expect_err("unknown role");
        assert_eq!(err.table, "profiles");
    }

    #[rstest]
    fn doctor_rows_convert_both_ways() {
        let doctor = doctor_for(&ProfileId::random(), true, false);
        let restored = Doctor::try_from(DoctorRow::from(&doctor)).expect("valid row");
        assert_eq!(restored, doctor);
    }

    #[rstest]
    fn schedule_rows_reject_inverted_windows() {
        let row = ScheduleRow {
            id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            day_of_week: 1,
            start_time: NaiveTime::from_hms_opt(10, 0, 0).expect("time"),
            end_time: NaiveTime::from_hms_opt(9, 0, 0).expect("time"),
            is_available: true,
        };
        assert!(ScheduleEntry::try_from(row).is_err());
    }

    #[rstest]
    fn appointment_rows_reject_unknown_status() {
        let booking = appointment_for(&ProfileId::random(), &DoctorId::random());
        let mut row = AppointmentRow::from(&booking);
        row.status = "lost".to_owned();
        assert!(Appointment::try_from(row).is_err());
    }
}
