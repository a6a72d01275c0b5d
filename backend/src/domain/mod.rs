//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed clinic entities (profiles, doctors, weekly
//! schedules, appointments), the slot generator, the appointment state
//! machine and the access policy. Services implement the driving ports in
//! [`ports`] on top of the driven repository ports.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifier.
//! - Profile, Doctor, ScheduleEntry, Appointment: aggregates.
//! - `generate_slots`: pure slot computation.
//! - `authorize`: role × action policy.

pub mod appointment;
mod appointment_service;
mod account_service;
pub mod auth;
pub mod doctor;
mod doctor_service;
pub mod error;
mod ids;
pub mod policy;
pub mod ports;
pub mod profile;
mod profile_service;
mod repository_errors;
pub mod schedule;
mod schedule_service;
mod slot_service;
pub mod slots;
#[cfg(test)]
pub(crate) mod test_fixtures;
pub mod trace_id;

pub use self::account_service::AccountService;
pub use self::appointment::{
    Appointment, AppointmentDraft, AppointmentError, AppointmentId, AppointmentNotes,
    AppointmentStatus, NOTES_MAX, NoteField,
};
pub use self::appointment_service::AppointmentService;
pub use self::auth::{
    AuthValidationError, LoginCredentials, PASSWORD_MAX, PASSWORD_MIN, Password, PasswordDigest,
    SignUpRequest,
};
pub use self::doctor::{
    ConsultationFee, Doctor, DoctorChanges, DoctorDraft, DoctorFilter, DoctorId, DoctorListing,
    DoctorValidationError, Specialization,
};
pub use self::doctor_service::DoctorService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::ids::IdValidationError;
pub use self::policy::{Action, Actor, PolicyDenial, authorize};
pub use self::profile::{
    AvatarUrl, EmailAddress, FullName, PhoneNumber, Profile, ProfileChanges, ProfileDraft,
    ProfileId, ProfileValidationError, Role,
};
pub use self::profile_service::ProfileService;
pub use self::schedule::{
    DayOfWeek, ScheduleChanges, ScheduleEntry, ScheduleEntryId, ScheduleValidationError,
    TimeWindow,
};
pub use self::schedule_service::ScheduleService;
pub use self::slot_service::{ClinicClock, SlotService};
pub use self::slots::{SLOT_INTERVAL_MINUTES, Slot, generate_slots};
pub use self::trace_id::TraceId;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use clinic_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
