//! Appointment API handlers.
//!
//! ```text
//! POST /api/v1/appointments {"doctorId":"…","date":"2024-06-03","time":"09:30","notes":"Chest pain"}
//! GET /api/v1/appointments?date=2024-06-03
//! GET /api/v1/appointments/{id}
//! PATCH /api/v1/appointments/{id}/status {"status":"confirmed"}
//! PATCH /api/v1/appointments/{id}/notes {"field":"doctor","notes":"Follow up in two weeks"}
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::BookingRequest;
use crate::domain::{
    Actor, Appointment, AppointmentId, AppointmentNotes, AppointmentStatus, DoctorId, Error,
    NoteField, ProfileId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, format_time, invalid_field_error, missing_field_error, parse_date, parse_id,
    parse_optional_date, parse_time,
};

const APPOINTMENT_ID: FieldName = FieldName::new("id");
const NOTES: FieldName = FieldName::new("notes");

/// Appointment as returned to patients, doctors and admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: AppointmentId,
    #[schema(value_type = String, format = Uuid)]
    pub patient_id: ProfileId,
    #[schema(value_type = String, format = Uuid)]
    pub doctor_id: DoctorId,
    pub date: NaiveDate,
    #[schema(example = "09:30")]
    pub time: String,
    pub status: AppointmentStatus,
    pub patient_notes: Option<String>,
    pub doctor_notes: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn note_text(notes: Option<&AppointmentNotes>) -> Option<String> {
    notes.map(|text| text.as_ref().to_owned())
}

impl From<Appointment> for AppointmentResponse {
    fn from(value: Appointment) -> Self {
        Self {
            id: *value.id(),
            patient_id: *value.patient_id(),
            doctor_id: *value.doctor_id(),
            date: value.date(),
            time: format_time(value.time()),
            status: value.status(),
            patient_notes: note_text(value.patient_notes()),
            doctor_notes: note_text(value.doctor_notes()),
            notes: note_text(value.notes()),
            created_at: value.created_at(),
            updated_at: value.updated_at(),
        }
    }
}

/// Request body for `POST /api/v1/appointments`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentBody {
    pub doctor_id: String,
    #[schema(example = "2024-06-03")]
    pub date: String,
    #[schema(example = "09:30")]
    pub time: String,
    /// Required for admins booking on a patient's behalf; patients book
    /// for themselves.
    #[serde(default)]
    pub patient_id: Option<String>,
    /// Patient notes recorded with the booking.
    #[serde(default)]
    pub notes: Option<String>,
}

fn parse_notes(raw: Option<&str>) -> Result<Option<AppointmentNotes>, Error> {
    raw.map(AppointmentNotes::new)
        .transpose()
        .map(Option::flatten)
        .map_err(|err| invalid_field_error(NOTES, err))
}

fn booking_request(body: BookAppointmentBody, actor: &Actor) -> Result<BookingRequest, Error> {
    let patient_id = match body.patient_id.as_deref() {
        Some(raw) => parse_id(raw, FieldName::new("patientId"))?,
        None if actor.is_admin() => return Err(missing_field_error(FieldName::new("patientId"))),
        None => actor.profile_id,
    };
    Ok(BookingRequest {
        patient_id,
        doctor_id: parse_id(&body.doctor_id, FieldName::new("doctorId"))?,
        date: parse_date(&body.date, FieldName::new("date"))?,
        time: parse_time(&body.time, FieldName::new("time"))?,
        notes: parse_notes(body.notes.as_deref())?,
    })
}

/// Query string for `GET /api/v1/appointments`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AppointmentListQuery {
    /// Restrict to one calendar date (`YYYY-MM-DD`).
    pub date: Option<String>,
}

/// Request body for `PATCH /api/v1/appointments/{id}/status`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct StatusChangeBody {
    pub status: AppointmentStatus,
}

/// Request body for `PATCH /api/v1/appointments/{id}/notes`.
///
/// `null` or blank notes clear the field.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct NotesBody {
    pub field: NoteField,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Book a pending appointment in an available slot.
#[utoipa::path(
    post,
    path = "/api/v1/appointments",
    request_body = BookAppointmentBody,
    responses(
        (status = 201, description = "Appointment booked", body = AppointmentResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Doctor not found", body = Error),
        (status = 409, description = "Slot already taken", body = Error)
    ),
    tags = ["appointments"],
    operation_id = "bookAppointment"
)]
#[post("/appointments")]
pub async fn book_appointment(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<BookAppointmentBody>,
) -> ApiResult<HttpResponse> {
    let actor = state.actor(&session).await?;
    let request = booking_request(payload.into_inner(), &actor)?;
    let appointment = state.appointment_commands.book(&actor, request).await?;
    Ok(HttpResponse::Created().json(AppointmentResponse::from(appointment)))
}

/// Appointments visible to the caller, ordered by date then time.
#[utoipa::path(
    get,
    path = "/api/v1/appointments",
    params(AppointmentListQuery),
    responses(
        (status = 200, description = "Appointments", body = [AppointmentResponse]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["appointments"],
    operation_id = "listAppointments"
)]
#[get("/appointments")]
pub async fn list_appointments(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<AppointmentListQuery>,
) -> ApiResult<web::Json<Vec<AppointmentResponse>>> {
    let date = parse_optional_date(query.date.as_deref(), FieldName::new("date"))?;
    let actor = state.actor(&session).await?;
    let appointments = state.appointments.list(&actor, date).await?;
    Ok(web::Json(appointments.into_iter().map(Into::into).collect()))
}

/// Read one appointment.
#[utoipa::path(
    get,
    path = "/api/v1/appointments/{id}",
    params(("id" = String, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment", body = AppointmentResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["appointments"],
    operation_id = "getAppointment"
)]
#[get("/appointments/{id}")]
pub async fn get_appointment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<AppointmentResponse>> {
    let id: AppointmentId = parse_id(&path, APPOINTMENT_ID)?;
    let actor = state.actor(&session).await?;
    let appointment = state.appointments.get(&actor, &id).await?;
    Ok(web::Json(appointment.into()))
}

/// Move an appointment through its lifecycle.
#[utoipa::path(
    patch,
    path = "/api/v1/appointments/{id}/status",
    params(("id" = String, Path, description = "Appointment id")),
    request_body = StatusChangeBody,
    responses(
        (status = 200, description = "Updated appointment", body = AppointmentResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Illegal or concurrent transition", body = Error)
    ),
    tags = ["appointments"],
    operation_id = "changeAppointmentStatus"
)]
#[patch("/appointments/{id}/status")]
pub async fn change_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<StatusChangeBody>,
) -> ApiResult<web::Json<AppointmentResponse>> {
    let id: AppointmentId = parse_id(&path, APPOINTMENT_ID)?;
    let actor = state.actor(&session).await?;
    let appointment = state
        .appointment_commands
        .change_status(&actor, &id, payload.status)
        .await?;
    Ok(web::Json(appointment.into()))
}

/// Replace one of the appointment's note fields.
#[utoipa::path(
    patch,
    path = "/api/v1/appointments/{id}/notes",
    params(("id" = String, Path, description = "Appointment id")),
    request_body = NotesBody,
    responses(
        (status = 200, description = "Updated appointment", body = AppointmentResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["appointments"],
    operation_id = "editAppointmentNotes"
)]
#[patch("/appointments/{id}/notes")]
pub async fn edit_notes(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<NotesBody>,
) -> ApiResult<web::Json<AppointmentResponse>> {
    let id: AppointmentId = parse_id(&path, APPOINTMENT_ID)?;
    let NotesBody { field, notes } = payload.into_inner();
    let notes = parse_notes(notes.as_deref())?;
    let actor = state.actor(&session).await?;
    let appointment = state
        .appointment_commands
        .edit_notes(&actor, &id, field, notes)
        .await?;
    Ok(web::Json(appointment.into()))
}

#[cfg(test)]
#[path = "appointments_tests.rs"]
mod tests;
