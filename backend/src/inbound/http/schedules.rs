//! Weekly schedule API handlers.
//!
//! ```text
//! GET /api/v1/doctors/{id}/schedule?dayOfWeek=1
//! POST /api/v1/doctors/{id}/schedule {"dayOfWeek":1,"startTime":"09:00","endTime":"12:00"}
//! PATCH /api/v1/schedule-entries/{id} {"isAvailable":false}
//! DELETE /api/v1/schedule-entries/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::NewScheduleEntry;
use crate::domain::{
    DoctorId, Error, ScheduleChanges, ScheduleEntry, ScheduleEntryId, TimeWindow,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, format_time, invalid_field_error, parse_day_of_week, parse_id, parse_time,
};

const DAY_OF_WEEK: FieldName = FieldName::new("dayOfWeek");
const START_TIME: FieldName = FieldName::new("startTime");
const END_TIME: FieldName = FieldName::new("endTime");

/// One recurring availability window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntryResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: ScheduleEntryId,
    #[schema(value_type = String, format = Uuid)]
    pub doctor_id: DoctorId,
    /// 0 is Sunday, 6 is Saturday.
    pub day_of_week: u8,
    #[schema(example = "09:00")]
    pub start_time: String,
    #[schema(example = "12:00")]
    pub end_time: String,
    pub is_available: bool,
}

impl From<ScheduleEntry> for ScheduleEntryResponse {
    fn from(value: ScheduleEntry) -> Self {
        Self {
            id: *value.id(),
            doctor_id: *value.doctor_id(),
            day_of_week: value.day_of_week().index(),
            start_time: format_time(value.start_time()),
            end_time: format_time(value.end_time()),
            is_available: value.is_available(),
        }
    }
}

/// Query string for `GET /api/v1/doctors/{id}/schedule`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ScheduleQueryParams {
    /// Restrict to one weekday (0 = Sunday).
    pub day_of_week: Option<i64>,
}

/// Request body for `POST /api/v1/doctors/{id}/schedule`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddScheduleEntryBody {
    pub day_of_week: i64,
    #[schema(example = "09:00")]
    pub start_time: String,
    #[schema(example = "12:00")]
    pub end_time: String,
    #[serde(default)]
    pub is_available: Option<bool>,
}

impl TryFrom<AddScheduleEntryBody> for NewScheduleEntry {
    type Error = Error;

    fn try_from(value: AddScheduleEntryBody) -> Result<Self, Self::Error> {
        let day_of_week = parse_day_of_week(value.day_of_week, DAY_OF_WEEK)?;
        let start = parse_time(&value.start_time, START_TIME)?;
        let end = parse_time(&value.end_time, END_TIME)?;
        let window = TimeWindow::new(start, end).map_err(|err| invalid_field_error(END_TIME, err))?;
        Ok(Self {
            day_of_week,
            window,
            is_available: value.is_available.unwrap_or(true),
        })
    }
}

/// Partial update for `PATCH /api/v1/schedule-entries/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateScheduleEntryBody {
    pub day_of_week: Option<i64>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_available: Option<bool>,
}

impl TryFrom<UpdateScheduleEntryBody> for ScheduleChanges {
    type Error = Error;

    fn try_from(value: UpdateScheduleEntryBody) -> Result<Self, Self::Error> {
        Ok(Self {
            day_of_week: value
                .day_of_week
                .map(|day| parse_day_of_week(day, DAY_OF_WEEK))
                .transpose()?,
            start_time: value
                .start_time
                .as_deref()
                .map(|raw| parse_time(raw, START_TIME))
                .transpose()?,
            end_time: value
                .end_time
                .as_deref()
                .map(|raw| parse_time(raw, END_TIME))
                .transpose()?,
            is_available: value.is_available,
        })
    }
}

/// A doctor's weekly schedule ordered by weekday then start time.
#[utoipa::path(
    get,
    path = "/api/v1/doctors/{id}/schedule",
    params(("id" = String, Path, description = "Doctor id"), ScheduleQueryParams),
    responses(
        (status = 200, description = "Schedule entries", body = [ScheduleEntryResponse]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Doctor not found", body = Error)
    ),
    tags = ["schedules"],
    operation_id = "listSchedule"
)]
#[get("/doctors/{id}/schedule")]
pub async fn list_schedule(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<ScheduleQueryParams>,
) -> ApiResult<web::Json<Vec<ScheduleEntryResponse>>> {
    let doctor_id: DoctorId = parse_id(&path, FieldName::new("id"))?;
    let day = query
        .day_of_week
        .map(|day| parse_day_of_week(day, DAY_OF_WEEK))
        .transpose()?;
    let actor = state.actor(&session).await?;
    let entries = state.schedules.list(&actor, &doctor_id, day).await?;
    Ok(web::Json(entries.into_iter().map(Into::into).collect()))
}

/// Add a weekly availability window. Overlapping windows on the same
/// weekday are rejected.
#[utoipa::path(
    post,
    path = "/api/v1/doctors/{id}/schedule",
    params(("id" = String, Path, description = "Doctor id")),
    request_body = AddScheduleEntryBody,
    responses(
        (status = 201, description = "Entry created", body = ScheduleEntryResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Doctor not found", body = Error),
        (status = 409, description = "Overlapping entry", body = Error)
    ),
    tags = ["schedules"],
    operation_id = "addScheduleEntry"
)]
#[post("/doctors/{id}/schedule")]
pub async fn add_schedule_entry(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<AddScheduleEntryBody>,
) -> ApiResult<HttpResponse> {
    let doctor_id: DoctorId = parse_id(&path, FieldName::new("id"))?;
    let entry = NewScheduleEntry::try_from(payload.into_inner())?;
    let actor = state.actor(&session).await?;
    let created = state
        .schedule_commands
        .add(&actor, &doctor_id, entry)
        .await?;
    Ok(HttpResponse::Created().json(ScheduleEntryResponse::from(created)))
}

/// Edit a schedule entry.
#[utoipa::path(
    patch,
    path = "/api/v1/schedule-entries/{id}",
    params(("id" = String, Path, description = "Schedule entry id")),
    request_body = UpdateScheduleEntryBody,
    responses(
        (status = 200, description = "Updated entry", body = ScheduleEntryResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Overlapping entry", body = Error)
    ),
    tags = ["schedules"],
    operation_id = "updateScheduleEntry"
)]
#[patch("/schedule-entries/{id}")]
pub async fn update_schedule_entry(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateScheduleEntryBody>,
) -> ApiResult<web::Json<ScheduleEntryResponse>> {
    let id: ScheduleEntryId = parse_id(&path, FieldName::new("id"))?;
    let changes = ScheduleChanges::try_from(payload.into_inner())?;
    let actor = state.actor(&session).await?;
    let entry = state
        .schedule_commands
        .update(&actor, &id, changes)
        .await?;
    Ok(web::Json(entry.into()))
}

/// Remove a schedule entry. Existing appointments are kept.
#[utoipa::path(
    delete,
    path = "/api/v1/schedule-entries/{id}",
    params(("id" = String, Path, description = "Schedule entry id")),
    responses(
        (status = 204, description = "Entry removed"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["schedules"],
    operation_id = "removeScheduleEntry"
)]
#[delete("/schedule-entries/{id}")]
pub async fn remove_schedule_entry(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: ScheduleEntryId = parse_id(&path, FieldName::new("id"))?;
    let actor = state.actor(&session).await?;
    state.schedule_commands.remove(&actor, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}
