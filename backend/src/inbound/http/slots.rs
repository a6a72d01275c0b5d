//! Slot availability handler.
//!
//! ```text
//! GET /api/v1/doctors/{id}/slots?date=2024-06-03
//! ```

use actix_web::{get, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{DoctorId, Error, Slot};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, format_time, missing_field_error, parse_date, parse_id,
};

const DATE: FieldName = FieldName::new("date");

/// One 30-minute slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SlotResponse {
    #[schema(example = "09:30")]
    pub time: String,
    pub available: bool,
}

impl From<Slot> for SlotResponse {
    fn from(value: Slot) -> Self {
        Self {
            time: format_time(value.time),
            available: value.available,
        }
    }
}

/// Slots for one doctor on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DaySlotsResponse {
    #[schema(value_type = String, format = Uuid)]
    pub doctor_id: DoctorId,
    pub date: NaiveDate,
    pub slots: Vec<SlotResponse>,
}

/// Query string for the slot endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SlotQueryParams {
    /// Calendar date in `YYYY-MM-DD` form.
    pub date: Option<String>,
}

/// Bookable slots for a doctor on a date, ascending by time. A slot is
/// unavailable once booked by a pending or confirmed appointment, or once
/// it has passed.
#[utoipa::path(
    get,
    path = "/api/v1/doctors/{id}/slots",
    params(("id" = String, Path, description = "Doctor id"), SlotQueryParams),
    responses(
        (status = 200, description = "Slots for the day", body = DaySlotsResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Doctor not found", body = Error)
    ),
    tags = ["slots"],
    operation_id = "listSlots"
)]
#[get("/doctors/{id}/slots")]
pub async fn list_slots(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<SlotQueryParams>,
) -> ApiResult<web::Json<DaySlotsResponse>> {
    let doctor_id: DoctorId = parse_id(&path, FieldName::new("id"))?;
    let raw_date = query
        .date
        .as_deref()
        .ok_or_else(|| missing_field_error(DATE))?;
    let date = parse_date(raw_date, DATE)?;
    let actor = state.actor(&session).await?;
    let slots = state.slots.slots(&actor, &doctor_id, date).await?;
    Ok(web::Json(DaySlotsResponse {
        doctor_id,
        date,
        slots: slots.into_iter().map(Into::into).collect(),
    }))
}
