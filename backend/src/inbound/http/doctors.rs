//! Doctor directory API handlers.
//!
//! ```text
//! GET /api/v1/doctors?specialization=Cardiology&availableOnly=true
//! POST /api/v1/doctors {"specialization":"Cardiology","experienceYears":12,"consultationFee":5000}
//! GET /api/v1/doctors/{id}
//! PATCH /api/v1/doctors/{id} {"isAvailable":false}
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::doctor::{bio, experience_years, qualification};
use crate::domain::ports::NewDoctor;
use crate::domain::{
    ConsultationFee, DoctorChanges, DoctorFilter, DoctorId, DoctorListing, DoctorValidationError,
    Error, ProfileId, Specialization,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field_error, nullable, parse_id};

/// Directory entry: the doctor record joined with the owner's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: DoctorId,
    #[schema(value_type = String, format = Uuid)]
    pub profile_id: ProfileId,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub specialization: String,
    pub experience_years: u16,
    /// Minor currency units.
    pub consultation_fee: u32,
    pub qualification: Option<String>,
    pub bio: Option<String>,
    pub is_verified: bool,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DoctorListing> for DoctorResponse {
    fn from(value: DoctorListing) -> Self {
        let DoctorListing {
            doctor,
            full_name,
            avatar_url,
        } = value;
        Self {
            id: *doctor.id(),
            profile_id: *doctor.profile_id(),
            full_name: full_name.as_ref().to_owned(),
            avatar_url: avatar_url.map(|url| url.as_ref().to_owned()),
            specialization: doctor.specialization().as_ref().to_owned(),
            experience_years: doctor.experience_years(),
            consultation_fee: doctor.consultation_fee().minor_units(),
            qualification: doctor.qualification().map(str::to_owned),
            bio: doctor.bio().map(str::to_owned),
            is_verified: doctor.is_verified(),
            is_available: doctor.is_available(),
            created_at: doctor.created_at(),
            updated_at: doctor.updated_at(),
        }
    }
}

/// Query string for `GET /api/v1/doctors`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DoctorListQuery {
    /// Case-insensitive specialization match.
    pub specialization: Option<String>,
    /// Only verified doctors accepting bookings. Always on for patients.
    #[serde(default)]
    pub available_only: bool,
}

/// Request body for `POST /api/v1/doctors`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDoctorBody {
    /// Defaults to the signed-in profile; admins may name another doctor.
    #[serde(default)]
    pub profile_id: Option<String>,
    pub specialization: String,
    #[serde(default)]
    pub experience_years: i64,
    #[serde(default)]
    pub consultation_fee: i64,
    #[serde(default)]
    pub qualification: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub is_available: Option<bool>,
}

/// Partial update for `PATCH /api/v1/doctors/{id}`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateDoctorBody {
    pub specialization: Option<String>,
    pub experience_years: Option<i64>,
    pub consultation_fee: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub qualification: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub bio: Option<Option<String>>,
    /// Admin only.
    pub is_verified: Option<bool>,
    pub is_available: Option<bool>,
}

impl TryFrom<UpdateDoctorBody> for DoctorChanges {
    type Error = DoctorValidationError;

    fn try_from(value: UpdateDoctorBody) -> Result<Self, Self::Error> {
        Ok(Self {
            specialization: value.specialization.map(Specialization::new).transpose()?,
            experience_years: value.experience_years.map(experience_years).transpose()?,
            consultation_fee: value
                .consultation_fee
                .map(ConsultationFee::try_from_i64)
                .transpose()?,
            qualification: value.qualification.map(qualification).transpose()?,
            bio: value.bio.map(bio).transpose()?,
            is_verified: value.is_verified,
            is_available: value.is_available,
        })
    }
}

fn doctor_field_error(err: &DoctorValidationError) -> Error {
    let field = match err {
        DoctorValidationError::EmptySpecialization => "specialization",
        DoctorValidationError::TooLong { field, .. } => *field,
        DoctorValidationError::ExperienceOutOfRange { .. } => "experienceYears",
        DoctorValidationError::NegativeFee => "consultationFee",
    };
    invalid_field_error(FieldName::new(field), err)
}

fn new_doctor(body: RegisterDoctorBody, owner: ProfileId) -> Result<NewDoctor, Error> {
    let invalid = |err: DoctorValidationError| doctor_field_error(&err);
    Ok(NewDoctor {
        profile_id: owner,
        specialization: Specialization::new(body.specialization).map_err(invalid)?,
        experience_years: experience_years(body.experience_years).map_err(invalid)?,
        consultation_fee: ConsultationFee::try_from_i64(body.consultation_fee).map_err(invalid)?,
        qualification: qualification(body.qualification).map_err(invalid)?,
        bio: bio(body.bio).map_err(invalid)?,
        is_available: body.is_available.unwrap_or(true),
    })
}

const DOCTOR_ID: FieldName = FieldName::new("id");

/// Doctors visible to the caller, ordered by name.
#[utoipa::path(
    get,
    path = "/api/v1/doctors",
    params(DoctorListQuery),
    responses(
        (status = 200, description = "Doctors", body = [DoctorResponse]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["doctors"],
    operation_id = "listDoctors"
)]
#[get("/doctors")]
pub async fn list_doctors(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<DoctorListQuery>,
) -> ApiResult<web::Json<Vec<DoctorResponse>>> {
    let DoctorListQuery {
        specialization,
        available_only,
    } = query.into_inner();
    let specialization = specialization
        .filter(|raw| !raw.trim().is_empty())
        .map(Specialization::new)
        .transpose()
        .map_err(|err| doctor_field_error(&err))?;
    let actor = state.actor(&session).await?;
    let doctors = state
        .doctors
        .list(
            &actor,
            DoctorFilter {
                specialization,
                discoverable_only: available_only,
            },
        )
        .await?;
    Ok(web::Json(doctors.into_iter().map(Into::into).collect()))
}

/// Register the doctor record for a profile with the doctor role.
#[utoipa::path(
    post,
    path = "/api/v1/doctors",
    request_body = RegisterDoctorBody,
    responses(
        (status = 201, description = "Doctor registered", body = DoctorResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Profile already has a doctor record", body = Error)
    ),
    tags = ["doctors"],
    operation_id = "registerDoctor"
)]
#[post("/doctors")]
pub async fn register_doctor(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterDoctorBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let actor = state.actor(&session).await?;
    let owner = match body.profile_id.as_deref() {
        Some(raw) => parse_id(raw, FieldName::new("profileId"))?,
        None => actor.profile_id,
    };
    let doctor = state
        .doctor_commands
        .register(&actor, new_doctor(body, owner)?)
        .await?;
    // The owner now has a doctor record, so re-resolve before reading it back.
    let actor = state.profiles.resolve_actor(&actor.profile_id).await?;
    let listing = state.doctors.get(&actor, doctor.id()).await?;
    Ok(HttpResponse::Created().json(DoctorResponse::from(listing)))
}

/// Read one doctor. Unverified or unavailable doctors are hidden from
/// everyone but their owner and admins.
#[utoipa::path(
    get,
    path = "/api/v1/doctors/{id}",
    params(("id" = String, Path, description = "Doctor id")),
    responses(
        (status = 200, description = "Doctor", body = DoctorResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["doctors"],
    operation_id = "getDoctor"
)]
#[get("/doctors/{id}")]
pub async fn get_doctor(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<DoctorResponse>> {
    let id: DoctorId = parse_id(&path, DOCTOR_ID)?;
    let actor = state.actor(&session).await?;
    let listing = state.doctors.get(&actor, &id).await?;
    Ok(web::Json(listing.into()))
}

/// Update a doctor record. Only admins may change `isVerified`.
#[utoipa::path(
    patch,
    path = "/api/v1/doctors/{id}",
    params(("id" = String, Path, description = "Doctor id")),
    request_body = UpdateDoctorBody,
    responses(
        (status = 200, description = "Updated doctor", body = DoctorResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["doctors"],
    operation_id = "updateDoctor"
)]
#[patch("/doctors/{id}")]
pub async fn update_doctor(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateDoctorBody>,
) -> ApiResult<web::Json<DoctorResponse>> {
    let id: DoctorId = parse_id(&path, DOCTOR_ID)?;
    let changes =
        DoctorChanges::try_from(payload.into_inner()).map_err(|err| doctor_field_error(&err))?;
    let actor = state.actor(&session).await?;
    let doctor = state.doctor_commands.update(&actor, &id, changes).await?;
    let listing = state.doctors.get(&actor, doctor.id()).await?;
    Ok(web::Json(listing.into()))
}

#[cfg(test)]
#[path = "doctors_tests.rs"]
mod tests;
