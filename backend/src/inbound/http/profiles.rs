//! Profile API handlers.
//!
//! ```text
//! GET /api/v1/profiles/me
//! GET /api/v1/profiles
//! GET /api/v1/profiles/{id}
//! PATCH /api/v1/profiles/{id} {"fullName":"Ada King","phone":null}
//! ```

use actix_web::{get, patch, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    AvatarUrl, Error, FullName, PhoneNumber, Profile, ProfileChanges, ProfileId,
    ProfileValidationError, Role,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field_error, nullable, parse_id};

/// Public view of a profile. Credentials never leave the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: ProfileId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Profile> for ProfileResponse {
    fn from(value: Profile) -> Self {
        Self {
            id: *value.id(),
            email: value.email().as_ref().to_owned(),
            full_name: value.full_name().as_ref().to_owned(),
            role: value.role(),
            phone: value.phone().map(|phone| phone.as_ref().to_owned()),
            avatar_url: value.avatar_url().map(|url| url.as_ref().to_owned()),
            created_at: value.created_at(),
            updated_at: value.updated_at(),
        }
    }
}

/// Partial update for `PATCH /api/v1/profiles/{id}`.
///
/// Absent fields are left alone; `null` clears an optional field.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProfileBody {
    pub full_name: Option<String>,
    /// Admin only.
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub avatar_url: Option<Option<String>>,
}

impl TryFrom<UpdateProfileBody> for ProfileChanges {
    type Error = ProfileValidationError;

    fn try_from(value: UpdateProfileBody) -> Result<Self, Self::Error> {
        Ok(Self {
            full_name: value.full_name.map(FullName::new).transpose()?,
            role: value.role,
            phone: value
                .phone
                .map(|phone| phone.map(PhoneNumber::new).transpose())
                .transpose()?,
            avatar_url: value
                .avatar_url
                .map(|url| url.map(AvatarUrl::new).transpose())
                .transpose()?,
        })
    }
}

/// Map a profile validation failure onto the JSON field that caused it.
pub(crate) fn profile_field_error(err: &ProfileValidationError) -> Error {
    let field = match err {
        ProfileValidationError::EmptyEmail | ProfileValidationError::InvalidEmail => "email",
        ProfileValidationError::EmptyFullName | ProfileValidationError::FullNameTooLong { .. } => {
            "fullName"
        }
        ProfileValidationError::InvalidPhone => "phone",
        ProfileValidationError::InvalidAvatarUrl => "avatarUrl",
        ProfileValidationError::UnknownRole(_) => "role",
    };
    invalid_field_error(FieldName::new(field), err)
}

const PROFILE_ID: FieldName = FieldName::new("id");

/// Current signed-in profile.
#[utoipa::path(
    get,
    path = "/api/v1/profiles/me",
    responses(
        (status = 200, description = "Signed-in profile", body = ProfileResponse),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["profiles"],
    operation_id = "currentProfile"
)]
#[get("/profiles/me")]
pub async fn current_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ProfileResponse>> {
    let actor = state.actor(&session).await?;
    let profile = state.profiles.get(&actor, &actor.profile_id).await?;
    Ok(web::Json(profile.into()))
}

/// Every profile, oldest first. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/profiles",
    responses(
        (status = 200, description = "Profiles", body = [ProfileResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["profiles"],
    operation_id = "listProfiles"
)]
#[get("/profiles")]
pub async fn list_profiles(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ProfileResponse>>> {
    let actor = state.actor(&session).await?;
    let profiles = state.profiles.list(&actor).await?;
    Ok(web::Json(profiles.into_iter().map(Into::into).collect()))
}

/// Read one profile. Doctor profiles are public; other profiles are
/// visible to their owner and admins.
#[utoipa::path(
    get,
    path = "/api/v1/profiles/{id}",
    params(("id" = String, Path, description = "Profile id")),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["profiles"],
    operation_id = "getProfile"
)]
#[get("/profiles/{id}")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let id: ProfileId = parse_id(&path, PROFILE_ID)?;
    let actor = state.actor(&session).await?;
    let profile = state.profiles.get(&actor, &id).await?;
    Ok(web::Json(profile.into()))
}

/// Update a profile. Only admins may change roles.
#[utoipa::path(
    patch,
    path = "/api/v1/profiles/{id}",
    params(("id" = String, Path, description = "Profile id")),
    request_body = UpdateProfileBody,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["profiles"],
    operation_id = "updateProfile"
)]
#[patch("/profiles/{id}")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateProfileBody>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let id: ProfileId = parse_id(&path, PROFILE_ID)?;
    let changes =
        ProfileChanges::try_from(payload.into_inner()).map_err(|err| profile_field_error(&err))?;
    let actor = state.actor(&session).await?;
    let profile = state.profile_commands.update(&actor, &id, changes).await?;
    Ok(web::Json(profile.into()))
}

#[cfg(test)]
#[path = "profiles_tests.rs"]
mod tests;
