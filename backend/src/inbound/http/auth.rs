//! Account API handlers: sign-up, sign-in and sign-out.
//!
//! ```text
//! POST /api/v1/auth/sign-up {"email":"ada@example.com","password":"correct horse","fullName":"Ada Lovelace","role":"patient"}
//! POST /api/v1/auth/sign-in {"email":"ada@example.com","password":"correct horse"}
//! POST /api/v1/auth/sign-out
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::{AuthValidationError, Error, LoginCredentials, Role, SignUpRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::profiles::{ProfileResponse, profile_field_error};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field_error};

/// Request body for `POST /api/v1/auth/sign-up`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignUpBody {
    pub email: String,
    pub password: String,
    pub full_name: String,
    /// `patient` (default) or `doctor`.
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl TryFrom<SignUpBody> for SignUpRequest {
    type Error = AuthValidationError;

    fn try_from(value: SignUpBody) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            &value.email,
            &value.password,
            &value.full_name,
            value.role.unwrap_or(Role::Patient),
            value.phone.as_deref(),
        )
    }
}

/// Request body for `POST /api/v1/auth/sign-in`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInBody {
    pub email: String,
    pub password: String,
}

impl TryFrom<SignInBody> for LoginCredentials {
    type Error = AuthValidationError;

    fn try_from(value: SignInBody) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

fn map_auth_validation_error(err: AuthValidationError) -> Error {
    match &err {
        AuthValidationError::PasswordLength { .. } | AuthValidationError::EmptyPassword => {
            invalid_field_error(FieldName::new("password"), &err)
        }
        AuthValidationError::AdminSignUp => invalid_field_error(FieldName::new("role"), &err),
        AuthValidationError::Profile(inner) => profile_field_error(inner),
    }
}

/// Create a profile with a password credential and start a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-up",
    request_body = SignUpBody,
    responses(
        (status = 201, description = "Profile created", body = ProfileResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signUp",
    security([])
)]
#[post("/auth/sign-up")]
pub async fn sign_up(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SignUpBody>,
) -> ApiResult<HttpResponse> {
    let request = SignUpRequest::try_from(payload.into_inner()).map_err(map_auth_validation_error)?;
    let profile = state.accounts.sign_up(request).await?;
    session.persist_profile(profile.id())?;
    Ok(HttpResponse::Created().json(ProfileResponse::from(profile)))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-in",
    request_body = SignInBody,
    responses(
        (status = 200, description = "Signed in", body = ProfileResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signIn",
    security([])
)]
#[post("/auth/sign-in")]
pub async fn sign_in(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SignInBody>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_auth_validation_error)?;
    let profile_id = state.accounts.sign_in(&credentials).await?;
    let actor = state.profiles.resolve_actor(&profile_id).await?;
    let profile = state.profiles.get(&actor, &profile_id).await?;
    session.persist_profile(&profile_id)?;
    debug!(profile_id = %profile_id, "session established");
    Ok(web::Json(profile.into()))
}

/// End the current session. Succeeds even without one.
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-out",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "signOut"
)]
#[post("/auth/sign-out")]
pub async fn sign_out(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}
