//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every handler annotated with `#[utoipa::path]` plus
//! the request and response bodies they reference. Swagger UI serves it in
//! debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{AppointmentStatus, Error, ErrorCode, NoteField, Role};
use crate::inbound::http::appointments::{
    AppointmentResponse, BookAppointmentBody, NotesBody, StatusChangeBody,
};
use crate::inbound::http::auth::{SignInBody, SignUpBody};
use crate::inbound::http::doctors::{DoctorResponse, RegisterDoctorBody, UpdateDoctorBody};
use crate::inbound::http::profiles::{ProfileResponse, UpdateProfileBody};
use crate::inbound::http::schedules::{
    AddScheduleEntryBody, ScheduleEntryResponse, UpdateScheduleEntryBody,
};
use crate::inbound::http::slots::{DaySlotsResponse, SlotResponse};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/sign-in or sign-up.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Clinic booking API",
        description = "Profiles, doctor directory, weekly schedules, slot availability and appointments."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::sign_up,
        crate::inbound::http::auth::sign_in,
        crate::inbound::http::auth::sign_out,
        crate::inbound::http::profiles::current_profile,
        crate::inbound::http::profiles::list_profiles,
        crate::inbound::http::profiles::get_profile,
        crate::inbound::http::profiles::update_profile,
        crate::inbound::http::doctors::list_doctors,
        crate::inbound::http::doctors::register_doctor,
        crate::inbound::http::doctors::get_doctor,
        crate::inbound::http::doctors::update_doctor,
        crate::inbound::http::schedules::list_schedule,
        crate::inbound::http::schedules::add_schedule_entry,
        crate::inbound::http::schedules::update_schedule_entry,
        crate::inbound::http::schedules::remove_schedule_entry,
        crate::inbound::http::slots::list_slots,
        crate::inbound::http::appointments::book_appointment,
        crate::inbound::http::appointments::list_appointments,
        crate::inbound::http::appointments::get_appointment,
        crate::inbound::http::appointments::change_status,
        crate::inbound::http::appointments::edit_notes,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Role,
        AppointmentStatus,
        NoteField,
        SignUpBody,
        SignInBody,
        ProfileResponse,
        UpdateProfileBody,
        DoctorResponse,
        RegisterDoctorBody,
        UpdateDoctorBody,
        ScheduleEntryResponse,
        AddScheduleEntryBody,
        UpdateScheduleEntryBody,
        SlotResponse,
        DaySlotsResponse,
        AppointmentResponse,
        BookAppointmentBody,
        StatusChangeBody,
        NotesBody,
    )),
    tags(
        (name = "auth", description = "Sign-up, sign-in and sign-out"),
        (name = "profiles", description = "Account profiles"),
        (name = "doctors", description = "Doctor directory and records"),
        (name = "schedules", description = "Weekly doctor availability"),
        (name = "slots", description = "Bookable 30-minute slots"),
        (name = "appointments", description = "Booking and appointment lifecycle"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
