//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod appointments;
pub mod auth;
pub mod doctors;
pub mod error;
pub mod health;
pub mod profiles;
pub mod schedules;
pub mod session;
pub mod session_config;
pub mod slots;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;

/// Register extractor configuration and every API handler.
///
/// Mount inside the versioned scope, e.g.
/// `web::scope("/api/v1").configure(configure)`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(error::json_config())
        .app_data(error::query_config())
        .app_data(error::path_config())
        .service(auth::sign_up)
        .service(auth::sign_in)
        .service(auth::sign_out)
        // `/profiles/me` must be matched before `/profiles/{id}`.
        .service(profiles::current_profile)
        .service(profiles::list_profiles)
        .service(profiles::get_profile)
        .service(profiles::update_profile)
        .service(doctors::list_doctors)
        .service(doctors::register_doctor)
        .service(doctors::get_doctor)
        .service(doctors::update_doctor)
        .service(schedules::list_schedule)
        .service(schedules::add_schedule_entry)
        .service(schedules::update_schedule_entry)
        .service(schedules::remove_schedule_entry)
        .service(slots::list_slots)
        .service(appointments::book_appointment)
        .service(appointments::list_appointments)
        .service(appointments::get_appointment)
        .service(appointments::change_status)
        .service(appointments::edit_notes);
}
