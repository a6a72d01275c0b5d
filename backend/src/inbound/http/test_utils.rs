//! Test helpers for inbound HTTP components.
//!
//! Handler tests run real domain services over the in-memory store so
//! policy, validation and storage semantics are exercised end to end.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test as actix_test, web};
use chrono::{FixedOffset, Utc};
use serde_json::json;

use crate::domain::ports::{PasswordHasher, ProfileRepository};
use crate::domain::test_fixtures::fixture_clock;
use crate::domain::{
    ClinicClock, EmailAddress, FullName, Password, Profile, ProfileDraft, ProfileId, Role,
};
use crate::inbound::http::doctors::DoctorResponse;
use crate::inbound::http::profiles::ProfileResponse;
use crate::inbound::http::state::{HttpState, StateRepositories};
use crate::outbound::memory::MemoryStore;
use crate::outbound::security::Pbkdf2PasswordHasher;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Iteration count that keeps hashing fast in tests.
pub const TEST_PBKDF2_ITERATIONS: u32 = 1_000;

/// Password shared by every account the helpers create.
pub const TEST_PASSWORD: &str = "correct horse battery";

/// HTTP state backed by a fresh in-memory store and the fixture clock
/// (Saturday 2024-06-01 12:00 UTC).
pub fn memory_state() -> (HttpState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let offset = FixedOffset::east_opt(0).expect("zero offset");
    let state = HttpState::from_repositories(StateRepositories {
        profiles: store.clone(),
        doctors: store.clone(),
        schedules: store.clone(),
        appointments: store.clone(),
        hasher: Arc::new(Pbkdf2PasswordHasher::new(TEST_PBKDF2_ITERATIONS)),
        clock: ClinicClock::new(fixture_clock(), offset),
    });
    (state, store)
}

/// Full API under `/api/v1` with a test session middleware.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .service(web::scope("/api/v1").configure(crate::inbound::http::configure))
}

/// Extract the session cookie set on `response`.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// Sign up through the API and return the session cookie and profile.
pub async fn sign_up_as<S, B>(
    app: &S,
    email: &str,
    full_name: &str,
    role: Role,
) -> (Cookie<'static>, ProfileResponse)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/sign-up")
            .set_json(json!({
                "email": email,
                "password": TEST_PASSWORD,
                "fullName": full_name,
                "role": role,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), actix_web::http::StatusCode::CREATED);
    let cookie = session_cookie(&res);
    let profile: ProfileResponse = actix_test::read_body_json(res).await;
    (cookie, profile)
}

/// Sign in through the API and return the session cookie.
pub async fn sign_in_as<S, B>(app: &S, email: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/sign-in")
            .set_json(json!({ "email": email, "password": TEST_PASSWORD }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), actix_web::http::StatusCode::OK);
    session_cookie(&res)
}

/// Insert an admin directly; self-service sign-up cannot grant the role.
pub async fn seed_admin(store: &MemoryStore, email: &str) -> ProfileId {
    let now = Utc::now();
    let profile = Profile::new(ProfileDraft {
        id: ProfileId::random(),
        email: EmailAddress::new(email).expect("admin email"),
        full_name: FullName::new("Clinic Admin").expect("admin name"),
        role: Role::Admin,
        phone: None,
        avatar_url: None,
        created_at: now,
        updated_at: now,
    });
    let digest = Pbkdf2PasswordHasher::new(TEST_PBKDF2_ITERATIONS)
        .hash(&Password::new(TEST_PASSWORD).expect("password"))
        .expect("hash");
    store.create(&profile, &digest).await.expect("seed admin");
    *profile.id()
}

/// Register a doctor record for the signed-in doctor behind `cookie`.
pub async fn register_doctor<S, B>(
    app: &S,
    cookie: &Cookie<'static>,
    specialization: &str,
) -> DoctorResponse
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/doctors")
            .cookie(cookie.clone())
            .set_json(json!({
                "specialization": specialization,
                "experienceYears": 10,
                "consultationFee": 5000,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), actix_web::http::StatusCode::CREATED);
    actix_test::read_body_json(res).await
}

/// Mark a doctor as verified using an admin session.
pub async fn verify_doctor<S, B>(app: &S, admin_cookie: &Cookie<'static>, doctor: &DoctorResponse)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/doctors/{}", doctor.id))
            .cookie(admin_cookie.clone())
            .set_json(json!({ "isVerified": true }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), actix_web::http::StatusCode::OK);
}
