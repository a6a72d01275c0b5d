//! End-to-end booking flow over the HTTP surface backed by the in-memory
//! store: accounts, doctor onboarding, weekly schedule, slots, booking and
//! the appointment lifecycle.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use chrono::{Datelike, Days, FixedOffset, NaiveDate, Utc, Weekday};
use mockable::DefaultClock;
use rstest::rstest;
use serde_json::{Value, json};

use clinic_backend::Trace;
use clinic_backend::domain::ports::{PasswordHasher, ProfileRepository};
use clinic_backend::domain::{
    ClinicClock, EmailAddress, FullName, Password, Profile, ProfileDraft, ProfileId, Role,
};
use clinic_backend::inbound::http::configure;
use clinic_backend::inbound::http::state::{HttpState, StateRepositories};
use clinic_backend::outbound::memory::MemoryStore;
use clinic_backend::outbound::security::Pbkdf2PasswordHasher;

const ADMIN_EMAIL: &str = "admin@clinic.test";
const ADMIN_PASSWORD: &str = "admin password 123";
const TEST_ITERATIONS: u32 = 1_000;

/// Build the state and seed an admin, which cannot be created via sign-up.
async fn seeded_state() -> HttpState {
    let store = Arc::new(MemoryStore::new());
    let hasher = Arc::new(Pbkdf2PasswordHasher::new(TEST_ITERATIONS));

    let now = Utc::now();
    let admin = Profile::new(ProfileDraft {
        id: ProfileId::random(),
        email: EmailAddress::new(ADMIN_EMAIL).expect("email"),
        full_name: FullName::new("Clinic Admin").expect("name"),
        role: Role::Admin,
        phone: None,
        avatar_url: None,
        created_at: now,
        updated_at: now,
    });
    let digest = hasher
        .hash(&Password::new(ADMIN_PASSWORD).expect("password"))
        .expect("digest");
    ProfileRepository::create(store.as_ref(), &admin, &digest)
        .await
        .expect("seed admin");

    let offset = FixedOffset::east_opt(0).expect("offset");
    HttpState::from_repositories(StateRepositories {
        profiles: store.clone(),
        doctors: store.clone(),
        schedules: store.clone(),
        appointments: store,
        hasher,
        clock: ClinicClock::new(Arc::new(DefaultClock), offset),
    })
}

/// The first Monday strictly after today, so every slot is in the future.
fn upcoming_monday() -> NaiveDate {
    let mut date = Utc::now().date_naive() + Days::new(1);
    while date.weekday() != Weekday::Mon {
        date = date + Days::new(1);
    }
    date
}

fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

async fn send<S, B>(
    app: &S,
    req: test::TestRequest,
    cookie: Option<&Cookie<'static>>,
) -> (StatusCode, Value, Option<Cookie<'static>>)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = match cookie {
        Some(cookie) => req.cookie(cookie.clone()),
        None => req,
    };
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let issued = res
        .response()
        .cookies()
        .any(|cookie| cookie.name() == "session")
        .then(|| session_cookie(&res));
    let bytes = test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body, issued)
}

async fn sign_up<S, B>(app: &S, email: &str, role: &str) -> (Cookie<'static>, String)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body, cookie) = send(
        app,
        test::TestRequest::post().uri("/api/v1/auth/sign-up").set_json(json!({
            "email": email,
            "password": "a sufficiently long password",
            "fullName": format!("Test {role}"),
            "role": role,
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["id"].as_str().expect("profile id").to_owned();
    (cookie.expect("sign-up issues a session"), id)
}

fn id_of(body: &Value) -> String {
    body["id"].as_str().expect("id").to_owned()
}

#[rstest]
#[actix_web::test]
async fn patient_books_and_doctor_confirms() {
    let state = seeded_state().await;
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".into())
        .cookie_secure(false)
        .cookie_same_site(SameSite::Lax)
        .build();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .wrap(Trace)
            .service(web::scope("/api/v1").wrap(session).configure(configure)),
    )
    .await;

    let (patient, patient_id) = sign_up(&app, "pat@clinic.test", "patient").await;
    let (doctor, _) = sign_up(&app, "doc@clinic.test", "doctor").await;
    let (status, _, admin) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/sign-in")
            .set_json(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let admin = admin.expect("admin session");

    // Onboard the doctor; unverified doctors stay hidden from patients.
    let (status, body, _) = send(
        &app,
        test::TestRequest::post().uri("/api/v1/doctors").set_json(json!({
            "specialization": "Cardiology",
            "experienceYears": 12,
            "consultationFee": 500,
        })),
        Some(&doctor),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let doctor_id = id_of(&body);
    assert_eq!(body["isVerified"], json!(false));

    let (status, listed, _) = send(
        &app,
        test::TestRequest::get().uri("/api/v1/doctors"),
        Some(&patient),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([]));

    let (status, body, _) = send(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/doctors/{doctor_id}"))
            .set_json(json!({ "isVerified": true })),
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body, _) = send(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/doctors/{doctor_id}/schedule"))
            .set_json(json!({ "dayOfWeek": 1, "startTime": "09:00", "endTime": "10:00" })),
        Some(&doctor),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let date = upcoming_monday();
    let slots_uri = format!("/api/v1/doctors/{doctor_id}/slots?date={date}");
    let (status, body, _) = send(&app, test::TestRequest::get().uri(&slots_uri), Some(&patient)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(
        body["slots"],
        json!([
            { "time": "09:00", "available": true },
            { "time": "09:30", "available": true },
        ])
    );

    let booking = json!({ "doctorId": doctor_id, "date": date.to_string(), "time": "09:30" });
    let (status, body, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/appointments")
            .set_json(&booking),
        Some(&patient),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["status"], json!("pending"));
    assert_eq!(body["patientId"], json!(patient_id));
    let appointment_id = id_of(&body);

    let (status, _, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/appointments")
            .set_json(&booking),
        Some(&patient),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body, _) = send(&app, test::TestRequest::get().uri(&slots_uri), Some(&patient)).await;
    assert_eq!(body["slots"][1], json!({ "time": "09:30", "available": false }));

    let status_uri = format!("/api/v1/appointments/{appointment_id}/status");
    let (status, body, _) = send(
        &app,
        test::TestRequest::patch()
            .uri(&status_uri)
            .set_json(json!({ "status": "confirmed" })),
        Some(&doctor),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], json!("confirmed"));

    // Patients may only withdraw pending requests.
    let (status, _, _) = send(
        &app,
        test::TestRequest::patch()
            .uri(&status_uri)
            .set_json(json!({ "status": "cancelled" })),
        Some(&patient),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body, _) = send(
        &app,
        test::TestRequest::get().uri("/api/v1/appointments"),
        Some(&doctor),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[rstest]
#[actix_web::test]
async fn protected_routes_require_a_session() {
    let state = seeded_state().await;
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_secure(false)
        .build();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(web::scope("/api/v1").wrap(session).configure(configure)),
    )
    .await;

    for uri in ["/api/v1/appointments", "/api/v1/profiles/me", "/api/v1/doctors"] {
        let (status, body, _) = send(&app, test::TestRequest::get().uri(uri), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["code"], json!("unauthorized"), "{uri}");
    }
}
