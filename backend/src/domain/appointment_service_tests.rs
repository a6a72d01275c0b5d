//! Tests for the appointment service.

use std::sync::Arc;

use chrono::FixedOffset;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    AppointmentRepositoryError, MockAppointmentRepository, MockDoctorRepository,
    MockProfileRepository, MockSlotQuery,
};
use crate::domain::test_fixtures::{
    admin_actor, appointment_for, doctor_actor, doctor_for, fixture_clock, next_monday,
    patient_actor, profile, time,
};
use crate::domain::{Doctor, DoctorId, ErrorCode, ProfileId, Slot};

type Service = AppointmentService<
    MockAppointmentRepository,
    MockDoctorRepository,
    MockProfileRepository,
    MockSlotQuery,
>;

struct Mocks {
    appointments: MockAppointmentRepository,
    doctors: MockDoctorRepository,
    profiles: MockProfileRepository,
    slots: MockSlotQuery,
}

impl Mocks {
    fn new() -> Self {
        Self {
            appointments: MockAppointmentRepository::new(),
            doctors: MockDoctorRepository::new(),
            profiles: MockProfileRepository::new(),
            slots: MockSlotQuery::new(),
        }
    }

    fn with_doctor(mut self, doctor: &Doctor) -> Self {
        let doctor = doctor.clone();
        self.doctors
            .expect_find_by_id()
            .returning(move |_| Ok(Some(doctor.clone())));
        self
    }

    fn with_slots(mut self, slots: Vec<Slot>) -> Self {
        self.slots
            .expect_slots()
            .returning(move |_, _, _| Ok(slots.clone()));
        self
    }

    fn with_appointment(mut self, appointment: &Appointment) -> Self {
        let appointment = appointment.clone();
        self.appointments
            .expect_find_by_id()
            .returning(move |_| Ok(Some(appointment.clone())));
        self
    }

    fn build(self) -> Service {
        AppointmentService::new(
            Arc::new(self.appointments),
            Arc::new(self.doctors),
            Arc::new(self.profiles),
            Arc::new(self.slots),
            ClinicClock::new(
                fixture_clock(),
                FixedOffset::east_opt(0).expect("offset"),
            ),
        )
    }
}

#[fixture]
fn doctor() -> Doctor {
    doctor_for(&ProfileId::random(), true, true)
}

fn open_slots() -> Vec<Slot> {
    vec![
        Slot {
            time: time(9, 0),
            available: true,
        },
        Slot {
            time: time(9, 30),
            available: false,
        },
    ]
}

fn request(patient: &Actor, doctor: &DoctorId, at: (u32, u32)) -> BookingRequest {
    BookingRequest {
        patient_id: patient.profile_id,
        doctor_id: *doctor,
        date: next_monday(),
        time: time(at.0, at.1),
        notes: None,
    }
}

#[rstest]
#[tokio::test]
async fn patient_books_available_slot(doctor: Doctor) {
    let patient = patient_actor();
    let mut mocks = Mocks::new().with_doctor(&doctor).with_slots(open_slots());
    mocks
        .appointments
        .expect_insert()
        .withf(|appointment| appointment.status() == AppointmentStatus::Pending)
        .times(1)
        .returning(|_| Ok(()));

    let appointment = mocks
        .build()
        .book(&patient, request(&patient, doctor.id(), (9, 0)))
        .await
        .expect("booked");
    assert_eq!(appointment.patient_id(), &patient.profile_id);
    assert_eq!(appointment.status(), AppointmentStatus::Pending);
}

#[rstest]
#[tokio::test]
async fn losing_the_race_is_a_booking_conflict(doctor: Doctor) {
    let patient = patient_actor();
    let mut mocks = Mocks::new().with_doctor(&doctor).with_slots(open_slots());
    mocks
        .appointments
        .expect_insert()
        .returning(|_| Err(AppointmentRepositoryError::slot_taken("unique violation")));

    let error = mocks
        .build()
        .book(&patient, request(&patient, doctor.id(), (9, 0)))
        .await
        .expect_err("slot taken");
    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.message(), "failed to book appointment");
}

#[rstest]
#[case((9, 30), ErrorCode::Conflict)]
#[case((9, 15), ErrorCode::InvalidRequest)]
#[tokio::test]
async fn booking_requires_an_open_generated_slot(
    doctor: Doctor,
    #[case] at: (u32, u32),
    #[case] expected: ErrorCode,
) {
    let patient = patient_actor();
    let mut mocks = Mocks::new().with_doctor(&doctor).with_slots(open_slots());
    mocks.appointments.expect_insert().never();

    let error = mocks
        .build()
        .book(&patient, request(&patient, doctor.id(), at))
        .await
        .expect_err("slot not open");
    assert_eq!(error.code(), expected);
}

#[rstest]
#[tokio::test]
async fn booking_in_the_past_is_rejected(doctor: Doctor) {
    let patient = patient_actor();
    let mut mocks = Mocks::new().with_doctor(&doctor);
    mocks.slots.expect_slots().never();
    let mut past = request(&patient, doctor.id(), (9, 0));
    past.date = NaiveDate::from_ymd_opt(2024, 5, 27).expect("date");

    let error = mocks
        .build()
        .book(&patient, past)
        .await
        .expect_err("past slot");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn patient_cannot_book_for_someone_else(doctor: Doctor) {
    let patient = patient_actor();
    let other = patient_actor();
    let error = Mocks::new()
        .build()
        .book(&patient, request(&other, doctor.id(), (9, 0)))
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn unverified_doctor_cannot_be_booked_by_patients() {
    let hidden = doctor_for(&ProfileId::random(), false, true);
    let patient = patient_actor();
    let error = Mocks::new()
        .with_doctor(&hidden)
        .build()
        .book(&patient, request(&patient, hidden.id(), (9, 0)))
        .await
        .expect_err("hidden doctor");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn admin_books_on_behalf_of_patient(doctor: Doctor) {
    let patient = profile(Role::Patient);
    let patient_id = *patient.id();
    let mut mocks = Mocks::new().with_doctor(&doctor).with_slots(open_slots());
    mocks
        .profiles
        .expect_find_by_id()
        .returning(move |_| Ok(Some(patient.clone())));
    mocks.appointments.expect_insert().returning(|_| Ok(()));

    let booking = BookingRequest {
        patient_id,
        doctor_id: *doctor.id(),
        date: next_monday(),
        time: time(9, 0),
        notes: None,
    };
    let appointment = mocks
        .build()
        .book(&admin_actor(), booking)
        .await
        .expect("booked by admin");
    assert_eq!(appointment.patient_id(), &patient_id);
}

#[rstest]
#[tokio::test]
async fn admin_cannot_book_as_the_patient(doctor: Doctor) {
    let admin_profile = profile(Role::Admin);
    let admin = crate::domain::Actor {
        profile_id: *admin_profile.id(),
        role: Role::Admin,
        doctor_id: None,
    };
    let mut mocks = Mocks::new().with_doctor(&doctor).with_slots(open_slots());
    mocks
        .profiles
        .expect_find_by_id()
        .returning(move |_| Ok(Some(admin_profile.clone())));
    mocks.appointments.expect_insert().never();

    let booking = BookingRequest {
        patient_id: admin.profile_id,
        doctor_id: *doctor.id(),
        date: next_monday(),
        time: time(9, 0),
        notes: None,
    };
    let error = mocks
        .build()
        .book(&admin, booking)
        .await
        .expect_err("admins are not patients");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn doctor_confirms_with_compare_and_swap(doctor: Doctor) {
    let appointment = appointment_for(&ProfileId::random(), doctor.id());
    let mut mocks = Mocks::new().with_appointment(&appointment);
    mocks
        .appointments
        .expect_update_status()
        .withf(|updated, expected| {
            updated.status() == AppointmentStatus::Confirmed
                && *expected == AppointmentStatus::Pending
        })
        .times(1)
        .returning(|_, _| Ok(()));

    let updated = mocks
        .build()
        .change_status(
            &doctor_actor(&doctor),
            appointment.id(),
            AppointmentStatus::Confirmed,
        )
        .await
        .expect("confirmed");
    assert_eq!(updated.status(), AppointmentStatus::Confirmed);
}

#[rstest]
#[tokio::test]
async fn concurrent_status_change_is_a_conflict(doctor: Doctor) {
    let appointment = appointment_for(&ProfileId::random(), doctor.id());
    let mut mocks = Mocks::new().with_appointment(&appointment);
    mocks
        .appointments
        .expect_update_status()
        .returning(|_, _| Err(AppointmentRepositoryError::status_changed("pending")));

    let error = mocks
        .build()
        .change_status(
            &doctor_actor(&doctor),
            appointment.id(),
            AppointmentStatus::Cancelled,
        )
        .await
        .expect_err("lost race");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[case(AppointmentStatus::Pending)]
#[case(AppointmentStatus::Confirmed)]
#[case(AppointmentStatus::Completed)]
#[tokio::test]
async fn cancelled_appointments_stay_cancelled(
    doctor: Doctor,
    #[case] target: AppointmentStatus,
) {
    let mut appointment = appointment_for(&ProfileId::random(), doctor.id());
    appointment
        .transition(AppointmentStatus::Cancelled, chrono::Utc::now())
        .expect("cancel");
    let mut mocks = Mocks::new().with_appointment(&appointment);
    mocks.appointments.expect_update_status().never();

    let error = mocks
        .build()
        .change_status(&admin_actor(), appointment.id(), target)
        .await
        .expect_err("terminal");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn patient_cannot_confirm_own_booking(doctor: Doctor) {
    let patient = patient_actor();
    let appointment = appointment_for(&patient.profile_id, doctor.id());
    let error = Mocks::new()
        .with_appointment(&appointment)
        .build()
        .change_status(&patient, appointment.id(), AppointmentStatus::Confirmed)
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn other_patients_cannot_see_appointment(doctor: Doctor) {
    let appointment = appointment_for(&ProfileId::random(), doctor.id());
    let error = Mocks::new()
        .with_appointment(&appointment)
        .build()
        .get(&patient_actor(), appointment.id())
        .await
        .expect_err("hidden");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn other_doctor_cannot_see_appointment(doctor: Doctor) {
    let appointment = appointment_for(&ProfileId::random(), doctor.id());
    let stranger = doctor_for(&ProfileId::random(), true, true);
    let error = Mocks::new()
        .with_appointment(&appointment)
        .build()
        .get(&doctor_actor(&stranger), appointment.id())
        .await
        .expect_err("hidden");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn listings_are_scoped_by_role(doctor: Doctor) {
    let patient = patient_actor();
    let doctor_scope = AppointmentScope::Doctor(*doctor.id());
    let patient_scope = AppointmentScope::Patient(patient.profile_id);
    let mut mocks = Mocks::new();
    mocks
        .appointments
        .expect_list()
        .withf(move |scope, _| *scope == patient_scope)
        .times(1)
        .returning(|_, _| Ok(Vec::new()));
    mocks
        .appointments
        .expect_list()
        .withf(move |scope, _| *scope == doctor_scope)
        .times(1)
        .returning(|_, _| Ok(Vec::new()));
    mocks
        .appointments
        .expect_list()
        .withf(|scope, date| *scope == AppointmentScope::All && date.is_some())
        .times(1)
        .returning(|_, _| Ok(Vec::new()));
    let service = mocks.build();

    service.list(&patient, None).await.expect("patient list");
    service
        .list(&doctor_actor(&doctor), None)
        .await
        .expect("doctor list");
    service
        .list(&admin_actor(), Some(next_monday()))
        .await
        .expect("admin list");
}

#[rstest]
#[tokio::test]
async fn patient_cannot_write_doctor_notes(doctor: Doctor) {
    let patient = patient_actor();
    let appointment = appointment_for(&patient.profile_id, doctor.id());
    let mut mocks = Mocks::new().with_appointment(&appointment);
    mocks.appointments.expect_update_notes().never();
    let notes = AppointmentNotes::new("self-diagnosis").expect("notes");

    let error = mocks
        .build()
        .edit_notes(&patient, appointment.id(), NoteField::Doctor, notes)
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn doctor_writes_general_notes(doctor: Doctor) {
    let appointment = appointment_for(&ProfileId::random(), doctor.id());
    let mut mocks = Mocks::new().with_appointment(&appointment);
    mocks
        .appointments
        .expect_update_notes()
        .times(1)
        .returning(|_| Ok(()));
    let notes = AppointmentNotes::new("follow up in two weeks").expect("notes");

    let updated = mocks
        .build()
        .edit_notes(
            &doctor_actor(&doctor),
            appointment.id(),
            NoteField::General,
            notes,
        )
        .await
        .expect("notes saved");
    assert_eq!(
        updated.notes().map(|n| n.as_ref()),
        Some("follow up in two weeks")
    );
}
