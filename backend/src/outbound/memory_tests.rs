//! Uniqueness, ordering and compare-and-set behaviour of the in-memory store.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::test_fixtures::{
    appointment_for, doctor_for, fixture_now, next_monday, profile, time,
};
use crate::domain::{AppointmentNotes, Role, TimeWindow};

#[fixture]
fn store() -> MemoryStore {
    MemoryStore::new()
}

fn digest() -> PasswordDigest {
    PasswordDigest::from_encoded("pbkdf2-sha256$1000$00$00")
}

fn entry(doctor: &DoctorId, day: i64, start: (u32, u32), end: (u32, u32)) -> ScheduleEntry {
    ScheduleEntry::new(
        ScheduleEntryId::random(),
        *doctor,
        DayOfWeek::new(day).expect("day"),
        TimeWindow::new(time(start.0, start.1), time(end.0, end.1)).expect("window"),
        true,
    )
}

#[rstest]
#[tokio::test]
async fn rejects_a_second_profile_with_the_same_email(store: MemoryStore) {
    let first = profile(Role::Patient);
    ProfileRepository::create(&store, &first, &digest())
        .await
        .expect("first profile");

    let clash = Profile::new(crate::domain::ProfileDraft {
        id: ProfileId::random(),
        email: first.email().clone(),
        full_name: first.full_name().clone(),
        role: Role::Doctor,
        phone: None,
        avatar_url: None,
        created_at: fixture_now(),
        updated_at: fixture_now(),
    });
    let err = ProfileRepository::create(&store, &clash, &digest())
        .await
        .expect_err("duplicate email");
    assert!(matches!(err, ProfileRepositoryError::DuplicateEmail { .. }));
}

#[rstest]
#[tokio::test]
async fn finds_credentials_by_email(store: MemoryStore) {
    let patient = profile(Role::Patient);
    ProfileRepository::create(&store, &patient, &digest())
        .await
        .expect("profile");

    let credential = store
        .find_credential(patient.email())
        .await
        .expect("lookup")
        .expect("credential");
    assert_eq!(credential.profile_id, *patient.id());
    assert_eq!(credential.digest, digest());
}

#[rstest]
#[tokio::test]
async fn allows_one_doctor_record_per_profile(store: MemoryStore) {
    let owner = profile(Role::Doctor);
    ProfileRepository::create(&store, &owner, &digest())
        .await
        .expect("profile");
    DoctorRepository::create(&store, &doctor_for(owner.id(), true, true))
        .await
        .expect("first record");

    let err = DoctorRepository::create(&store, &doctor_for(owner.id(), false, true))
        .await
        .expect_err("second record");
    assert!(matches!(err, DoctorRepositoryError::DuplicateProfile { .. }));
}

#[rstest]
#[tokio::test]
async fn listing_joins_profile_and_applies_filter(store: MemoryStore) {
    let visible_owner = profile(Role::Doctor);
    let hidden_owner = profile(Role::Doctor);
    for owner in [&visible_owner, &hidden_owner] {
        ProfileRepository::create(&store, owner, &digest())
            .await
            .expect("profile");
    }
    let visible = doctor_for(visible_owner.id(), true, true);
    DoctorRepository::create(&store, &visible)
        .await
        .expect("visible");
    DoctorRepository::create(&store, &doctor_for(hidden_owner.id(), false, true))
        .await
        .expect("hidden");

    let filter = DoctorFilter {
        specialization: None,
        discoverable_only: true,
    };
    let listings = DoctorRepository::list(&store, &filter).await.expect("list");
    assert_eq!(listings.len(), 1);
    let listing = listings.first().expect("listing");
    assert_eq!(listing.doctor.id(), visible.id());
    assert_eq!(&listing.full_name, visible_owner.full_name());

    let everyone = DoctorRepository::list(&store, &DoctorFilter::default())
        .await
        .expect("list all");
    assert_eq!(everyone.len(), 2);
}

#[rstest]
#[tokio::test]
async fn schedule_is_ordered_by_day_then_start(store: MemoryStore) {
    let doctor = DoctorId::random();
    for candidate in [
        entry(&doctor, 3, (14, 0), (16, 0)),
        entry(&doctor, 1, (13, 0), (15, 0)),
        entry(&doctor, 1, (9, 0), (12, 0)),
    ] {
        ScheduleRepository::insert(&store, &candidate)
            .await
            .expect("insert");
    }

    let all = store.list_for_doctor(&doctor, None).await.expect("list");
    let keys: Vec<(u8, NaiveTime)> = all
        .iter()
        .map(|e| (e.day_of_week().index(), e.start_time()))
        .collect();
    assert_eq!(
        keys,
        vec![(1, time(9, 0)), (1, time(13, 0)), (3, time(14, 0))]
    );

    let monday = DayOfWeek::new(1).expect("monday");
    let filtered = store
        .list_for_doctor(&doctor, Some(monday))
        .await
        .expect("filtered");
    assert_eq!(filtered.len(), 2);
}

#[rstest]
#[tokio::test]
async fn rejects_two_entries_starting_together(store: MemoryStore) {
    let doctor = DoctorId::random();
    ScheduleRepository::insert(&store, &entry(&doctor, 1, (9, 0), (10, 0)))
        .await
        .expect("first");

    let err = ScheduleRepository::insert(&store, &entry(&doctor, 1, (9, 0), (11, 0)))
        .await
        .expect_err("same start");
    assert!(matches!(err, ScheduleRepositoryError::DuplicateEntry { .. }));
}

#[rstest]
#[tokio::test]
async fn delete_reports_whether_a_row_was_removed(store: MemoryStore) {
    let candidate = entry(&DoctorId::random(), 2, (9, 0), (10, 0));
    ScheduleRepository::insert(&store, &candidate)
        .await
        .expect("insert");

    assert!(store.delete(candidate.id()).await.expect("delete"));
    assert!(!store.delete(candidate.id()).await.expect("second delete"));
}

#[rstest]
#[tokio::test]
async fn cancelled_bookings_release_their_slot(store: MemoryStore) {
    let doctor = DoctorId::random();
    let mut first = appointment_for(&ProfileId::random(), &doctor);
    AppointmentRepository::insert(&store, &first)
        .await
        .expect("first booking");

    let second = appointment_for(&ProfileId::random(), &doctor);
    let err = AppointmentRepository::insert(&store, &second)
        .await
        .expect_err("slot taken");
    assert!(matches!(err, AppointmentRepositoryError::SlotTaken { .. }));

    first
        .transition(AppointmentStatus::Cancelled, fixture_now())
        .expect("cancel");
    store
        .update_status(&first, AppointmentStatus::Pending)
        .await
        .expect("persist cancel");
    assert!(
        store
            .booked_times(&doctor, next_monday())
            .await
            .expect("booked")
            .is_empty()
    );

    AppointmentRepository::insert(&store, &second)
        .await
        .expect("rebook freed slot");
}

#[rstest]
#[tokio::test]
async fn status_updates_compare_against_the_stored_status(store: MemoryStore) {
    let mut booking = appointment_for(&ProfileId::random(), &DoctorId::random());
    AppointmentRepository::insert(&store, &booking)
        .await
        .expect("insert");
    booking
        .transition(AppointmentStatus::Confirmed, fixture_now())
        .expect("confirm");
    store
        .update_status(&booking, AppointmentStatus::Pending)
        .await
        .expect("first writer");

    let err = store
        .update_status(&booking, AppointmentStatus::Pending)
        .await
        .expect_err("stale writer");
    assert_eq!(
        err,
        AppointmentRepositoryError::status_changed("pending")
    );
}

#[rstest]
#[tokio::test]
async fn note_updates_keep_the_stored_status(store: MemoryStore) {
    let booking = appointment_for(&ProfileId::random(), &DoctorId::random());
    AppointmentRepository::insert(&store, &booking)
        .await
        .expect("insert");

    let mut confirmed = booking.clone();
    confirmed
        .transition(AppointmentStatus::Confirmed, fixture_now())
        .expect("confirm");
    store
        .update_status(&confirmed, AppointmentStatus::Pending)
        .await
        .expect("confirm");

    let mut stale = booking;
    let note = AppointmentNotes::new("bring referral").expect("note");
    stale.set_note(NoteField::Doctor, note.clone(), fixture_now());
    store.update_notes(&stale).await.expect("notes");

    let stored = AppointmentRepository::find_by_id(&store, stale.id())
        .await
        .expect("find")
        .expect("present");
    assert_eq!(stored.status(), AppointmentStatus::Confirmed);
    assert_eq!(stored.doctor_notes(), note.as_ref());
}

#[rstest]
#[tokio::test]
async fn listings_follow_scope_and_calendar_order(store: MemoryStore) {
    let doctor = DoctorId::random();
    let patient = ProfileId::random();
    let late = Appointment::book(patient, doctor, next_monday(), time(10, 0), None, fixture_now());
    let early = Appointment::book(patient, doctor, next_monday(), time(9, 0), None, fixture_now());
    let other = appointment_for(&ProfileId::random(), &DoctorId::random());
    for booking in [&late, &early, &other] {
        AppointmentRepository::insert(&store, booking)
            .await
            .expect("insert");
    }

    let mine = AppointmentRepository::list(&store, AppointmentScope::Patient(patient), None)
        .await
        .expect("patient list");
    let ids: Vec<_> = mine.iter().map(|a| *a.id()).collect();
    assert_eq!(ids, vec![*early.id(), *late.id()]);

    let all = AppointmentRepository::list(&store, AppointmentScope::All, Some(next_monday()))
        .await
        .expect("all");
    assert_eq!(all.len(), 3);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_bookings_of_one_slot_admit_a_single_winner() {
    let store = Arc::new(MemoryStore::new());
    let doctor = DoctorId::random();
    let attempts = (0..16).map(|_| {
        let store = Arc::clone(&store);
        let booking = appointment_for(&ProfileId::random(), &doctor);
        tokio::spawn(async move { AppointmentRepository::insert(store.as_ref(), &booking).await })
    });

    let mut winners = 0;
    for attempt in attempts.collect::<Vec<_>>() {
        if attempt.await.expect("task").is_ok() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
    assert_eq!(
        store
            .booked_times(&doctor, next_monday())
            .await
            .expect("booked"),
        vec![time(9, 0)]
    );
}
