//! Shared builders for domain service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    Actor, Appointment, ConsultationFee, Doctor, DoctorDraft, DoctorId, EmailAddress, FullName,
    Profile, ProfileDraft, ProfileId, Role, Specialization,
};

pub(crate) struct FixtureClock {
    pub utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// Saturday 2024-06-01 12:00 UTC.
pub(crate) fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_now(),
    })
}

/// Monday after [`fixture_now`].
pub(crate) fn next_monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).expect("valid date")
}

pub(crate) fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).expect("valid time")
}

pub(crate) fn profile(role: Role) -> Profile {
    let id = ProfileId::random();
    Profile::new(ProfileDraft {
        id,
        email: EmailAddress::new(format!("{id}@example.com")).expect("email"),
        full_name: FullName::new("Fixture Person").expect("name"),
        role,
        phone: None,
        avatar_url: None,
        created_at: fixture_now(),
        updated_at: fixture_now(),
    })
}

pub(crate) fn doctor_for(owner: &ProfileId, verified: bool, available: bool) -> Doctor {
    Doctor::new(DoctorDraft {
        id: DoctorId::random(),
        profile_id: *owner,
        specialization: Specialization::new("Cardiology").expect("specialization"),
        experience_years: 10,
        consultation_fee: ConsultationFee::from_minor_units(4_000),
        qualification: Some("MD".to_owned()),
        bio: None,
        is_verified: verified,
        is_available: available,
        created_at: fixture_now(),
        updated_at: fixture_now(),
    })
}

pub(crate) fn patient_actor() -> Actor {
    Actor {
        profile_id: ProfileId::random(),
        role: Role::Patient,
        doctor_id: None,
    }
}

pub(crate) fn admin_actor() -> Actor {
    Actor {
        profile_id: ProfileId::random(),
        role: Role::Admin,
        doctor_id: None,
    }
}

pub(crate) fn doctor_actor(doctor: &Doctor) -> Actor {
    Actor {
        profile_id: *doctor.profile_id(),
        role: Role::Doctor,
        doctor_id: Some(*doctor.id()),
    }
}

pub(crate) fn appointment_for(patient: &ProfileId, doctor: &DoctorId) -> Appointment {
    Appointment::book(
        *patient,
        *doctor,
        next_monday(),
        time(9, 0),
        None,
        fixture_now(),
    )
}
