//! In-process store implementing every repository port.
//!
//! Used when no database is configured and by the HTTP adapter tests. One
//! mutex guards all tables so the uniqueness rules that PostgreSQL enforces
//! with indexes (email, one doctor per profile, one schedule entry per
//! doctor, day and start time, one active booking per slot) are checked and
//! applied atomically.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use crate::domain::ports::{
    AppointmentRepository, AppointmentRepositoryError, AppointmentScope, DoctorRepository,
    DoctorRepositoryError, ProfileRepository, ProfileRepositoryError, ScheduleRepository,
    ScheduleRepositoryError, StoredCredential,
};
use crate::domain::{
    Appointment, AppointmentId, AppointmentStatus, DayOfWeek, Doctor, DoctorFilter, DoctorId,
    DoctorListing, EmailAddress, NoteField, PasswordDigest, Profile, ProfileId, ScheduleEntry,
    ScheduleEntryId,
};

#[derive(Default)]
struct Tables {
    profiles: HashMap<ProfileId, (Profile, PasswordDigest)>,
    doctors: HashMap<DoctorId, Doctor>,
    schedule: HashMap<ScheduleEntryId, ScheduleEntry>,
    appointments: HashMap<AppointmentId, Appointment>,
}

impl Tables {
    fn listing(&self, doctor: &Doctor) -> Option<DoctorListing> {
        self.profiles
            .get(doctor.profile_id())
            .map(|(profile, _)| DoctorListing {
                doctor: doctor.clone(),
                full_name: profile.full_name().clone(),
                avatar_url: profile.avatar_url().cloned(),
            })
    }

    fn slot_is_taken(&self, candidate: &Appointment) -> bool {
        self.appointments.values().any(|existing| {
            existing.id() != candidate.id()
                && existing.doctor_id() == candidate.doctor_id()
                && existing.date() == candidate.date()
                && existing.time() == candidate.time()
                && existing.status().blocks_slot()
        })
    }

    fn starts_clash(&self, entry: &ScheduleEntry) -> bool {
        self.schedule.values().any(|existing| {
            existing.id() != entry.id()
                && existing.doctor_id() == entry.doctor_id()
                && existing.day_of_week() == entry.day_of_week()
                && existing.start_time() == entry.start_time()
        })
    }
}

/// Mutex-guarded tables for profiles, doctors, schedules and appointments.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave a table half-written, so
    // a poisoned guard is still consistent.
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ProfileRepository for MemoryStore {
    async fn create(
        &self,
        profile: &Profile,
        digest: &PasswordDigest,
    ) -> Result<(), ProfileRepositoryError> {
        let mut tables = self.tables();
        let taken = tables
            .profiles
            .values()
            .any(|(existing, _)| existing.email() == profile.email());
        if taken {
            return Err(ProfileRepositoryError::duplicate_email(
                profile.email().as_ref(),
            ));
        }
        tables
            .profiles
            .insert(*profile.id(), (profile.clone(), digest.clone()));
        Ok(())
    }

    async fn find_by_id(&self, id: &ProfileId) -> Result<Option<Profile>, ProfileRepositoryError> {
        Ok(self
            .tables()
            .profiles
            .get(id)
            .map(|(profile, _)| profile.clone()))
    }

    async fn find_credential(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredential>, ProfileRepositoryError> {
        Ok(self
            .tables()
            .profiles
            .values()
            .find(|(profile, _)| profile.email() == email)
            .map(|(profile, digest)| StoredCredential {
                profile_id: *profile.id(),
                digest: digest.clone(),
            }))
    }

    async fn update(&self, profile: &Profile) -> Result<(), ProfileRepositoryError> {
        if let Some((stored, _)) = self.tables().profiles.get_mut(profile.id()) {
            *stored = profile.clone();
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Profile>, ProfileRepositoryError> {
        let mut profiles: Vec<Profile> = self
            .tables()
            .profiles
            .values()
            .map(|(profile, _)| profile.clone())
            .collect();
        profiles.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.email().as_ref().cmp(b.email().as_ref()))
        });
        Ok(profiles)
    }
}

#[async_trait]
impl DoctorRepository for MemoryStore {
    async fn create(&self, doctor: &Doctor) -> Result<(), DoctorRepositoryError> {
        let mut tables = self.tables();
        let taken = tables
            .doctors
            .values()
            .any(|existing| existing.profile_id() == doctor.profile_id());
        if taken {
            return Err(DoctorRepositoryError::duplicate_profile(
                doctor.profile_id().to_string(),
            ));
        }
        tables.doctors.insert(*doctor.id(), doctor.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &DoctorId) -> Result<Option<Doctor>, DoctorRepositoryError> {
        Ok(self.tables().doctors.get(id).cloned())
    }

    async fn find_by_profile(
        &self,
        profile_id: &ProfileId,
    ) -> Result<Option<Doctor>, DoctorRepositoryError> {
        Ok(self
            .tables()
            .doctors
            .values()
            .find(|doctor| doctor.profile_id() == profile_id)
            .cloned())
    }

    async fn find_listing(
        &self,
        id: &DoctorId,
    ) -> Result<Option<DoctorListing>, DoctorRepositoryError> {
        let tables = self.tables();
        Ok(tables
            .doctors
            .get(id)
            .and_then(|doctor| tables.listing(doctor)))
    }

    async fn list(
        &self,
        filter: &DoctorFilter,
    ) -> Result<Vec<DoctorListing>, DoctorRepositoryError> {
        let tables = self.tables();
        let mut listings: Vec<DoctorListing> = tables
            .doctors
            .values()
            .filter(|doctor| filter.accepts(doctor))
            .filter_map(|doctor| tables.listing(doctor))
            .collect();
        listings.sort_by(|a, b| {
            a.full_name
                .as_ref()
                .cmp(b.full_name.as_ref())
                .then_with(|| a.doctor.id().cmp(b.doctor.id()))
        });
        Ok(listings)
    }

    async fn update(&self, doctor: &Doctor) -> Result<(), DoctorRepositoryError> {
        if let Some(stored) = self.tables().doctors.get_mut(doctor.id()) {
            *stored = doctor.clone();
        }
        Ok(())
    }
}

#[async_trait]
impl ScheduleRepository for MemoryStore {
    async fn insert(&self, entry: &ScheduleEntry) -> Result<(), ScheduleRepositoryError> {
        let mut tables = self.tables();
        if tables.starts_clash(entry) {
            return Err(ScheduleRepositoryError::duplicate_entry(format!(
                "doctor {} day {} at {}",
                entry.doctor_id(),
                entry.day_of_week(),
                entry.start_time().format("%H:%M")
            )));
        }
        tables.schedule.insert(*entry.id(), entry.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &ScheduleEntryId,
    ) -> Result<Option<ScheduleEntry>, ScheduleRepositoryError> {
        Ok(self.tables().schedule.get(id).cloned())
    }

    async fn list_for_doctor(
        &self,
        doctor_id: &DoctorId,
        day: Option<DayOfWeek>,
    ) -> Result<Vec<ScheduleEntry>, ScheduleRepositoryError> {
        let mut entries: Vec<ScheduleEntry> = self
            .tables()
            .schedule
            .values()
            .filter(|entry| entry.doctor_id() == doctor_id)
            .filter(|entry| day.is_none_or(|wanted| entry.day_of_week() == wanted))
            .cloned()
            .collect();
        entries.sort_by_key(|entry| (entry.day_of_week(), entry.start_time()));
        Ok(entries)
    }

    async fn update(&self, entry: &ScheduleEntry) -> Result<(), ScheduleRepositoryError> {
        let mut tables = self.tables();
        if tables.starts_clash(entry) {
            return Err(ScheduleRepositoryError::duplicate_entry(format!(
                "doctor {} day {} at {}",
                entry.doctor_id(),
                entry.day_of_week(),
                entry.start_time().format("%H:%M")
            )));
        }
        if let Some(stored) = tables.schedule.get_mut(entry.id()) {
            *stored = entry.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: &ScheduleEntryId) -> Result<bool, ScheduleRepositoryError> {
        Ok(self.tables().schedule.remove(id).is_some())
    }
}

#[async_trait]
impl AppointmentRepository for MemoryStore {
    async fn insert(&self, appointment: &Appointment) -> Result<(), AppointmentRepositoryError> {
        let mut tables = self.tables();
        if appointment.status().blocks_slot() && tables.slot_is_taken(appointment) {
            return Err(AppointmentRepositoryError::slot_taken(format!(
                "doctor {} on {} at {}",
                appointment.doctor_id(),
                appointment.date(),
                appointment.time().format("%H:%M")
            )));
        }
        tables
            .appointments
            .insert(*appointment.id(), appointment.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &AppointmentId,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError> {
        Ok(self.tables().appointments.get(id).cloned())
    }

    async fn list(
        &self,
        scope: AppointmentScope,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Appointment>, AppointmentRepositoryError> {
        let mut appointments: Vec<Appointment> = self
            .tables()
            .appointments
            .values()
            .filter(|appointment| match scope {
                AppointmentScope::Patient(patient_id) => *appointment.patient_id() == patient_id,
                AppointmentScope::Doctor(doctor_id) => *appointment.doctor_id() == doctor_id,
                AppointmentScope::All => true,
            })
            .filter(|appointment| date.is_none_or(|wanted| appointment.date() == wanted))
            .cloned()
            .collect();
        appointments.sort_by_key(|appointment| {
            (appointment.date(), appointment.time(), appointment.created_at())
        });
        Ok(appointments)
    }

    async fn booked_times(
        &self,
        doctor_id: &DoctorId,
        date: NaiveDate,
    ) -> Result<Vec<NaiveTime>, AppointmentRepositoryError> {
        let mut times: Vec<NaiveTime> = self
            .tables()
            .appointments
            .values()
            .filter(|appointment| {
                appointment.doctor_id() == doctor_id
                    && appointment.date() == date
                    && appointment.status().blocks_slot()
            })
            .map(Appointment::time)
            .collect();
        times.sort_unstable();
        Ok(times)
    }

    async fn update_status(
        &self,
        appointment: &Appointment,
        expected: AppointmentStatus,
    ) -> Result<(), AppointmentRepositoryError> {
        let mut tables = self.tables();
        let current = tables
            .appointments
            .get(appointment.id())
            .map(Appointment::status);
        if current != Some(expected) {
            return Err(AppointmentRepositoryError::status_changed(expected.as_str()));
        }
        if appointment.status().blocks_slot() && tables.slot_is_taken(appointment) {
            return Err(AppointmentRepositoryError::slot_taken(format!(
                "doctor {} on {} at {}",
                appointment.doctor_id(),
                appointment.date(),
                appointment.time().format("%H:%M")
            )));
        }
        tables
            .appointments
            .insert(*appointment.id(), appointment.clone());
        Ok(())
    }

    async fn update_notes(
        &self,
        appointment: &Appointment,
    ) -> Result<(), AppointmentRepositoryError> {
        // Copy only the notes so a concurrent status change survives.
        if let Some(stored) = self.tables().appointments.get_mut(appointment.id()) {
            let at = appointment.updated_at();
            stored.set_note(NoteField::Patient, appointment.patient_notes().cloned(), at);
            stored.set_note(NoteField::Doctor, appointment.doctor_notes().cloned(), at);
            stored.set_note(NoteField::General, appointment.notes().cloned(), at);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
