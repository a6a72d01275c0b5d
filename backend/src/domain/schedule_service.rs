//! Schedule service: weekly availability management.
//!
//! Unlike the storage uniqueness on `(doctor, day, start)`, this service also
//! rejects entries whose windows overlap on the same weekday.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::doctor_service::load_doctor;
use crate::domain::ports::{
    DoctorRepository, NewScheduleEntry, ScheduleCommand, ScheduleQuery, ScheduleRepository,
};
use crate::domain::repository_errors::map_schedule_error;
use crate::domain::{
    Action, Actor, DayOfWeek, DoctorId, Error, ScheduleChanges, ScheduleEntry, ScheduleEntryId,
    authorize,
};

/// Service implementing [`ScheduleQuery`] and [`ScheduleCommand`].
#[derive(Clone)]
pub struct ScheduleService<S, D> {
    schedules: Arc<S>,
    doctors: Arc<D>,
}

impl<S, D> ScheduleService<S, D> {
    /// Assemble the service from the schedule and doctor repositories.
    pub fn new(schedules: Arc<S>, doctors: Arc<D>) -> Self {
        Self { schedules, doctors }
    }
}

impl<S, D> ScheduleService<S, D>
where
    S: ScheduleRepository,
    D: DoctorRepository,
{
    async fn load_entry(&self, id: &ScheduleEntryId) -> Result<ScheduleEntry, Error> {
        self.schedules
            .find_by_id(id)
            .await
            .map_err(map_schedule_error)?
            .ok_or_else(|| Error::not_found("schedule entry not found"))
    }

    async fn ensure_no_overlap(&self, candidate: &ScheduleEntry) -> Result<(), Error> {
        let siblings = self
            .schedules
            .list_for_doctor(candidate.doctor_id(), Some(candidate.day_of_week()))
            .await
            .map_err(map_schedule_error)?;
        if let Some(clash) = siblings.iter().find(|other| candidate.conflicts_with(other)) {
            return Err(Error::conflict("schedule entry overlaps an existing entry")
                .with_details(serde_json::json!({
                    "conflictingEntryId": clash.id(),
                    "startTime": clash.start_time().format("%H:%M").to_string(),
                    "endTime": clash.end_time().format("%H:%M").to_string(),
                })));
        }
        Ok(())
    }
}

#[async_trait]
impl<S, D> ScheduleQuery for ScheduleService<S, D>
where
    S: ScheduleRepository,
    D: DoctorRepository,
{
    async fn list(
        &self,
        actor: &Actor,
        doctor_id: &DoctorId,
        day: Option<DayOfWeek>,
    ) -> Result<Vec<ScheduleEntry>, Error> {
        let doctor = load_doctor(self.doctors.as_ref(), doctor_id).await?;
        authorize(actor, Action::ViewDoctor { doctor: &doctor })?;
        self.schedules
            .list_for_doctor(doctor_id, day)
            .await
            .map_err(map_schedule_error)
    }
}

#[async_trait]
impl<S, D> ScheduleCommand for ScheduleService<S, D>
where
    S: ScheduleRepository,
    D: DoctorRepository,
{
    async fn add(
        &self,
        actor: &Actor,
        doctor_id: &DoctorId,
        entry: NewScheduleEntry,
    ) -> Result<ScheduleEntry, Error> {
        let doctor = load_doctor(self.doctors.as_ref(), doctor_id).await?;
        authorize(actor, Action::ManageSchedule { doctor: doctor.id() })?;
        let candidate = ScheduleEntry::new(
            ScheduleEntryId::random(),
            *doctor.id(),
            entry.day_of_week,
            entry.window,
            entry.is_available,
        );
        self.ensure_no_overlap(&candidate).await?;
        self.schedules
            .insert(&candidate)
            .await
            .map_err(map_schedule_error)?;
        info!(entry_id = %candidate.id(), doctor_id = %doctor_id, "schedule entry added");
        Ok(candidate)
    }

    async fn update(
        &self,
        actor: &Actor,
        id: &ScheduleEntryId,
        changes: ScheduleChanges,
    ) -> Result<ScheduleEntry, Error> {
        let mut entry = self.load_entry(id).await?;
        authorize(
            actor,
            Action::ManageSchedule {
                doctor: entry.doctor_id(),
            },
        )?;
        entry
            .apply(changes)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.ensure_no_overlap(&entry).await?;
        self.schedules
            .update(&entry)
            .await
            .map_err(map_schedule_error)?;
        Ok(entry)
    }

    async fn remove(&self, actor: &Actor, id: &ScheduleEntryId) -> Result<(), Error> {
        let entry = self.load_entry(id).await?;
        authorize(
            actor,
            Action::ManageSchedule {
                doctor: entry.doctor_id(),
            },
        )?;
        let removed = self
            .schedules
            .delete(id)
            .await
            .map_err(map_schedule_error)?;
        if !removed {
            return Err(Error::not_found("schedule entry not found"));
        }
        info!(entry_id = %id, "schedule entry removed");
        Ok(())
    }
}
