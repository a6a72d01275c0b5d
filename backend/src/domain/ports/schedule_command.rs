//! Driving port for managing weekly schedules.

use async_trait::async_trait;

use crate::domain::{
    Actor, DayOfWeek, DoctorId, Error, ScheduleChanges, ScheduleEntry, ScheduleEntryId, TimeWindow,
};

/// Payload for a new weekly availability window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewScheduleEntry {
    pub day_of_week: DayOfWeek,
    pub window: TimeWindow,
    pub is_available: bool,
}

/// Domain use-case port for schedule mutations.
#[async_trait]
pub trait ScheduleCommand: Send + Sync {
    /// Add an entry. Overlapping another entry on the same day is a conflict.
    async fn add(
        &self,
        actor: &Actor,
        doctor_id: &DoctorId,
        entry: NewScheduleEntry,
    ) -> Result<ScheduleEntry, Error>;

    /// Edit an entry, re-checking the window and overlaps.
    async fn update(
        &self,
        actor: &Actor,
        id: &ScheduleEntryId,
        changes: ScheduleChanges,
    ) -> Result<ScheduleEntry, Error>;

    /// Remove an entry.
    async fn remove(&self, actor: &Actor, id: &ScheduleEntryId) -> Result<(), Error>;
}
