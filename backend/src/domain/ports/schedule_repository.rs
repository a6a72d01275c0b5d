//! Port abstraction for weekly schedule persistence.

use async_trait::async_trait;

use crate::domain::{DayOfWeek, DoctorId, ScheduleEntry, ScheduleEntryId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by schedule repository adapters.
    pub enum ScheduleRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "schedule repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "schedule repository query failed: {message}",
        /// The doctor already has an entry starting at this day and time.
        DuplicateEntry { message: String } => "schedule entry already exists: {message}",
    }
}

/// Port for a doctor's recurring weekly availability.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// Insert a new entry. `(doctor, day, start)` must be unique.
    async fn insert(&self, entry: &ScheduleEntry) -> Result<(), ScheduleRepositoryError>;

    /// Fetch an entry by identifier.
    async fn find_by_id(
        &self,
        id: &ScheduleEntryId,
    ) -> Result<Option<ScheduleEntry>, ScheduleRepositoryError>;

    /// List a doctor's entries ordered by day then start time, optionally
    /// restricted to one weekday.
    async fn list_for_doctor(
        &self,
        doctor_id: &DoctorId,
        day: Option<DayOfWeek>,
    ) -> Result<Vec<ScheduleEntry>, ScheduleRepositoryError>;

    /// Persist an edited entry.
    async fn update(&self, entry: &ScheduleEntry) -> Result<(), ScheduleRepositoryError>;

    /// Remove an entry. Returns whether a row was deleted.
    async fn delete(&self, id: &ScheduleEntryId) -> Result<bool, ScheduleRepositoryError>;
}
