//! Driving port for reading weekly schedules.

use async_trait::async_trait;

use crate::domain::{Actor, DayOfWeek, DoctorId, Error, ScheduleEntry};

/// Domain use-case port for fetch-schedule.
#[async_trait]
pub trait ScheduleQuery: Send + Sync {
    /// List a doctor's entries, optionally for one weekday.
    async fn list(
        &self,
        actor: &Actor,
        doctor_id: &DoctorId,
        day: Option<DayOfWeek>,
    ) -> Result<Vec<ScheduleEntry>, Error>;
}
