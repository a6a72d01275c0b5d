//! Driving port for slot availability.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Actor, DoctorId, Error, Slot};

/// Domain use-case port for slot generation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SlotQuery: Send + Sync {
    /// Bookable slots for a doctor on `date`, ascending by time.
    async fn slots(&self, actor: &Actor, doctor_id: &DoctorId, date: NaiveDate)
    -> Result<Vec<Slot>, Error>;
}
