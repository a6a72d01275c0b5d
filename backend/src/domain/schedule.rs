//! Weekly schedule entries: recurring availability windows for a doctor.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveTime};
use thiserror::Error;

use super::DoctorId;
use super::ids::define_uuid_id;

define_uuid_id! {
    /// Stable schedule entry identifier.
    ScheduleEntryId => "schedule entry id"
}

/// Validation errors for schedule values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleValidationError {
    #[error("day of week must be between 0 (Sunday) and 6 (Saturday)")]
    DayOutOfRange,
    #[error("start time must be before end time")]
    EmptyWindow,
}

/// Day of the week where 0 is Sunday and 6 is Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    /// Validate a numeric weekday index.
    pub fn new(value: i64) -> Result<Self, ScheduleValidationError> {
        u8::try_from(value)
            .ok()
            .filter(|day| *day <= 6)
            .map(Self)
            .ok_or(ScheduleValidationError::DayOutOfRange)
    }

    /// Weekday of a calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        // num_days_from_sunday is always within 0..=6.
        Self(date.weekday().num_days_from_sunday() as u8)
    }

    pub const fn index(self) -> u8 {
        self.0
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Half-open `[start, end)` time range within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeWindow {
    /// Validate that `start` is strictly before `end`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ScheduleValidationError> {
        if start >= end {
            return Err(ScheduleValidationError::EmptyWindow);
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Whether two half-open windows share any instant.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Recurring weekly availability window for a doctor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    id: ScheduleEntryId,
    doctor_id: DoctorId,
    day_of_week: DayOfWeek,
    window: TimeWindow,
    is_available: bool,
}

impl ScheduleEntry {
    pub fn new(
        id: ScheduleEntryId,
        doctor_id: DoctorId,
        day_of_week: DayOfWeek,
        window: TimeWindow,
        is_available: bool,
    ) -> Self {
        Self {
            id,
            doctor_id,
            day_of_week,
            window,
            is_available,
        }
    }

    pub fn id(&self) -> &ScheduleEntryId {
        &self.id
    }

    pub fn doctor_id(&self) -> &DoctorId {
        &self.doctor_id
    }

    pub fn day_of_week(&self) -> DayOfWeek {
        self.day_of_week
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    pub fn start_time(&self) -> NaiveTime {
        self.window.start
    }

    pub fn end_time(&self) -> NaiveTime {
        self.window.end
    }

    pub fn is_available(&self) -> bool {
        self.is_available
    }

    /// Whether `other` is a different entry on the same day whose window
    /// intersects this one.
    pub fn conflicts_with(&self, other: &Self) -> bool {
        self.id != other.id
            && self.doctor_id == other.doctor_id
            && self.day_of_week == other.day_of_week
            && self.window.overlaps(&other.window)
    }

    /// Apply a partial update, re-validating the resulting window.
    pub fn apply(&mut self, changes: ScheduleChanges) -> Result<(), ScheduleValidationError> {
        let start = changes.start_time.unwrap_or(self.window.start);
        let end = changes.end_time.unwrap_or(self.window.end);
        let window = TimeWindow::new(start, end)?;
        if let Some(day) = changes.day_of_week {
            self.day_of_week = day;
        }
        if let Some(flag) = changes.is_available {
            self.is_available = flag;
        }
        self.window = window;
        Ok(())
    }
}

/// Partial update for a schedule entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleChanges {
    pub day_of_week: Option<DayOfWeek>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub is_available: Option<bool>,
}
