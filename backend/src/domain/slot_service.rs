//! Slot service: feeds stored schedules and bookings into the generator.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate, NaiveDateTime};
use mockable::Clock;

use crate::domain::doctor_service::load_doctor;
use crate::domain::ports::{
    AppointmentRepository, DoctorRepository, ScheduleRepository, SlotQuery,
};
use crate::domain::repository_errors::{map_appointment_error, map_schedule_error};
use crate::domain::{
    Action, Actor, DayOfWeek, DoctorId, Error, Slot, authorize, generate_slots,
};

/// Clinic wall-clock derived from an injected UTC clock and a fixed offset.
#[derive(Clone)]
pub struct ClinicClock {
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl ClinicClock {
    /// Wrap `clock`, reading local time at `offset`.
    pub fn new(clock: Arc<dyn Clock>, offset: FixedOffset) -> Self {
        Self { clock, offset }
    }

    /// Current clinic-local date and time.
    pub fn now(&self) -> NaiveDateTime {
        self.clock.utc().with_timezone(&self.offset).naive_local()
    }

    /// Underlying UTC clock, used for record timestamps.
    pub fn utc_clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}

/// Service implementing [`SlotQuery`].
#[derive(Clone)]
pub struct SlotService<S, D, A> {
    schedules: Arc<S>,
    doctors: Arc<D>,
    appointments: Arc<A>,
    clock: ClinicClock,
}

impl<S, D, A> SlotService<S, D, A> {
    /// Assemble the service from its repositories and clock.
    pub fn new(
        schedules: Arc<S>,
        doctors: Arc<D>,
        appointments: Arc<A>,
        clock: ClinicClock,
    ) -> Self {
        Self {
            schedules,
            doctors,
            appointments,
            clock,
        }
    }
}

#[async_trait]
impl<S, D, A> SlotQuery for SlotService<S, D, A>
where
    S: ScheduleRepository,
    D: DoctorRepository,
    A: AppointmentRepository,
{
    async fn slots(
        &self,
        actor: &Actor,
        doctor_id: &DoctorId,
        date: NaiveDate,
    ) -> Result<Vec<Slot>, Error> {
        let doctor = load_doctor(self.doctors.as_ref(), doctor_id).await?;
        authorize(actor, Action::ViewDoctor { doctor: &doctor })?;

        let entries = self
            .schedules
            .list_for_doctor(doctor_id, Some(DayOfWeek::from_date(date)))
            .await
            .map_err(map_schedule_error)?;
        if entries.is_empty() {
            return Ok(Vec::new());
        }
        let booked: BTreeSet<_> = self
            .appointments
            .booked_times(doctor_id, date)
            .await
            .map_err(map_appointment_error)?
            .into_iter()
            .collect();
        Ok(generate_slots(&entries, &booked, date, self.clock.now()))
    }
}
