//! Appointment service: booking, role-scoped listings and lifecycle changes.
//!
//! Booking validates against the generated slots, then relies on the
//! repository's active-slot uniqueness for the race between two patients.
//! Status changes are compare-and-swap on the status that was read.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::domain::doctor_service::load_doctor;
use crate::domain::ports::{
    AppointmentCommand, AppointmentQuery, AppointmentRepository, AppointmentScope,
    BookingRequest, DoctorRepository, ProfileRepository, SlotQuery,
};
use crate::domain::repository_errors::{map_appointment_error, map_profile_error};
use crate::domain::{
    Action, Actor, Appointment, AppointmentId, AppointmentNotes, AppointmentStatus, ClinicClock,
    Error, NoteField, Role, authorize,
};

/// Service implementing [`AppointmentQuery`] and [`AppointmentCommand`].
#[derive(Clone)]
pub struct AppointmentService<A, D, P, Q> {
    appointments: Arc<A>,
    doctors: Arc<D>,
    profiles: Arc<P>,
    slots: Arc<Q>,
    clock: ClinicClock,
}

impl<A, D, P, Q> AppointmentService<A, D, P, Q> {
    /// Assemble the service from its repositories and clock.
    pub fn new(
        appointments: Arc<A>,
        doctors: Arc<D>,
        profiles: Arc<P>,
        slots: Arc<Q>,
        clock: ClinicClock,
    ) -> Self {
        Self {
            appointments,
            doctors,
            profiles,
            slots,
            clock,
        }
    }
}

impl<A, D, P, Q> AppointmentService<A, D, P, Q>
where
    A: AppointmentRepository,
    D: DoctorRepository,
    P: ProfileRepository,
    Q: SlotQuery,
{
    async fn load(&self, id: &AppointmentId) -> Result<Appointment, Error> {
        self.appointments
            .find_by_id(id)
            .await
            .map_err(map_appointment_error)?
            .ok_or_else(|| Error::not_found("appointment not found"))
    }

    /// Admins book on behalf of someone; that someone must be a patient.
    async fn ensure_patient(&self, actor: &Actor, request: &BookingRequest) -> Result<(), Error> {
        if actor.role == Role::Patient && actor.profile_id == request.patient_id {
            return Ok(());
        }
        let patient = self
            .profiles
            .find_by_id(&request.patient_id)
            .await
            .map_err(map_profile_error)?
            .ok_or_else(|| Error::not_found("patient not found"))?;
        if patient.role() != Role::Patient {
            return Err(Error::invalid_request(
                "appointments can only be booked for patients",
            ));
        }
        Ok(())
    }

    async fn ensure_slot_open(&self, actor: &Actor, request: &BookingRequest) -> Result<(), Error> {
        if request.date.and_time(request.time) < self.clock.now() {
            return Err(Error::invalid_request("cannot book a slot in the past"));
        }
        let slots = self
            .slots
            .slots(actor, &request.doctor_id, request.date)
            .await?;
        let matching: Vec<_> = slots
            .iter()
            .filter(|slot| slot.time == request.time)
            .collect();
        if matching.iter().any(|slot| slot.available) {
            Ok(())
        } else if matching.is_empty() {
            Err(Error::invalid_request(
                "requested time is not one of the doctor's slots",
            ))
        } else {
            Err(Error::conflict("failed to book appointment"))
        }
    }
}

#[async_trait]
impl<A, D, P, Q> AppointmentQuery for AppointmentService<A, D, P, Q>
where
    A: AppointmentRepository,
    D: DoctorRepository,
    P: ProfileRepository,
    Q: SlotQuery,
{
    async fn list(
        &self,
        actor: &Actor,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Appointment>, Error> {
        let scope = match (actor.role, actor.doctor_id) {
            (Role::Admin, _) => AppointmentScope::All,
            (Role::Doctor, Some(doctor_id)) => {
                authorize(actor, Action::ListDoctorAppointments { doctor: &doctor_id })?;
                AppointmentScope::Doctor(doctor_id)
            }
            (Role::Doctor, None) => return Ok(Vec::new()),
            (Role::Patient, _) => {
                authorize(
                    actor,
                    Action::ListPatientAppointments {
                        patient: &actor.profile_id,
                    },
                )?;
                AppointmentScope::Patient(actor.profile_id)
            }
        };
        self.appointments
            .list(scope, date)
            .await
            .map_err(map_appointment_error)
    }

    async fn get(&self, actor: &Actor, id: &AppointmentId) -> Result<Appointment, Error> {
        let appointment = self.load(id).await?;
        authorize(
            actor,
            Action::ReadAppointment {
                appointment: &appointment,
            },
        )?;
        Ok(appointment)
    }
}

#[async_trait]
impl<A, D, P, Q> AppointmentCommand for AppointmentService<A, D, P, Q>
where
    A: AppointmentRepository,
    D: DoctorRepository,
    P: ProfileRepository,
    Q: SlotQuery,
{
    async fn book(&self, actor: &Actor, request: BookingRequest) -> Result<Appointment, Error> {
        authorize(
            actor,
            Action::BookAppointment {
                patient: &request.patient_id,
            },
        )?;
        self.ensure_patient(actor, &request).await?;

        let doctor = load_doctor(self.doctors.as_ref(), &request.doctor_id).await?;
        authorize(actor, Action::ViewDoctor { doctor: &doctor })?;
        if !doctor.is_discoverable() {
            return Err(Error::invalid_request(
                "doctor is not accepting appointments",
            ));
        }
        self.ensure_slot_open(actor, &request).await?;

        let BookingRequest {
            patient_id,
            doctor_id,
            date,
            time,
            notes,
        } = request;
        let appointment = Appointment::book(
            patient_id,
            doctor_id,
            date,
            time,
            notes,
            self.clock.utc_clock().utc(),
        );
        self.appointments
            .insert(&appointment)
            .await
            .map_err(|err| {
                debug!(error = %err, "appointment insert rejected");
                map_appointment_error(err)
            })?;
        info!(
            appointment_id = %appointment.id(),
            doctor_id = %doctor_id,
            %date,
            %time,
            "appointment booked"
        );
        Ok(appointment)
    }

    async fn change_status(
        &self,
        actor: &Actor,
        id: &AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Appointment, Error> {
        let mut appointment = self.load(id).await?;
        authorize(
            actor,
            Action::ReadAppointment {
                appointment: &appointment,
            },
        )?;
        let expected = appointment.status();
        if !expected.can_transition_to(status) {
            return Err(Error::conflict(format!(
                "cannot move appointment from {expected} to {status}"
            )));
        }
        authorize(
            actor,
            Action::TransitionAppointment {
                appointment: &appointment,
                to: status,
            },
        )?;
        appointment
            .transition(status, self.clock.utc_clock().utc())
            .map_err(|err| Error::conflict(err.to_string()))?;
        self.appointments
            .update_status(&appointment, expected)
            .await
            .map_err(map_appointment_error)?;
        info!(
            appointment_id = %appointment.id(),
            from = %expected,
            to = %status,
            "appointment status changed"
        );
        Ok(appointment)
    }

    async fn edit_notes(
        &self,
        actor: &Actor,
        id: &AppointmentId,
        field: NoteField,
        notes: Option<AppointmentNotes>,
    ) -> Result<Appointment, Error> {
        let mut appointment = self.load(id).await?;
        authorize(
            actor,
            Action::EditNotes {
                appointment: &appointment,
                field,
            },
        )?;
        appointment.set_note(field, notes, self.clock.utc_clock().utc());
        self.appointments
            .update_notes(&appointment)
            .await
            .map_err(map_appointment_error)?;
        Ok(appointment)
    }
}

#[cfg(test)]
#[path = "appointment_service_tests.rs"]
mod tests;
