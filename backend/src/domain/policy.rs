//! Access policy: which actor may perform which action on which record.
//!
//! Every service calls [`authorize`] before touching a repository. The
//! function is pure so the whole role matrix is testable in isolation.

use thiserror::Error;

use super::{
    Appointment, AppointmentStatus, Doctor, DoctorId, Error, NoteField, ProfileId, Role,
};

/// Authenticated caller as seen by the policy layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Profile bound to the session.
    pub profile_id: ProfileId,
    /// Role read from that profile.
    pub role: Role,
    /// Present when the caller owns a doctor record.
    pub doctor_id: Option<DoctorId>,
}

impl Actor {
    /// Admins bypass every ownership check.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    fn owns_doctor(&self, doctor_id: &DoctorId) -> bool {
        self.doctor_id.as_ref() == Some(doctor_id)
    }

    fn is_patient_of(&self, appointment: &Appointment) -> bool {
        &self.profile_id == appointment.patient_id()
    }

    fn is_doctor_of(&self, appointment: &Appointment) -> bool {
        self.owns_doctor(appointment.doctor_id())
    }
}

/// Operation an actor is attempting.
#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    /// Read a profile with the given owner and role.
    ReadProfile { owner: &'a ProfileId, role: Role },
    /// Update a profile, possibly including its role.
    UpdateProfile { owner: &'a ProfileId, changes_role: bool },
    /// List every profile.
    ListProfiles,
    /// Read a doctor record.
    ViewDoctor { doctor: &'a Doctor },
    /// Create the doctor record for `owner`.
    RegisterDoctor { owner: &'a ProfileId, owner_role: Role },
    /// Update a doctor record, possibly including verification.
    UpdateDoctor { doctor: &'a DoctorId, changes_verification: bool },
    /// Add, change or remove schedule entries.
    ManageSchedule { doctor: &'a DoctorId },
    /// Read one appointment.
    ReadAppointment { appointment: &'a Appointment },
    /// List a patient's appointments.
    ListPatientAppointments { patient: &'a ProfileId },
    /// List a doctor's appointments.
    ListDoctorAppointments { doctor: &'a DoctorId },
    /// Book an appointment for `patient`.
    BookAppointment { patient: &'a ProfileId },
    /// Move an appointment to `to`.
    TransitionAppointment { appointment: &'a Appointment, to: AppointmentStatus },
    /// Edit one of the appointment's note fields.
    EditNotes { appointment: &'a Appointment, field: NoteField },
}

/// Reason an action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolicyDenial {
    /// The caller may know the record exists but may not act on it.
    #[error("{0}")]
    Forbidden(&'static str),
    /// The caller must not learn that the record exists.
    #[error("{0} not found")]
    Concealed(&'static str),
}

impl From<PolicyDenial> for Error {
    fn from(denial: PolicyDenial) -> Self {
        match denial {
            PolicyDenial::Forbidden(_) => Self::forbidden(denial.to_string()),
            PolicyDenial::Concealed(_) => Self::not_found(denial.to_string()),
        }
    }
}

fn allow_if(condition: bool, denial: PolicyDenial) -> Result<(), PolicyDenial> {
    if condition { Ok(()) } else { Err(denial) }
}

/// Decide whether `actor` may perform `action`.
///
/// Admins pass every check; state-machine legality of a transition is
/// checked separately by the aggregate.
pub fn authorize(actor: &Actor, action: Action<'_>) -> Result<(), PolicyDenial> {
    if actor.is_admin() {
        return Ok(());
    }
    match action {
        Action::ReadProfile { owner, role } => allow_if(
            &actor.profile_id == owner || role == Role::Doctor,
            PolicyDenial::Concealed("profile"),
        ),
        Action::UpdateProfile {
            owner,
            changes_role,
        } => {
            allow_if(
                &actor.profile_id == owner,
                PolicyDenial::Forbidden("cannot modify another profile"),
            )?;
            allow_if(
                !changes_role,
                PolicyDenial::Forbidden("only an admin may change roles"),
            )
        }
        Action::ListProfiles => Err(PolicyDenial::Forbidden("admin access required")),
        Action::ViewDoctor { doctor } => allow_if(
            doctor.is_discoverable() || actor.owns_doctor(doctor.id()),
            PolicyDenial::Concealed("doctor"),
        ),
        Action::RegisterDoctor { owner, owner_role } => allow_if(
            &actor.profile_id == owner && owner_role == Role::Doctor,
            PolicyDenial::Forbidden("only doctors may register a doctor record"),
        ),
        Action::UpdateDoctor {
            doctor,
            changes_verification,
        } => {
            allow_if(
                actor.owns_doctor(doctor),
                PolicyDenial::Forbidden("cannot modify another doctor"),
            )?;
            allow_if(
                !changes_verification,
                PolicyDenial::Forbidden("only an admin may verify doctors"),
            )
        }
        Action::ManageSchedule { doctor } => allow_if(
            actor.owns_doctor(doctor),
            PolicyDenial::Forbidden("cannot manage another doctor's schedule"),
        ),
        Action::ReadAppointment { appointment } => allow_if(
            actor.is_patient_of(appointment) || actor.is_doctor_of(appointment),
            PolicyDenial::Concealed("appointment"),
        ),
        Action::ListPatientAppointments { patient } => allow_if(
            &actor.profile_id == patient,
            PolicyDenial::Forbidden("cannot list another patient's appointments"),
        ),
        Action::ListDoctorAppointments { doctor } => allow_if(
            actor.owns_doctor(doctor),
            PolicyDenial::Forbidden("cannot list another doctor's appointments"),
        ),
        Action::BookAppointment { patient } => allow_if(
            actor.role == Role::Patient && &actor.profile_id == patient,
            PolicyDenial::Forbidden("only patients may book for themselves"),
        ),
        Action::TransitionAppointment { appointment, to } => {
            authorize_transition(actor, appointment, to)
        }
        Action::EditNotes { appointment, field } => {
            authorize(actor, Action::ReadAppointment { appointment })?;
            let allowed = match field {
                NoteField::Patient => actor.is_patient_of(appointment),
                NoteField::Doctor | NoteField::General => actor.is_doctor_of(appointment),
            };
            allow_if(allowed, PolicyDenial::Forbidden("cannot edit these notes"))
        }
    }
}

fn authorize_transition(
    actor: &Actor,
    appointment: &Appointment,
    to: AppointmentStatus,
) -> Result<(), PolicyDenial> {
    authorize(actor, Action::ReadAppointment { appointment })?;
    let from = appointment.status();
    let allowed = if actor.is_doctor_of(appointment) {
        matches!(
            (from, to),
            (
                AppointmentStatus::Pending,
                AppointmentStatus::Confirmed | AppointmentStatus::Cancelled
            ) | (
                AppointmentStatus::Confirmed,
                AppointmentStatus::Completed | AppointmentStatus::Cancelled
            )
        )
    } else {
        from == AppointmentStatus::Pending && to == AppointmentStatus::Cancelled
    };
    allow_if(
        allowed,
        PolicyDenial::Forbidden("not permitted to make this status change"),
    )
}

#[cfg(test)]
mod tests {
    //! Role matrix coverage.
    use super::*;
    use crate::domain::{ConsultationFee, DoctorDraft, Specialization};
    use chrono::{NaiveDate, NaiveTime, Utc};
    use rstest::{fixture, rstest};
    use AppointmentStatus::{Cancelled, Completed, Confirmed, Pending};

    struct World {
        patient: Actor,
        other_patient: Actor,
        doctor: Actor,
        other_doctor: Actor,
        admin: Actor,
        appointment: Appointment,
    }

    fn actor(role: Role, doctor_id: Option<DoctorId>) -> Actor {
        Actor {
            profile_id: ProfileId::random(),
            role,
            doctor_id,
        }
    }

    fn doctor_record(id: DoctorId, owner: ProfileId, verified: bool) -> Doctor {
        let now = Utc::now();
        Doctor::new(DoctorDraft {
            id,
            profile_id: owner,
            specialization: Specialization::new("General practice").expect("label"),
            experience_years: 3,
            consultation_fee: ConsultationFee::from_minor_units(2_500),
            qualification: None,
            bio: None,
            is_verified: verified,
            is_available: true,
            created_at: now,
            updated_at: now,
        })
    }

    #[fixture]
    fn world() -> World {
        let patient = actor(Role::Patient, None);
        let doctor = actor(Role::Doctor, Some(DoctorId::random()));
        let appointment = Appointment::book(
            patient.profile_id,
            doctor.doctor_id.expect("doctor id"),
            NaiveDate::from_ymd_opt(2030, 1, 7).expect("date"),
            NaiveTime::from_hms_opt(9, 0, 0).expect("time"),
            None,
            Utc::now(),
        );
        World {
            patient,
            other_patient: actor(Role::Patient, None),
            doctor,
            other_doctor: actor(Role::Doctor, Some(DoctorId::random())),
            admin: actor(Role::Admin, None),
            appointment,
        }
    }

    fn with_status(mut appointment: Appointment, status: AppointmentStatus) -> Appointment {
        if status == Confirmed || status == Completed {
            appointment.transition(Confirmed, Utc::now()).expect("confirm");
        }
        if status == Completed {
            appointment.transition(Completed, Utc::now()).expect("complete");
        }
        if status == Cancelled {
            appointment.transition(Cancelled, Utc::now()).expect("cancel");
        }
        appointment
    }

    #[rstest]
    fn outsiders_cannot_read_appointments_and_learn_nothing(world: World) {
        let action = Action::ReadAppointment {
            appointment: &world.appointment,
        };
        assert_eq!(
            authorize(&world.other_patient, action),
            Err(PolicyDenial::Concealed("appointment"))
        );
        assert!(authorize(&world.other_doctor, action).is_err());
        assert!(authorize(&world.patient, action).is_ok());
        assert!(authorize(&world.doctor, action).is_ok());
        assert!(authorize(&world.admin, action).is_ok());
    }

    #[rstest]
    #[case(Pending, Cancelled, true)]
    #[case(Pending, Confirmed, false)]
    #[case(Confirmed, Cancelled, false)]
    #[case(Confirmed, Completed, false)]
    fn patient_transitions(
        world: World,
        #[case] from: AppointmentStatus,
        #[case] to: AppointmentStatus,
        #[case] allowed: bool,
    ) {
        let appointment = with_status(world.appointment, from);
        let result = authorize(
            &world.patient,
            Action::TransitionAppointment {
                appointment: &appointment,
                to,
            },
        );
        assert_eq!(result.is_ok(), allowed);
    }

    #[rstest]
    #[case(Pending, Confirmed, true)]
    #[case(Pending, Cancelled, true)]
    #[case(Confirmed, Completed, true)]
    #[case(Confirmed, Cancelled, true)]
    #[case(Pending, Completed, false)]
    #[case(Cancelled, Confirmed, false)]
    fn doctor_transitions(
        world: World,
        #[case] from: AppointmentStatus,
        #[case] to: AppointmentStatus,
        #[case] allowed: bool,
    ) {
        let appointment = with_status(world.appointment, from);
        let result = authorize(
            &world.doctor,
            Action::TransitionAppointment {
                appointment: &appointment,
                to,
            },
        );
        assert_eq!(result.is_ok(), allowed);
    }

    #[rstest]
    fn other_doctor_cannot_confirm(world: World) {
        let result = authorize(
            &world.other_doctor,
            Action::TransitionAppointment {
                appointment: &world.appointment,
                to: Confirmed,
            },
        );
        assert_eq!(result, Err(PolicyDenial::Concealed("appointment")));
    }

    #[rstest]
    fn booking_is_for_self_or_by_admin(world: World) {
        let target = world.patient.profile_id;
        let action = Action::BookAppointment { patient: &target };
        assert!(authorize(&world.patient, action).is_ok());
        assert!(authorize(&world.admin, action).is_ok());
        assert!(authorize(&world.other_patient, action).is_err());
        assert!(authorize(&world.doctor, action).is_err());
    }

    #[rstest]
    fn unverified_doctor_is_hidden_from_patients(world: World) {
        let doctor_id = world.doctor.doctor_id.expect("doctor id");
        let record = doctor_record(doctor_id, world.doctor.profile_id, false);
        let action = Action::ViewDoctor { doctor: &record };
        assert_eq!(
            authorize(&world.patient, action),
            Err(PolicyDenial::Concealed("doctor"))
        );
        assert!(authorize(&world.doctor, action).is_ok());
        assert!(authorize(&world.admin, action).is_ok());
    }

    #[rstest]
    fn verification_flag_is_admin_only(world: World) {
        let doctor_id = world.doctor.doctor_id.expect("doctor id");
        let action = Action::UpdateDoctor {
            doctor: &doctor_id,
            changes_verification: true,
        };
        assert!(authorize(&world.doctor, action).is_err());
        assert!(authorize(&world.admin, action).is_ok());
    }

    #[rstest]
    fn role_change_is_admin_only(world: World) {
        let owner = world.patient.profile_id;
        let plain = Action::UpdateProfile {
            owner: &owner,
            changes_role: false,
        };
        let role_change = Action::UpdateProfile {
            owner: &owner,
            changes_role: true,
        };
        assert!(authorize(&world.patient, plain).is_ok());
        assert!(authorize(&world.patient, role_change).is_err());
        assert!(authorize(&world.other_patient, plain).is_err());
        assert!(authorize(&world.admin, role_change).is_ok());
    }

    #[rstest]
    fn doctor_profiles_are_public(world: World) {
        let owner = world.doctor.profile_id;
        let action = Action::ReadProfile {
            owner: &owner,
            role: Role::Doctor,
        };
        assert!(authorize(&world.patient, action).is_ok());
        let patient_owner = world.patient.profile_id;
        let hidden = Action::ReadProfile {
            owner: &patient_owner,
            role: Role::Patient,
        };
        assert!(authorize(&world.other_patient, hidden).is_err());
    }

    #[rstest]
    #[case(NoteField::Patient, true, false)]
    #[case(NoteField::Doctor, false, true)]
    #[case(NoteField::General, false, true)]
    fn note_ownership(
        world: World,
        #[case] field: NoteField,
        #[case] patient_may: bool,
        #[case] doctor_may: bool,
    ) {
        let action = Action::EditNotes {
            appointment: &world.appointment,
            field,
        };
        assert_eq!(authorize(&world.patient, action).is_ok(), patient_may);
        assert_eq!(authorize(&world.doctor, action).is_ok(), doctor_may);
        assert!(authorize(&world.admin, action).is_ok());
    }

    #[rstest]
    fn schedule_and_listing_scopes(world: World) {
        let doctor_id = world.doctor.doctor_id.expect("doctor id");
        let patient_id = world.patient.profile_id;
        assert!(authorize(&world.doctor, Action::ManageSchedule { doctor: &doctor_id }).is_ok());
        assert!(
            authorize(&world.other_doctor, Action::ManageSchedule { doctor: &doctor_id }).is_err()
        );
        assert!(
            authorize(
                &world.doctor,
                Action::ListDoctorAppointments { doctor: &doctor_id }
            )
            .is_ok()
        );
        assert!(
            authorize(
                &world.other_patient,
                Action::ListPatientAppointments {
                    patient: &patient_id
                }
            )
            .is_err()
        );
        assert!(authorize(&world.patient, Action::ListProfiles).is_err());
        assert!(authorize(&world.admin, Action::ListProfiles).is_ok());
    }

    #[rstest]
    fn denial_maps_to_domain_error() {
        let forbidden: Error = PolicyDenial::Forbidden("nope").into();
        assert_eq!(forbidden.code(), crate::domain::ErrorCode::Forbidden);
        let concealed: Error = PolicyDenial::Concealed("appointment").into();
        assert_eq!(concealed.code(), crate::domain::ErrorCode::NotFound);
        assert_eq!(concealed.message(), "appointment not found");
    }
}
