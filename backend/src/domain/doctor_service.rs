//! Doctor service: directory reads, onboarding and doctor updates.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    DoctorCommand, DoctorQuery, DoctorRepository, NewDoctor, ProfileRepository,
};
use crate::domain::repository_errors::{map_doctor_error, map_profile_error};
use crate::domain::{
    Action, Actor, Doctor, DoctorChanges, DoctorDraft, DoctorFilter, DoctorId, DoctorListing,
    Error, Role, authorize,
};

/// Service implementing [`DoctorQuery`] and [`DoctorCommand`].
#[derive(Clone)]
pub struct DoctorService<D, P> {
    doctors: Arc<D>,
    profiles: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<D, P> DoctorService<D, P> {
    /// Assemble the service from its repositories and clock.
    pub fn new(doctors: Arc<D>, profiles: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self {
            doctors,
            profiles,
            clock,
        }
    }
}

/// Load a doctor or fail with `not_found`.
pub(crate) async fn load_doctor<D: DoctorRepository + ?Sized>(
    doctors: &D,
    id: &DoctorId,
) -> Result<Doctor, Error> {
    doctors
        .find_by_id(id)
        .await
        .map_err(map_doctor_error)?
        .ok_or_else(|| Error::not_found("doctor not found"))
}

#[async_trait]
impl<D, P> DoctorQuery for DoctorService<D, P>
where
    D: DoctorRepository,
    P: ProfileRepository,
{
    async fn list(&self, actor: &Actor, filter: DoctorFilter) -> Result<Vec<DoctorListing>, Error> {
        let mut listings = self
            .doctors
            .list(&filter)
            .await
            .map_err(map_doctor_error)?;
        listings.retain(|listing| {
            authorize(
                actor,
                Action::ViewDoctor {
                    doctor: &listing.doctor,
                },
            )
            .is_ok()
        });
        Ok(listings)
    }

    async fn get(&self, actor: &Actor, id: &DoctorId) -> Result<DoctorListing, Error> {
        let listing = self
            .doctors
            .find_listing(id)
            .await
            .map_err(map_doctor_error)?
            .ok_or_else(|| Error::not_found("doctor not found"))?;
        authorize(
            actor,
            Action::ViewDoctor {
                doctor: &listing.doctor,
            },
        )?;
        Ok(listing)
    }
}

#[async_trait]
impl<D, P> DoctorCommand for DoctorService<D, P>
where
    D: DoctorRepository,
    P: ProfileRepository,
{
    async fn register(&self, actor: &Actor, doctor: NewDoctor) -> Result<Doctor, Error> {
        let owner = self
            .profiles
            .find_by_id(&doctor.profile_id)
            .await
            .map_err(map_profile_error)?
            .ok_or_else(|| Error::not_found("profile not found"))?;
        authorize(
            actor,
            Action::RegisterDoctor {
                owner: owner.id(),
                owner_role: owner.role(),
            },
        )?;
        if owner.role() != Role::Doctor {
            return Err(Error::invalid_request(
                "doctor records require a profile with the doctor role",
            ));
        }

        let now = self.clock.utc();
        let NewDoctor {
            profile_id,
            specialization,
            experience_years,
            consultation_fee,
            qualification,
            bio,
            is_available,
        } = doctor;
        let record = Doctor::new(DoctorDraft {
            id: DoctorId::random(),
            profile_id,
            specialization,
            experience_years,
            consultation_fee,
            qualification,
            bio,
            is_verified: false,
            is_available,
            created_at: now,
            updated_at: now,
        });
        self.doctors
            .create(&record)
            .await
            .map_err(map_doctor_error)?;
        info!(doctor_id = %record.id(), profile_id = %record.profile_id(), "doctor registered");
        Ok(record)
    }

    async fn update(
        &self,
        actor: &Actor,
        id: &DoctorId,
        changes: DoctorChanges,
    ) -> Result<Doctor, Error> {
        let mut doctor = load_doctor(self.doctors.as_ref(), id).await?;
        authorize(
            actor,
            Action::UpdateDoctor {
                doctor: doctor.id(),
                changes_verification: changes.changes_verification(),
            },
        )?;
        doctor.apply(changes, self.clock.utc());
        self.doctors
            .update(&doctor)
            .await
            .map_err(map_doctor_error)?;
        info!(
            doctor_id = %doctor.id(),
            verified = doctor.is_verified(),
            available = doctor.is_available(),
            "doctor updated"
        );
        Ok(doctor)
    }
}
