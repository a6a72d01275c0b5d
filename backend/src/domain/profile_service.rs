//! Profile service: actor resolution, profile reads and updates.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{DoctorRepository, ProfileCommand, ProfileQuery, ProfileRepository};
use crate::domain::repository_errors::{map_doctor_error, map_profile_error};
use crate::domain::{
    Action, Actor, Error, Profile, ProfileChanges, ProfileId, Role, authorize,
};

/// Service implementing [`ProfileQuery`] and [`ProfileCommand`].
#[derive(Clone)]
pub struct ProfileService<P, D> {
    profiles: Arc<P>,
    doctors: Arc<D>,
    clock: Arc<dyn Clock>,
}

impl<P, D> ProfileService<P, D> {
    /// Assemble the service from its repositories and clock.
    pub fn new(profiles: Arc<P>, doctors: Arc<D>, clock: Arc<dyn Clock>) -> Self {
        Self {
            profiles,
            doctors,
            clock,
        }
    }
}

impl<P, D> ProfileService<P, D>
where
    P: ProfileRepository,
    D: DoctorRepository,
{
    async fn load(&self, id: &ProfileId) -> Result<Profile, Error> {
        self.profiles
            .find_by_id(id)
            .await
            .map_err(map_profile_error)?
            .ok_or_else(|| Error::not_found("profile not found"))
    }
}

#[async_trait]
impl<P, D> ProfileQuery for ProfileService<P, D>
where
    P: ProfileRepository,
    D: DoctorRepository,
{
    async fn resolve_actor(&self, profile_id: &ProfileId) -> Result<Actor, Error> {
        let profile = self
            .profiles
            .find_by_id(profile_id)
            .await
            .map_err(map_profile_error)?
            .ok_or_else(|| Error::unauthorized("session profile no longer exists"))?;
        let doctor_id = if profile.role() == Role::Doctor {
            self.doctors
                .find_by_profile(profile_id)
                .await
                .map_err(map_doctor_error)?
                .map(|doctor| *doctor.id())
        } else {
            None
        };
        Ok(Actor {
            profile_id: *profile_id,
            role: profile.role(),
            doctor_id,
        })
    }

    async fn get(&self, actor: &Actor, id: &ProfileId) -> Result<Profile, Error> {
        let profile = self.load(id).await?;
        authorize(
            actor,
            Action::ReadProfile {
                owner: profile.id(),
                role: profile.role(),
            },
        )?;
        Ok(profile)
    }

    async fn list(&self, actor: &Actor) -> Result<Vec<Profile>, Error> {
        authorize(actor, Action::ListProfiles)?;
        self.profiles.list().await.map_err(map_profile_error)
    }
}

#[async_trait]
impl<P, D> ProfileCommand for ProfileService<P, D>
where
    P: ProfileRepository,
    D: DoctorRepository,
{
    async fn update(
        &self,
        actor: &Actor,
        id: &ProfileId,
        changes: ProfileChanges,
    ) -> Result<Profile, Error> {
        let mut profile = self.load(id).await?;
        authorize(
            actor,
            Action::UpdateProfile {
                owner: profile.id(),
                changes_role: changes.changes_role(),
            },
        )?;
        profile.apply(changes, self.clock.utc());
        self.profiles
            .update(&profile)
            .await
            .map_err(map_profile_error)?;
        info!(profile_id = %profile.id(), actor = %actor.profile_id, "profile updated");
        Ok(profile)
    }
}
