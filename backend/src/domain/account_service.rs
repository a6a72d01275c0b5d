//! Account service: sign-up and sign-in over the profile repository.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{AccountCommand, PasswordHasher, ProfileRepository};
use crate::domain::repository_errors::{map_hash_error, map_profile_error};
use crate::domain::{
    Error, LoginCredentials, Profile, ProfileDraft, ProfileId, SignUpRequest,
};

/// Service implementing [`AccountCommand`].
#[derive(Clone)]
pub struct AccountService<P, H> {
    profiles: Arc<P>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<P, H> AccountService<P, H> {
    /// Assemble the service from its store and hasher.
    pub fn new(profiles: Arc<P>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            profiles,
            hasher,
            clock,
        }
    }
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

#[async_trait]
impl<P, H> AccountCommand for AccountService<P, H>
where
    P: ProfileRepository,
    H: PasswordHasher,
{
    async fn sign_up(&self, request: SignUpRequest) -> Result<Profile, Error> {
        let SignUpRequest {
            email,
            password,
            full_name,
            role,
            phone,
        } = request;
        let digest = self.hasher.hash(&password).map_err(map_hash_error)?;
        let now = self.clock.utc();
        let profile = Profile::new(ProfileDraft {
            id: ProfileId::random(),
            email,
            full_name,
            role,
            phone,
            avatar_url: None,
            created_at: now,
            updated_at: now,
        });
        self.profiles
            .create(&profile, &digest)
            .await
            .map_err(map_profile_error)?;
        info!(profile_id = %profile.id(), role = %profile.role(), "profile created");
        Ok(profile)
    }

    async fn sign_in(&self, credentials: &LoginCredentials) -> Result<ProfileId, Error> {
        let Some(stored) = self
            .profiles
            .find_credential(credentials.email())
            .await
            .map_err(map_profile_error)?
        else {
            return Err(invalid_credentials());
        };
        let matches = self
            .hasher
            .verify(credentials.password(), &stored.digest)
            .map_err(map_hash_error)?;
        if !matches {
            return Err(invalid_credentials());
        }
        Ok(stored.profile_id)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
