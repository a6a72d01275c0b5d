//! Driving port for profile updates.

use async_trait::async_trait;

use crate::domain::{Actor, Error, Profile, ProfileChanges, ProfileId};

/// Domain use-case port for mutating profiles.
#[async_trait]
pub trait ProfileCommand: Send + Sync {
    /// Apply `changes` to a profile. Role changes require an admin.
    async fn update(
        &self,
        actor: &Actor,
        id: &ProfileId,
        changes: ProfileChanges,
    ) -> Result<Profile, Error>;
}
