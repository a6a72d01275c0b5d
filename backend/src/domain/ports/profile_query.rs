//! Driving port for profile reads and session actor resolution.

use async_trait::async_trait;

use crate::domain::{Actor, Error, Profile, ProfileId};

/// Domain use-case port for reading profiles.
#[async_trait]
pub trait ProfileQuery: Send + Sync {
    /// Resolve the session's profile id into a policy [`Actor`].
    ///
    /// A profile that no longer exists yields `unauthorized`.
    async fn resolve_actor(&self, profile_id: &ProfileId) -> Result<Actor, Error>;

    /// Read one profile.
    async fn get(&self, actor: &Actor, id: &ProfileId) -> Result<Profile, Error>;

    /// List all profiles (admin only).
    async fn list(&self, actor: &Actor) -> Result<Vec<Profile>, Error>;
}
