//! Driving port for sign-up and sign-in.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, Profile, ProfileId, SignUpRequest};

/// Domain use-case port for account creation and authentication.
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create a profile and its password credential.
    async fn sign_up(&self, request: SignUpRequest) -> Result<Profile, Error>;

    /// Validate credentials and return the authenticated profile id.
    async fn sign_in(&self, credentials: &LoginCredentials) -> Result<ProfileId, Error>;
}
