//! Port abstraction for profile and credential persistence.

use async_trait::async_trait;

use crate::domain::{EmailAddress, PasswordDigest, Profile, ProfileId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by profile repository adapters.
    pub enum ProfileRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "profile repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "profile repository query failed: {message}",
        /// Another profile already uses this email address.
        DuplicateEmail { email: String } => "email {email} is already registered",
    }
}

/// Stored sign-in material for one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    pub profile_id: ProfileId,
    pub digest: PasswordDigest,
}

/// Port for reading and writing profiles together with their credentials.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Insert a new profile and its password digest atomically.
    ///
    /// Fails with [`ProfileRepositoryError::DuplicateEmail`] when the email
    /// is taken.
    async fn create(
        &self,
        profile: &Profile,
        digest: &PasswordDigest,
    ) -> Result<(), ProfileRepositoryError>;

    /// Fetch a profile by identifier.
    async fn find_by_id(&self, id: &ProfileId) -> Result<Option<Profile>, ProfileRepositoryError>;

    /// Fetch the credential registered for an email address.
    async fn find_credential(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredential>, ProfileRepositoryError>;

    /// Persist the mutable fields of an existing profile.
    async fn update(&self, profile: &Profile) -> Result<(), ProfileRepositoryError>;

    /// List every profile, oldest first.
    async fn list(&self) -> Result<Vec<Profile>, ProfileRepositoryError>;
}
