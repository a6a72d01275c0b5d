//! Port for password digest creation and verification.

use crate::domain::{Password, PasswordDigest};

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHashError {
        /// The stored digest could not be decoded.
        Malformed { message: String } => "password digest is malformed: {message}",
        /// The key derivation failed.
        Derivation { message: String } => "password derivation failed: {message}",
    }
}

/// Port for one-way password digests.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Derive a salted digest for a new password.
    fn hash(&self, password: &Password) -> Result<PasswordDigest, PasswordHashError>;

    /// Check a presented password against a stored digest.
    fn verify(
        &self,
        password: &Password,
        digest: &PasswordDigest,
    ) -> Result<bool, PasswordHashError>;
}
