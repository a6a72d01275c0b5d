//! Port abstraction for doctor record persistence.

use async_trait::async_trait;

use crate::domain::{Doctor, DoctorFilter, DoctorId, DoctorListing, ProfileId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by doctor repository adapters.
    pub enum DoctorRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "doctor repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "doctor repository query failed: {message}",
        /// The profile already owns a doctor record.
        DuplicateProfile { profile_id: String } =>
            "profile {profile_id} already has a doctor record",
    }
}

/// Port for doctor records and the public directory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DoctorRepository: Send + Sync {
    /// Insert a new doctor record.
    async fn create(&self, doctor: &Doctor) -> Result<(), DoctorRepositoryError>;

    /// Fetch a doctor by identifier.
    async fn find_by_id(&self, id: &DoctorId) -> Result<Option<Doctor>, DoctorRepositoryError>;

    /// Fetch the doctor record owned by a profile.
    async fn find_by_profile(
        &self,
        profile_id: &ProfileId,
    ) -> Result<Option<Doctor>, DoctorRepositoryError>;

    /// Fetch one directory entry.
    async fn find_listing(
        &self,
        id: &DoctorId,
    ) -> Result<Option<DoctorListing>, DoctorRepositoryError>;

    /// List directory entries matching `filter`, ordered by full name.
    async fn list(&self, filter: &DoctorFilter)
    -> Result<Vec<DoctorListing>, DoctorRepositoryError>;

    /// Persist the mutable fields of an existing doctor.
    async fn update(&self, doctor: &Doctor) -> Result<(), DoctorRepositoryError>;
}
