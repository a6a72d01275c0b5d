//! Driving port for the doctor directory.

use async_trait::async_trait;

use crate::domain::{Actor, DoctorFilter, DoctorId, DoctorListing, Error};

/// Domain use-case port for reading doctors.
#[async_trait]
pub trait DoctorQuery: Send + Sync {
    /// List doctors visible to `actor` that match `filter`.
    ///
    /// Patients only ever see discoverable doctors regardless of the
    /// filter's `discoverable_only` flag.
    async fn list(&self, actor: &Actor, filter: DoctorFilter) -> Result<Vec<DoctorListing>, Error>;

    /// Read one doctor.
    async fn get(&self, actor: &Actor, id: &DoctorId) -> Result<DoctorListing, Error>;
}
