//! Driving port for doctor onboarding and updates.

use async_trait::async_trait;

use crate::domain::{
    Actor, ConsultationFee, Doctor, DoctorChanges, DoctorId, Error, ProfileId, Specialization,
};

/// Payload for registering a doctor record against a doctor profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDoctor {
    pub profile_id: ProfileId,
    pub specialization: Specialization,
    pub experience_years: u16,
    pub consultation_fee: ConsultationFee,
    pub qualification: Option<String>,
    pub bio: Option<String>,
    pub is_available: bool,
}

/// Domain use-case port for mutating doctor records.
#[async_trait]
pub trait DoctorCommand: Send + Sync {
    /// Create the doctor record for a profile whose role is `doctor`.
    /// New records start unverified.
    async fn register(&self, actor: &Actor, doctor: NewDoctor) -> Result<Doctor, Error>;

    /// Apply `changes` to a doctor record.
    async fn update(
        &self,
        actor: &Actor,
        id: &DoctorId,
        changes: DoctorChanges,
    ) -> Result<Doctor, Error>;
}
