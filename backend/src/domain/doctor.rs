//! Doctor aggregate: the practice-specific extension of a doctor profile.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::ids::define_uuid_id;
use super::{AvatarUrl, FullName, ProfileId};

define_uuid_id! {
    /// Stable doctor identifier (distinct from the owning profile id).
    DoctorId => "doctor id"
}

/// Maximum length of specialization and qualification labels.
pub const LABEL_MAX: usize = 100;
/// Maximum length of a doctor biography.
pub const BIO_MAX: usize = 2000;
/// Upper bound on years of experience accepted from callers.
pub const EXPERIENCE_YEARS_MAX: u16 = 80;

/// Validation errors for doctor fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DoctorValidationError {
    #[error("specialization must not be empty")]
    EmptySpecialization,
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("experience years must be between 0 and {max}")]
    ExperienceOutOfRange { max: u16 },
    #[error("consultation fee must not be negative")]
    NegativeFee,
}

/// Medical specialization used for directory filtering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Specialization(String);

impl Specialization {
    /// Validate a specialization label.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, DoctorValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DoctorValidationError::EmptySpecialization);
        }
        if trimmed.chars().count() > LABEL_MAX {
            return Err(DoctorValidationError::TooLong {
                field: "specialization",
                max: LABEL_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Case-insensitive comparison used by the directory filter.
    pub fn matches(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl AsRef<str> for Specialization {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Consultation fee in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct ConsultationFee(u32);

impl ConsultationFee {
    /// Build a fee from minor units.
    pub const fn from_minor_units(value: u32) -> Self {
        Self(value)
    }

    /// Validate a signed amount as it arrives from JSON or SQL.
    pub fn try_from_i64(value: i64) -> Result<Self, DoctorValidationError> {
        u32::try_from(value)
            .map(Self)
            .map_err(|_| DoctorValidationError::NegativeFee)
    }

    pub const fn minor_units(self) -> u32 {
        self.0
    }
}

fn bounded_text(
    raw: Option<String>,
    field: &'static str,
    max: usize,
) -> Result<Option<String>, DoctorValidationError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > max {
        return Err(DoctorValidationError::TooLong { field, max });
    }
    Ok(Some(trimmed.to_owned()))
}

/// Optional free-text qualification line (e.g. "MBBS, MD").
pub fn qualification(raw: Option<String>) -> Result<Option<String>, DoctorValidationError> {
    bounded_text(raw, "qualification", LABEL_MAX)
}

/// Optional biography.
pub fn bio(raw: Option<String>) -> Result<Option<String>, DoctorValidationError> {
    bounded_text(raw, "bio", BIO_MAX)
}

/// Validate years of experience.
pub fn experience_years(value: i64) -> Result<u16, DoctorValidationError> {
    u16::try_from(value)
        .ok()
        .filter(|years| *years <= EXPERIENCE_YEARS_MAX)
        .ok_or(DoctorValidationError::ExperienceOutOfRange {
            max: EXPERIENCE_YEARS_MAX,
        })
}

/// Doctor record.
///
/// ## Invariants
/// - Exactly one doctor record per profile (enforced by storage).
/// - The owning profile has role `doctor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctor {
    id: DoctorId,
    profile_id: ProfileId,
    specialization: Specialization,
    experience_years: u16,
    consultation_fee: ConsultationFee,
    qualification: Option<String>,
    bio: Option<String>,
    is_verified: bool,
    is_available: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Field bundle used to build a [`Doctor`].
#[derive(Debug, Clone)]
pub struct DoctorDraft {
    pub id: DoctorId,
    pub profile_id: ProfileId,
    pub specialization: Specialization,
    pub experience_years: u16,
    pub consultation_fee: ConsultationFee,
    pub qualification: Option<String>,
    pub bio: Option<String>,
    pub is_verified: bool,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Doctor {
    /// Build a doctor record from validated parts.
    pub fn new(draft: DoctorDraft) -> Self {
        let DoctorDraft {
            id,
            profile_id,
            specialization,
            experience_years,
            consultation_fee,
            qualification,
            bio,
            is_verified,
            is_available,
            created_at,
            updated_at,
        } = draft;
        Self {
            id,
            profile_id,
            specialization,
            experience_years,
            consultation_fee,
            qualification,
            bio,
            is_verified,
            is_available,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &DoctorId {
        &self.id
    }

    pub fn profile_id(&self) -> &ProfileId {
        &self.profile_id
    }

    pub fn specialization(&self) -> &Specialization {
        &self.specialization
    }

    pub fn experience_years(&self) -> u16 {
        self.experience_years
    }

    pub fn consultation_fee(&self) -> ConsultationFee {
        self.consultation_fee
    }

    pub fn qualification(&self) -> Option<&str> {
        self.qualification.as_deref()
    }

    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    pub fn is_verified(&self) -> bool {
        self.is_verified
    }

    pub fn is_available(&self) -> bool {
        self.is_available
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Patients only see doctors that are both verified and available.
    pub fn is_discoverable(&self) -> bool {
        self.is_verified && self.is_available
    }

    /// Apply a set of changes, stamping `updated_at`.
    pub fn apply(&mut self, changes: DoctorChanges, at: DateTime<Utc>) {
        let DoctorChanges {
            specialization,
            experience_years,
            consultation_fee,
            qualification,
            bio,
            is_verified,
            is_available,
        } = changes;
        if let Some(value) = specialization {
            self.specialization = value;
        }
        if let Some(value) = experience_years {
            self.experience_years = value;
        }
        if let Some(value) = consultation_fee {
            self.consultation_fee = value;
        }
        if let Some(value) = qualification {
            self.qualification = value;
        }
        if let Some(value) = bio {
            self.bio = value;
        }
        if let Some(value) = is_verified {
            self.is_verified = value;
        }
        if let Some(value) = is_available {
            self.is_available = value;
        }
        self.updated_at = at;
    }
}

/// Partial doctor update. `Some(None)` clears an optional text field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctorChanges {
    pub specialization: Option<Specialization>,
    pub experience_years: Option<u16>,
    pub consultation_fee: Option<ConsultationFee>,
    pub qualification: Option<Option<String>>,
    pub bio: Option<Option<String>>,
    pub is_verified: Option<bool>,
    pub is_available: Option<bool>,
}

impl DoctorChanges {
    /// Whether the update touches the admin-only verification flag.
    pub fn changes_verification(&self) -> bool {
        self.is_verified.is_some()
    }
}

/// Directory entry: a doctor joined with the public parts of its profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorListing {
    pub doctor: Doctor,
    pub full_name: FullName,
    pub avatar_url: Option<AvatarUrl>,
}

/// Directory filter supplied by callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctorFilter {
    /// Restrict to one specialization (case-insensitive).
    pub specialization: Option<Specialization>,
    /// Restrict to discoverable doctors (verified and available).
    pub discoverable_only: bool,
}

impl DoctorFilter {
    /// Whether a doctor satisfies the filter.
    pub fn accepts(&self, doctor: &Doctor) -> bool {
        let specialization_ok = self
            .specialization
            .as_ref()
            .is_none_or(|wanted| wanted.matches(doctor.specialization()));
        specialization_ok && (!self.discoverable_only || doctor.is_discoverable())
    }
}
