//! Profile aggregate: the identity record behind every account.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::define_uuid_id;

define_uuid_id! {
    /// Stable profile identifier.
    ProfileId => "profile id"
}

/// Validation errors returned by profile value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileValidationError {
    EmptyEmail,
    InvalidEmail,
    EmptyFullName,
    FullNameTooLong { max: usize },
    InvalidPhone,
    InvalidAvatarUrl,
    UnknownRole(String),
}

impl fmt::Display for ProfileValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmptyFullName => write!(f, "full name must not be empty"),
            Self::FullNameTooLong { max } => {
                write!(f, "full name must be at most {max} characters")
            }
            Self::InvalidPhone => write!(
                f,
                "phone must contain 7 to 20 digits, spaces, dashes, parentheses or a leading +",
            ),
            Self::InvalidAvatarUrl => write!(f, "avatar url must be an http(s) URL"),
            Self::UnknownRole(raw) => {
                write!(f, "role must be patient, doctor or admin (got {raw})")
            }
        }
    }
}

impl std::error::Error for ProfileValidationError {}

/// Account role driving every authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Books and manages their own appointments.
    Patient,
    /// Owns a doctor record, schedule and incoming appointments.
    Doctor,
    /// Full access to every record.
    Admin,
}

impl Role {
    /// Canonical lower-case name, as stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Doctor => "doctor",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ProfileValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "patient" => Ok(Self::Patient),
            "doctor" => Ok(Self::Doctor),
            "admin" => Ok(Self::Admin),
            other => Err(ProfileValidationError::UnknownRole(other.to_owned())),
        }
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        Regex::new(r"^\+?[0-9 ()\-]{7,20}$")
            .unwrap_or_else(|error| panic!("phone regex failed to compile: {error}"))
    })
}

/// Normalised (trimmed, lower-case) email address. Unique per profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an email address.
    ///
    /// # Examples
    /// ```
    /// use clinic_backend::domain::EmailAddress;
    ///
    /// let email = EmailAddress::new("  Ada@Example.COM ").unwrap();
    /// assert_eq!(email.as_ref(), "ada@example.com");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ProfileValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(ProfileValidationError::EmptyEmail);
        }
        if !email_regex().is_match(&normalised) {
            return Err(ProfileValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = ProfileValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum length of a full name, in characters.
pub const FULL_NAME_MAX: usize = 100;

/// Display name shown on dashboards and in the doctor directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FullName(String);

impl FullName {
    /// Validate a full name; surrounding whitespace is trimmed.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ProfileValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ProfileValidationError::EmptyFullName);
        }
        if trimmed.chars().count() > FULL_NAME_MAX {
            return Err(ProfileValidationError::FullNameTooLong { max: FULL_NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for FullName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<FullName> for String {
    fn from(value: FullName) -> Self {
        value.0
    }
}

impl TryFrom<String> for FullName {
    type Error = ProfileValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Contact phone number in a loose international format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validate a phone number.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ProfileValidationError> {
        let trimmed = raw.as_ref().trim();
        if !phone_regex().is_match(trimmed) {
            return Err(ProfileValidationError::InvalidPhone);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = ProfileValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

const AVATAR_URL_MAX: usize = 2048;

/// Link to an externally hosted avatar image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AvatarUrl(String);

impl AvatarUrl {
    /// Validate an avatar URL; only `http` and `https` links are accepted.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ProfileValidationError> {
        let trimmed = raw.as_ref().trim();
        let has_scheme = trimmed.starts_with("https://") || trimmed.starts_with("http://");
        if !has_scheme || trimmed.len() > AVATAR_URL_MAX || trimmed.contains(char::is_whitespace)
        {
            return Err(ProfileValidationError::InvalidAvatarUrl);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for AvatarUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<AvatarUrl> for String {
    fn from(value: AvatarUrl) -> Self {
        value.0
    }
}

impl TryFrom<String> for AvatarUrl {
    type Error = ProfileValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Account identity record.
///
/// ## Invariants
/// - `email` is normalised and unique across profiles (enforced by storage).
/// - `role` only changes through an admin-authorised update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    id: ProfileId,
    email: EmailAddress,
    full_name: FullName,
    role: Role,
    phone: Option<PhoneNumber>,
    avatar_url: Option<AvatarUrl>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Field bundle used to build a [`Profile`].
#[derive(Debug, Clone)]
pub struct ProfileDraft {
    pub id: ProfileId,
    pub email: EmailAddress,
    pub full_name: FullName,
    pub role: Role,
    pub phone: Option<PhoneNumber>,
    pub avatar_url: Option<AvatarUrl>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Build a profile from validated parts.
    pub fn new(draft: ProfileDraft) -> Self {
        let ProfileDraft {
            id,
            email,
            full_name,
            role,
            phone,
            avatar_url,
            created_at,
            updated_at,
        } = draft;
        Self {
            id,
            email,
            full_name,
            role,
            phone,
            avatar_url,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &ProfileId {
        &self.id
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn full_name(&self) -> &FullName {
        &self.full_name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn phone(&self) -> Option<&PhoneNumber> {
        self.phone.as_ref()
    }

    pub fn avatar_url(&self) -> Option<&AvatarUrl> {
        self.avatar_url.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Apply a set of changes, stamping `updated_at`.
    pub fn apply(&mut self, changes: ProfileChanges, at: DateTime<Utc>) {
        let ProfileChanges {
            full_name,
            role,
            phone,
            avatar_url,
        } = changes;
        if let Some(full_name) = full_name {
            self.full_name = full_name;
        }
        if let Some(role) = role {
            self.role = role;
        }
        if let Some(phone) = phone {
            self.phone = phone;
        }
        if let Some(avatar_url) = avatar_url {
            self.avatar_url = avatar_url;
        }
        self.updated_at = at;
    }
}

/// Partial profile update. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub full_name: Option<FullName>,
    pub role: Option<Role>,
    pub phone: Option<Option<PhoneNumber>>,
    pub avatar_url: Option<Option<AvatarUrl>>,
}

impl ProfileChanges {
    /// Whether the update touches the role field.
    pub fn changes_role(&self) -> bool {
        self.role.is_some()
    }
}

#[cfg(test)]
mod tests {
    //! Validation coverage for profile value types.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", ProfileValidationError::EmptyEmail)]
    #[case("   ", ProfileValidationError::EmptyEmail)]
    #[case("no-at-sign", ProfileValidationError::InvalidEmail)]
    #[case("a@b", ProfileValidationError::InvalidEmail)]
    #[case("a b@example.com", ProfileValidationError::InvalidEmail)]
    fn email_rejects_invalid_input(#[case] raw: &str, #[case] expected: ProfileValidationError) {
        assert_eq!(EmailAddress::new(raw), Err(expected));
    }

    #[rstest]
    fn full_name_rejects_overlong_input() {
        let raw = "x".repeat(FULL_NAME_MAX + 1);
        assert_eq!(
            FullName::new(raw),
            Err(ProfileValidationError::FullNameTooLong { max: FULL_NAME_MAX })
        );
    }

    #[rstest]
    #[case("+44 20 7946 0958", true)]
    #[case("(555) 123-4567", true)]
    #[case("12", false)]
    #[case("call me", false)]
    fn phone_validation(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(PhoneNumber::new(raw).is_ok(), valid);
    }

    #[rstest]
    #[case("https://cdn.example.com/a.png", true)]
    #[case("ftp://example.com/a.png", false)]
    #[case("https://exa mple.com", false)]
    fn avatar_url_validation(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(AvatarUrl::new(raw).is_ok(), valid);
    }

    #[rstest]
    #[case(Role::Patient)]
    #[case(Role::Doctor)]
    #[case(Role::Admin)]
    fn role_round_trips_through_text(#[case] role: Role) {
        assert_eq!(role.as_str().parse::<Role>(), Ok(role));
    }

    #[rstest]
    fn unknown_role_is_rejected() {
        assert_eq!(
            "nurse".parse::<Role>(),
            Err(ProfileValidationError::UnknownRole("nurse".to_owned()))
        );
    }

    #[rstest]
    fn apply_clears_optional_fields_and_stamps_update() {
        let created = Utc::now();
        let mut profile = Profile::new(ProfileDraft {
            id: ProfileId::random(),
            email: EmailAddress::new("p@example.com").expect("email"),
            full_name: FullName::new("Pat Patient").expect("name"),
            role: Role::Patient,
            phone: Some(PhoneNumber::new("+1 555 0100").expect("phone")),
            avatar_url: None,
            created_at: created,
            updated_at: created,
        });
        let later = created + chrono::Duration::minutes(5);
        profile.apply(
            ProfileChanges {
                phone: Some(None),
                ..ProfileChanges::default()
            },
            later,
        );
        assert!(profile.phone().is_none());
        assert_eq!(profile.updated_at(), later);
        assert_eq!(profile.full_name().as_ref(), "Pat Patient");
    }
}
