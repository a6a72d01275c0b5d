//! Authentication primitives: passwords, sign-up requests and credentials.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

use super::{EmailAddress, FullName, PhoneNumber, ProfileValidationError, Role};

/// Minimum accepted password length, in characters.
pub const PASSWORD_MIN: usize = 8;
/// Maximum accepted password length, in characters.
pub const PASSWORD_MAX: usize = 128;

/// Domain error returned when sign-up or sign-in payloads are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthValidationError {
    /// Password length outside the accepted range.
    PasswordLength { min: usize, max: usize },
    /// Password was blank.
    EmptyPassword,
    /// Self-service sign-up asked for the admin role.
    AdminSignUp,
    /// A profile field failed validation.
    Profile(ProfileValidationError),
}

impl fmt::Display for AuthValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PasswordLength { min, max } => {
                write!(f, "password must be between {min} and {max} characters")
            }
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::AdminSignUp => write!(f, "the admin role cannot be self-assigned"),
            Self::Profile(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for AuthValidationError {}

impl From<ProfileValidationError> for AuthValidationError {
    fn from(err: ProfileValidationError) -> Self {
        Self::Profile(err)
    }
}

/// Plain-text password held in memory that is wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Accept a new password, enforcing the length policy.
    pub fn new(raw: &str) -> Result<Self, AuthValidationError> {
        let length = raw.chars().count();
        if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&length) {
            return Err(AuthValidationError::PasswordLength {
                min: PASSWORD_MIN,
                max: PASSWORD_MAX,
            });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Accept a password presented at sign-in. The length policy applies
    /// to new passwords only.
    fn presented(raw: &str) -> Result<Self, AuthValidationError> {
        if raw.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Validated self-service account creation request.
///
/// ## Invariants
/// - `role` is never [`Role::Admin`].
/// - `password` satisfies the length policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    pub email: EmailAddress,
    pub password: Password,
    pub full_name: FullName,
    pub role: Role,
    pub phone: Option<PhoneNumber>,
}

impl SignUpRequest {
    /// Validate raw sign-up inputs.
    ///
    /// # Examples
    /// ```
    /// use clinic_backend::domain::{Role, SignUpRequest};
    ///
    /// let request = SignUpRequest::try_from_parts(
    ///     "Ada@Example.com",
    ///     "correct horse",
    ///     "Ada Lovelace",
    ///     Role::Patient,
    ///     None,
    /// )
    /// .unwrap();
    /// assert_eq!(request.email.as_ref(), "ada@example.com");
    /// ```
    pub fn try_from_parts(
        email: &str,
        password: &str,
        full_name: &str,
        role: Role,
        phone: Option<&str>,
    ) -> Result<Self, AuthValidationError> {
        if role == Role::Admin {
            return Err(AuthValidationError::AdminSignUp);
        }
        Ok(Self {
            email: EmailAddress::new(email)?,
            password: Password::new(password)?,
            full_name: FullName::new(full_name)?,
            role,
            phone: phone
                .filter(|raw| !raw.trim().is_empty())
                .map(PhoneNumber::new)
                .transpose()?,
        })
    }
}

/// Validated sign-in credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Password,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AuthValidationError> {
        Ok(Self {
            email: EmailAddress::new(email)?,
            password: Password::presented(password)?,
        })
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Opaque encoded password digest as produced by a
/// [`PasswordHasher`](super::ports::PasswordHasher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}
