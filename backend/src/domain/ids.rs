//! UUID-backed identifiers for the clinic aggregates.

use thiserror::Error;

/// Validation error raised when an identifier is not a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} must be a valid UUID")]
pub struct IdValidationError {
    /// Human-readable identifier kind, e.g. `"doctor id"`.
    pub kind: &'static str,
}

macro_rules! define_uuid_id {
    ($(#[$meta:meta])* $name:ident => $kind:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Parse an identifier from text, rejecting surrounding whitespace.
            pub fn new(raw: impl AsRef<str>) -> Result<Self, $crate::domain::IdValidationError> {
                let raw = raw.as_ref();
                if raw.trim() != raw {
                    return Err($crate::domain::IdValidationError { kind: $kind });
                }
                ::uuid::Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| $crate::domain::IdValidationError { kind: $kind })
            }

            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: ::uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Borrow the underlying UUID.
            pub fn as_uuid(&self) -> &::uuid::Uuid {
                &self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::domain::IdValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

pub(crate) use define_uuid_id;
