//! PBKDF2-HMAC-SHA256 implementation of the password hasher port.
//!
//! Digests are encoded as `pbkdf2-sha256$<iterations>$<salt hex>$<hash hex>`
//! so the iteration count can be raised without invalidating stored
//! credentials.

use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHashError, PasswordHasher};
use crate::domain::{Password, PasswordDigest};

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// Iteration count used when none is configured.
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 600_000;

/// Salted PBKDF2 hasher with a configurable work factor.
#[derive(Debug, Clone, Copy)]
pub struct Pbkdf2PasswordHasher {
    iterations: u32,
}

impl Pbkdf2PasswordHasher {
    /// Build a hasher; an iteration count of zero is raised to one.
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    fn derive(password: &Password, salt: &[u8], iterations: u32) -> Zeroizing<[u8; HASH_LEN]> {
        let mut out = Zeroizing::new([0_u8; HASH_LEN]);
        pbkdf2::pbkdf2_hmac::<Sha256>(password.expose().as_bytes(), salt, iterations, &mut *out);
        out
    }
}

impl Default for Pbkdf2PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_PBKDF2_ITERATIONS)
    }
}

struct ParsedDigest {
    iterations: u32,
    salt: Vec<u8>,
    hash: Vec<u8>,
}

fn parse(digest: &PasswordDigest) -> Result<ParsedDigest, PasswordHashError> {
    let mut parts = digest.as_str().split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(hash), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(PasswordHashError::malformed("expected four `$`-separated fields"));
    };
    if scheme != SCHEME {
        return Err(PasswordHashError::malformed(format!(
            "unsupported scheme {scheme}"
        )));
    }
    let iterations = iterations
        .parse::<u32>()
        .ok()
        .filter(|count| *count > 0)
        .ok_or_else(|| PasswordHashError::malformed("iteration count is not a positive integer"))?;
    let salt = hex::decode(salt)
        .map_err(|err| PasswordHashError::malformed(format!("salt is not hex: {err}")))?;
    let hash = hex::decode(hash)
        .map_err(|err| PasswordHashError::malformed(format!("hash is not hex: {err}")))?;
    if hash.len() != HASH_LEN {
        return Err(PasswordHashError::malformed(format!(
            "hash must be {HASH_LEN} bytes"
        )));
    }
    Ok(ParsedDigest {
        iterations,
        salt,
        hash,
    })
}

impl PasswordHasher for Pbkdf2PasswordHasher {
    fn hash(&self, password: &Password) -> Result<PasswordDigest, PasswordHashError> {
        let mut salt = [0_u8; SALT_LEN];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|err| PasswordHashError::derivation(err.to_string()))?;
        let hash = Self::derive(password, &salt, self.iterations);
        Ok(PasswordDigest::from_encoded(format!(
            "{SCHEME}${}${}${}",
            self.iterations,
            hex::encode(salt),
            hex::encode(hash.as_slice())
        )))
    }

    fn verify(
        &self,
        password: &Password,
        digest: &PasswordDigest,
    ) -> Result<bool, PasswordHashError> {
        let parsed = parse(digest)?;
        let candidate = Self::derive(password, &parsed.salt, parsed.iterations);
        Ok(candidate.as_slice().ct_eq(parsed.hash.as_slice()).into())
    }
}
