//! Password hashing and verification using Argon2id.
//!
//! Stored passwords are PHC strings (`$argon2id$v=19$...`). [`PasswordHash`]
//! can only be obtained by hashing a plaintext or by parsing a well-formed PHC
//! string, so persistence code that accepts it cannot be handed a plaintext.
//!
//! Accounts created by earlier deployments hold bcrypt hashes (`$2b$10$...`).
//! Those are recognised as hashes, verified with bcrypt, and upgraded to
//! Argon2id after the next successful sign-in.

use std::fmt;

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use serde::Serialize;

/// Errors raised while hashing or parsing password hashes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    /// The stored value is not a PHC hash string.
    #[error("invalid hash format: {0}")]
    Malformed(String),
    /// The hashing primitive failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// A PHC-formatted password hash.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Parse a stored PHC string.
    pub fn parse(phc: impl Into<String>) -> Result<Self, PasswordError> {
        let phc = phc.into();
        argon2::PasswordHash::new(&phc)
            .map_err(|error| PasswordError::Malformed(error.to_string()))?;
        Ok(Self(phc))
    }

    /// PHC string form.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

/// How a stored password value is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredScheme {
    /// A PHC string this service can verify with Argon2.
    Phc,
    /// A legacy bcrypt hash.
    Bcrypt,
    /// Anything else, including plaintext.
    Unrecognised,
}

impl StoredScheme {
    /// Classify a stored password value.
    ///
    /// # Examples
    /// ```
    /// use dashboard::domain::StoredScheme;
    ///
    /// assert_eq!(
    ///     StoredScheme::of("$2b$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy"),
    ///     StoredScheme::Bcrypt,
    /// );
    /// assert_eq!(StoredScheme::of("123456"), StoredScheme::Unrecognised);
    /// ```
    pub fn of(stored: &str) -> Self {
        if BCRYPT_PREFIXES
            .iter()
            .any(|prefix| stored.starts_with(prefix))
        {
            Self::Bcrypt
        } else if argon2::PasswordHash::new(stored).is_ok() {
            Self::Phc
        } else {
            Self::Unrecognised
        }
    }

    /// Whether the value is a hash of either kind.
    pub const fn is_hash(self) -> bool {
        !matches!(self, Self::Unrecognised)
    }
}

/// Whether `stored` is already a password hash, PHC or bcrypt.
pub fn is_password_hash(stored: &str) -> bool {
    StoredScheme::of(stored).is_hash()
}

/// Hash `password` with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<PasswordHash, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| PasswordHash(hash.to_string()))
        .map_err(|error| PasswordError::Hashing(error.to_string()))
}

/// Verify a plaintext against a stored hash.
///
/// Returns `Ok(false)` on mismatch and an error only when the hash itself
/// cannot be processed.
pub fn verify_password(password: &str, hash: &PasswordHash) -> Result<bool, PasswordError> {
    let parsed = argon2::PasswordHash::new(hash.as_str())
        .map_err(|error| PasswordError::Malformed(error.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(error) => Err(PasswordError::Hashing(error.to_string())),
    }
}

/// Verify a plaintext against whatever hash is stored.
///
/// PHC strings go through Argon2, bcrypt hashes through bcrypt. A value that
/// is neither is reported as [`PasswordError::Malformed`]; it is never
/// compared as plaintext.
pub fn verify_stored_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    match StoredScheme::of(stored) {
        StoredScheme::Phc => verify_password(password, &PasswordHash::parse(stored)?),
        StoredScheme::Bcrypt => bcrypt::verify(password, stored)
            .map_err(|error| PasswordError::Malformed(error.to_string())),
        StoredScheme::Unrecognised => Err(PasswordError::Malformed(
            "stored value is not a password hash".to_owned(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn hash_then_verify() {
        let hash = hash_password("hunter22").expect("hash");
        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(verify_password("hunter22", &hash).expect("verify"));
        assert!(!verify_password("hunter23", &hash).expect("verify"));
    }

    #[rstest]
    fn salts_differ_between_hashes() {
        let first = hash_password("same-password").expect("hash");
        let second = hash_password("same-password").expect("hash");
        assert_ne!(first, second);
    }

    #[rstest]
    #[case("123456")]
    #[case("")]
    #[case("not a hash")]
    fn plaintext_is_not_a_hash(#[case] stored: &str) {
        assert!(!is_password_hash(stored));
        assert!(matches!(
            verify_stored_password(stored, stored),
            Err(PasswordError::Malformed(_))
        ));
        assert!(matches!(
            PasswordHash::parse(stored),
            Err(PasswordError::Malformed(_))
        ));
    }

    #[rstest]
    fn parse_accepts_generated_hash() {
        let hash = hash_password("secret").expect("hash");
        let parsed = PasswordHash::parse(hash.as_str()).expect("parse");
        assert_eq!(parsed, hash);
        assert_eq!(StoredScheme::of(hash.as_str()), StoredScheme::Phc);
        assert!(is_password_hash(hash.as_str()));
    }

    #[rstest]
    #[case("$2a$")]
    #[case("$2b$")]
    #[case("$2y$")]
    fn bcrypt_prefixes_are_hashes(#[case] prefix: &str) {
        let stored = format!("{prefix}10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy");
        assert_eq!(StoredScheme::of(&stored), StoredScheme::Bcrypt);
        assert!(is_password_hash(&stored));
    }

    #[rstest]
    fn bcrypt_hashes_verify() {
        let stored = bcrypt::hash("123456", 4).expect("bcrypt hash");
        assert_eq!(verify_stored_password("123456", &stored), Ok(true));
        assert_eq!(verify_stored_password("654321", &stored), Ok(false));
    }

    #[rstest]
    fn argon2_hashes_verify_through_the_same_entry_point() {
        let hash = hash_password("123456").expect("hash");
        assert_eq!(verify_stored_password("123456", hash.as_str()), Ok(true));
        assert_eq!(verify_stored_password("654321", hash.as_str()), Ok(false));
    }

    #[rstest]
    fn debug_does_not_leak_hash() {
        let hash = hash_password("secret").expect("hash");
        assert_eq!(format!("{hash:?}"), "PasswordHash(..)");
    }
}
