//! Credential hashing for tally.
//!
//! Salted one-way password hashing (Argon2id) plus verification. The
//! persistence layer routes every user create and password update through
//! [`hash_password`]; the login handler calls [`verify_password`]. Nothing
//! else touches plaintext credentials, and stored values are always PHC
//! hash strings.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    /// The caller handed over an empty plaintext. Upstream field validation
    /// should make this unreachable.
    #[error("credential plaintext is empty")]
    EmptyPlaintext,
    /// The stored value is not a parseable hash string.
    #[error("stored credential is not a valid hash")]
    Malformed,
    #[error("hashing failed: {0}")]
    Hash(argon2::password_hash::Error),
}

/// Work factor: the RFC 9106 interactive profile (19 MiB, 2 passes, 1 lane).
/// Spelled out rather than relying on whatever the crate defaults to.
fn hasher() -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::DEFAULT)
}

/// Hash `plaintext` with a fresh random salt. Output embeds the algorithm,
/// parameters, and salt, so [`verify_password`] needs no side channel.
pub fn hash_password(plaintext: &str) -> Result<String, CredentialError> {
    if plaintext.is_empty() {
        return Err(CredentialError::EmptyPlaintext);
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(CredentialError::Hash)?;

    Ok(hash.to_string())
}

/// True iff `plaintext` is the input that produced `stored`.
pub fn verify_password(plaintext: &str, stored: &str) -> Result<bool, CredentialError> {
    if plaintext.is_empty() {
        return Err(CredentialError::EmptyPlaintext);
    }

    let parsed = PasswordHash::new(stored).map_err(|_| CredentialError::Malformed)?;

    match hasher().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CredentialError::Hash(e)),
    }
}
