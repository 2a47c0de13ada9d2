//! Password digests.
//!
//! Digests are argon2id PHC strings (`$argon2id$v=19$...`) carrying their own
//! salt and cost parameters, so verification needs nothing but the stored string.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// The hasher itself failed (entropy or resource exhaustion).
    #[error("password hashing failed: {0}")]
    HashingFailed(String),
    /// Wrong password or unreadable digest. The two are not distinguished.
    #[error("credential mismatch")]
    Mismatch,
}

/// Hash `plaintext` with a fresh random salt.
pub fn hash_password(plaintext: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::HashingFailed(e.to_string()))
}

/// Check `plaintext` against a stored digest.
pub fn verify_password(digest: &str, plaintext: &str) -> Result<(), CredentialError> {
    let parsed = PasswordHash::new(digest).map_err(|_| CredentialError::Mismatch)?;
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .map_err(|_| CredentialError::Mismatch)
}

/// [`hash_password`] on the blocking pool; argon2 is deliberately slow.
pub async fn hash_password_blocking(plaintext: String) -> Result<String, CredentialError> {
    tokio::task::spawn_blocking(move || hash_password(&plaintext))
        .await
        .map_err(|e| CredentialError::HashingFailed(e.to_string()))?
}

/// [`verify_password`] on the blocking pool.
///
/// A panicked or cancelled verification task counts as a mismatch.
pub async fn verify_password_blocking(
    digest: String,
    plaintext: String,
) -> Result<(), CredentialError> {
    tokio::task::spawn_blocking(move || verify_password(&digest, &plaintext))
        .await
        .map_err(|_| CredentialError::Mismatch)?
}
