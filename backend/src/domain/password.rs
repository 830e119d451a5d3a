//! Argon2id password hashing.
//!
//! Hashes are stored as PHC strings so the parameters and salt travel with
//! the digest. Argon2 is CPU-bound, so both operations run on Tokio's
//! blocking pool rather than on the calling worker.

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use super::Error;

/// Hash `password` with a fresh random salt.
///
/// # Errors
/// Returns [`Error::internal`] when the hasher rejects its inputs or the
/// blocking task fails.
pub async fn hash_password(password: &str) -> Result<String, Error> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_now(&password))
        .await
        .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
}

/// Check `password` against a stored PHC string.
///
/// A malformed stored hash never verifies.
///
/// # Errors
/// Returns [`Error::internal`] when the blocking task fails.
pub async fn verify_password(password: &str, stored: &str) -> Result<bool, Error> {
    let password = password.to_owned();
    let stored = stored.to_owned();
    tokio::task::spawn_blocking(move || verify_now(&password, &stored))
        .await
        .map_err(|err| Error::internal(format!("password verification task failed: {err}")))
}

fn hash_now(password: &str) -> Result<String, Error> {
    let salt = SaltString::encode_b64(&rand::random::<[u8; 16]>())
        .map_err(|err| Error::internal(format!("failed to encode salt: {err}")))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| Error::internal(format!("failed to hash password: {err}")))
}

fn verify_now(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}
