use anyhow::anyhow;
use pbkdf2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::{Params, Pbkdf2};
use rand_core::OsRng;

use crate::AppError;

const OUTPUT_LENGTH: usize = 32;

/// Salted PBKDF2-HMAC-SHA256 hash in PHC string format (`$pbkdf2-sha256$...`).
pub fn hash_password(password: &str, rounds: u32) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let params = Params {
        rounds,
        output_length: OUTPUT_LENGTH,
    };
    let hash = Pbkdf2
        .hash_password_customized(password.as_bytes(), None, None, params, &salt)
        .map_err(|err| AppError::Internal(anyhow!("password hashing failed: {err}")))?;
    Ok(hash.to_string())
}

/// Rounds and salt are read back from the PHC string. Unparsable hashes never verify.
pub fn verify_password(password: &str, phc: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => Pbkdf2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Runs the hash on the blocking pool; PBKDF2 is slow on purpose.
pub async fn hash_password_blocking(password: String, rounds: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password, rounds))
        .await
        .map_err(|err| AppError::Internal(anyhow!("password hashing task failed: {err}")))?
}

pub async fn verify_password_blocking(password: String, phc: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &phc))
        .await
        .map_err(|err| AppError::Internal(anyhow!("password verify task failed: {err}")))
}
