use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use rand::rngs::OsRng;

use crate::errors::{InnkeepError, Result};

pub fn password_hasher() -> Argon2<'static> {
    // Argon2id with low-latency parameters; login verifies on the hot path.
    const MEMORY_COST_KIB: u32 = 768;
    const ITERATIONS: u32 = 1;
    const PARALLELISM: u32 = 1;
    let params = Params::new(MEMORY_COST_KIB, ITERATIONS, PARALLELISM, Some(32))
        .unwrap_or_else(|_| Params::default());
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

/// Hash a password (or invite secret) into a PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    password_hasher()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| InnkeepError::internal(format!("Failed to hash password: {}", err)))
}

/// Verify a candidate against a stored PHC string.
///
/// A mismatch is `Ok(false)`; only an unparseable stored hash is an error.
pub fn verify_password(candidate: &str, stored: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|err| InnkeepError::internal(format!("Stored password hash invalid: {}", err)))?;
    Ok(password_hasher().verify_password(candidate.as_bytes(), &parsed).is_ok())
}
