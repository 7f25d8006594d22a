use anyhow::{Result, anyhow};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::config::AuthConfig;

/// Work factor of the password hash.
#[derive(Debug, Clone, Copy)]
pub struct HashCost {
    pub memory_kib: u32,
    pub iterations: u32,
}

impl From<&AuthConfig> for HashCost {
    fn from(auth: &AuthConfig) -> Self {
        Self {
            memory_kib: auth.hash_memory_kib,
            iterations: auth.hash_iterations,
        }
    }
}

/// Hash a plaintext password with Argon2id and a fresh random salt, returning a PHC string.
pub fn hash_password(password: &str, cost: HashCost) -> Result<String> {
    let params = Params::new(cost.memory_kib, cost.iterations, Params::DEFAULT_P_COST, None)
        .map_err(|e| anyhow!("invalid hash parameters: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("{e}"))?;
    Ok(hash.to_string())
}

/// Check a plaintext password against a stored PHC string.
///
/// Returns `Ok(false)` on mismatch and `Err` only when the stored value is not a parseable hash.
pub fn verify_password(password: &str, stored: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| anyhow!("stored hash is malformed: {e}"))?;
    // Cost parameters are read from the PHC string itself.
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Returns true if `value` is already an Argon2 PHC hash and must not be hashed again.
pub fn is_password_hash(value: &str) -> bool {
    PasswordHash::new(value)
        .map(|h| h.algorithm.as_str().starts_with("argon2") && h.hash.is_some())
        .unwrap_or(false)
}

/// Hash `value` unless it is already a recognized hash.
pub fn hash_if_plaintext(value: &str, cost: HashCost) -> Result<String> {
    if is_password_hash(value) {
        Ok(value.to_string())
    } else {
        hash_password(value, cost)
    }
}
