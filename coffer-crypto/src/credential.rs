//! One-way hashing and verification of presented secrets.
//!
//! A [`KeyCredential`] is a verification gate, not a decryption capability:
//! verifying a secret against a stored credential says nothing about which
//! ciphertext that secret can open. The cipher in [`crate::cipher`] is a
//! separate primitive on purpose.

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};

use crate::error::{CryptoError, CryptoResult};

/// A stored credential hash in PHC string format — algorithm id, parameters,
/// salt, and digest all embedded, opaque to callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCredential(String);

impl KeyCredential {
    pub fn new(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Argon2id cost parameters for credential hashing.
#[derive(Clone, Copy, Debug)]
pub struct HashParams {
    /// Memory cost in KiB.
    pub m_cost: u32,
    /// Number of iterations.
    pub t_cost: u32,
    /// Degree of parallelism.
    pub p_cost: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            m_cost: Params::DEFAULT_M_COST,
            t_cost: Params::DEFAULT_T_COST,
            p_cost: Params::DEFAULT_P_COST,
        }
    }
}

/// Hashes a secret into a storable credential with default cost parameters.
///
/// Non-deterministic by design: every call draws a fresh random salt, so
/// two credentials for the same secret differ yet both verify it.
pub fn hash_secret(secret: &str) -> CryptoResult<KeyCredential> {
    hash_secret_with_params(secret, &HashParams::default())
}

/// Hashes a secret with explicit cost parameters.
///
/// Verification reads parameters back out of the PHC string, so credentials
/// produced at any cost level verify interchangeably. Reduced costs are for
/// tests and latency-sensitive embedders.
pub fn hash_secret_with_params(
    secret: &str,
    params: &HashParams,
) -> CryptoResult<KeyCredential> {
    let argon2 = argon2_for(params)?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| CryptoError::Hashing(e.to_string()))?;
    Ok(KeyCredential(hash.to_string()))
}

/// True iff `secret` is the input that produced `credential`.
///
/// The digest comparison inside the library is constant-time. A malformed
/// credential verifies nothing.
pub fn verify_secret(secret: &str, credential: &KeyCredential) -> bool {
    let Ok(parsed) = PasswordHash::new(credential.as_str()) else {
        return false;
    };
    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok()
}

fn argon2_for(params: &HashParams) -> CryptoResult<Argon2<'static>> {
    let params = Params::new(params.m_cost, params.t_cost, params.p_cost, None)
        .map_err(|e| CryptoError::Hashing(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}
