//! Typed errors for the cipher primitive and key verifier.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// Padding or block validation failed. The cipher cannot tell a wrong
    /// key from a wrong IV from corrupted ciphertext; callers refine this
    /// with contextual metadata.
    #[error("decryption failed (wrong key, wrong IV, or corrupted ciphertext)")]
    Decryption,

    /// The at-rest IV encoding is structurally invalid. Must be exactly 32
    /// hex characters; never coerced.
    #[error("invalid IV: {0}")]
    InvalidIv(String),

    /// The OS RNG failed to produce bytes. Fatal: the operation aborts
    /// rather than ever substituting a predictable IV.
    #[error("system RNG failure: {0}")]
    Rng(String),

    /// Credential hashing or parameter construction failed.
    #[error("credential hashing failed: {0}")]
    Hashing(String),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
