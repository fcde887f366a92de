//! Failure taxonomy for vault and file key operations.
//!
//! Every variant maps 1:1 to a user-facing condition; nothing here ever
//! carries a raw secret or derived key.

use coffer_crypto::CryptoError;
use coffer_store::StoreError;
use thiserror::Error;

use crate::MIN_SECRET_LEN;

#[derive(Debug, Error)]
pub enum VaultError {
    /// New secret rejected by policy; no cryptography was run.
    #[error("secret too weak: must be at least {MIN_SECRET_LEN} characters")]
    WeakSecret,

    /// Presented secret does not verify against the governing credential.
    /// Deliberately detail-free to avoid oracle leaks.
    #[error("invalid key")]
    InvalidCredential,

    /// The stored IV is structurally malformed. The file is flagged for
    /// repair; only a re-upload recovers it.
    #[error("stored IV is malformed — file needs repair, please re-upload")]
    InvalidIv,

    /// The vault credential was rotated after this file was last
    /// (re-)encrypted. Expected and user-recoverable: the original vault
    /// secret, not the current one, decrypts this file.
    #[error("file was encrypted under a previous vault key — supply the original secret")]
    StaleVaultKey,

    /// Wrong key presented or ciphertext corrupted; indistinguishable at
    /// this level. The file is flagged for repair.
    #[error("invalid key or corrupted data — file flagged for repair")]
    BadKeyOrCorruptData,

    /// OS RNG failure. Fatal for the operation; never retried and never
    /// substituted with a predictable IV.
    #[error("system RNG failure: {0}")]
    Rng(String),

    /// Credential hashing failure (malformed parameters).
    #[error("credential hashing failed: {0}")]
    Hashing(String),

    /// Collaborator I/O failure, surfaced untouched so the caller can
    /// apply its own retry policy.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

pub type VaultResult<T> = Result<T, VaultError>;

/// Maps primitive errors that need no contextual refinement. Decryption
/// failures must never come through here — they go through the diagnosis
/// path instead.
pub(crate) fn map_crypto(e: CryptoError) -> VaultError {
    match e {
        CryptoError::Rng(msg) => VaultError::Rng(msg),
        CryptoError::Hashing(msg) => VaultError::Hashing(msg),
        CryptoError::InvalidIv(_) => VaultError::InvalidIv,
        CryptoError::Decryption => VaultError::BadKeyOrCorruptData,
    }
}
