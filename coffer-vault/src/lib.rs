//! Vault and file key lifecycle engine for Coffer.
//!
//! Orchestrates the cipher primitive and key verifier from `coffer-crypto`
//! over the storage collaborators from `coffer-store`:
//!
//! - vault credential lifecycle: creation and credential-only rotation
//!   ([`create_vault`], [`rotate_vault_credential`]);
//! - per-file encryption lifecycle: upload, read, re-upload, and the
//!   download → decrypt → re-encrypt → upload → commit rotation protocol
//!   ([`upload_file`], [`read_file`], [`rotate_file_key`]);
//! - failure diagnosis that refines an opaque decryption failure into
//!   stale-vault-key vs. bad-key-or-corruption using record timestamps.
//!
//! Everything here is synchronous and pure given its inputs plus the
//! collaborator state. No secret or derived key outlives the call that
//! received it. Callers own per-file serialization: at most one mutating
//! operation may be in flight per file at a time (a rotation treats its
//! file as single-writer for the whole protocol).

mod diagnose;
mod error;
mod file_keys;
mod vault_keys;

pub use error::{VaultError, VaultResult};
pub use file_keys::{
    delete_file, read_file, reupload_file, rotate_file_key, upload_file, RotationOutcome,
    RotationTarget,
};
pub use vault_keys::{create_vault, delete_vault, rotate_vault_credential, VaultRotation};

/// Minimum length for any secret that backs a new credential.
pub const MIN_SECRET_LEN: usize = 8;

/// Policy gate for secrets about to be hashed into a credential. Runs
/// before any cryptography.
pub(crate) fn check_new_secret(secret: &str) -> VaultResult<()> {
    if secret.chars().count() < MIN_SECRET_LEN {
        return Err(VaultError::WeakSecret);
    }
    Ok(())
}

/// Presented secrets only need to be non-empty; strength was enforced when
/// the credential was created.
pub(crate) fn check_presented_secret(secret: &str) -> VaultResult<()> {
    if secret.is_empty() {
        return Err(VaultError::InvalidCredential);
    }
    Ok(())
}
