//! Refines an opaque decryption failure into an actionable diagnosis.
//!
//! The cipher cannot tell wrong key, wrong IV, and corruption apart. This
//! module reconstructs the distinction from record timestamps: if the
//! owning vault's credential was rotated after the file was last
//! (re-)encrypted, the presented (current) secret is simply not the one
//! the ciphertext was written under. That case is recoverable by supplying
//! the original secret. Everything else is a bad key or corrupt data.

use coffer_store::{EncryptionType, FileRecord, MetadataStore};
use tracing::{debug, warn};

use crate::error::VaultError;

/// Classifies a decryption failure without touching stored state.
pub(crate) fn refine_decrypt_failure<M: MetadataStore + ?Sized>(
    meta: &M,
    file: &FileRecord,
) -> VaultError {
    if file.encryption_type == EncryptionType::Vault {
        if let Ok(vault) = meta.get_vault(file.vault_id) {
            if vault.updated_at > file.updated_at {
                debug!(
                    file_id = %file.id,
                    "vault credential rotated after file encryption; original secret required"
                );
                return VaultError::StaleVaultKey;
            }
        }
    }
    VaultError::BadKeyOrCorruptData
}

/// Classifies a decryption failure and, when it is not the expected
/// stale-vault-key case, flags the file for repair.
pub(crate) fn diagnose_and_flag<M: MetadataStore + ?Sized>(
    meta: &M,
    file: &FileRecord,
) -> VaultError {
    let refined = refine_decrypt_failure(meta, file);
    if matches!(refined, VaultError::BadKeyOrCorruptData) {
        if let Err(e) = meta.set_needs_repair(file.id, true) {
            warn!(file_id = %file.id, error = %e, "failed to flag file for repair");
        }
    }
    refined
}
