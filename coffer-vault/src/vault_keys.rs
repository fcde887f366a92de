//! Vault credential lifecycle: creation and credential-only rotation.
//!
//! Rotation replaces the verification credential and nothing else. Files
//! encrypted under a previous vault secret stay encrypted under it — the
//! raw key material used at encryption time is what decrypts them,
//! regardless of which credential is currently stored. The rotation result
//! carries the count of such files so the caller can warn the user.

use chrono::Utc;
use coffer_crypto::{hash_secret, verify_secret};
use coffer_store::{BlobStore, MetadataStore, VaultRecord};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{map_crypto, VaultError, VaultResult};
use crate::{check_new_secret, check_presented_secret};

/// Result of a vault credential rotation.
#[derive(Debug)]
pub struct VaultRotation {
    pub vault: VaultRecord,
    /// Files still encrypted under whichever vault secret was active at
    /// their upload time. They require that original secret to decrypt,
    /// not the new one.
    pub stale_files: u64,
}

/// Creates a vault with an initial key credential and no files.
pub fn create_vault<M: MetadataStore + ?Sized>(
    meta: &M,
    name: &str,
    secret: &str,
) -> VaultResult<VaultRecord> {
    check_new_secret(secret)?;
    let credential = hash_secret(secret).map_err(map_crypto)?;

    let now = Utc::now();
    let vault = VaultRecord {
        id: Uuid::new_v4(),
        name: name.to_string(),
        credential,
        files_count: 0,
        created_at: now,
        updated_at: now,
    };
    meta.insert_vault(vault.clone())?;
    debug!(vault_id = %vault.id, "created vault");
    Ok(vault)
}

/// Rotates a vault's key credential in place.
///
/// Verifies the current secret, enforces the strength policy on the new
/// one, persists the re-hashed credential and bumps `updated_at`. No file
/// ciphertext is touched: any vault-encrypted file remains tied to the
/// secret active at its upload time, and the returned `stale_files` count
/// must be surfaced to the user as a warning.
pub fn rotate_vault_credential<M: MetadataStore + ?Sized>(
    meta: &M,
    vault_id: Uuid,
    current_secret: &str,
    new_secret: &str,
) -> VaultResult<VaultRotation> {
    let vault = meta.get_vault(vault_id)?;
    check_presented_secret(current_secret)?;
    if !verify_secret(current_secret, &vault.credential) {
        return Err(VaultError::InvalidCredential);
    }
    check_new_secret(new_secret)?;

    let credential = hash_secret(new_secret).map_err(map_crypto)?;
    let rotated_at = Utc::now();
    meta.update_vault_credential(vault_id, credential, rotated_at)?;

    let stale_files = meta.count_vault_encrypted_files(vault_id)?;
    if stale_files > 0 {
        warn!(
            vault_id = %vault_id,
            stale_files,
            "vault credential rotated; existing vault-encrypted files still require their original secret"
        );
    } else {
        debug!(vault_id = %vault_id, "vault credential rotated");
    }

    Ok(VaultRotation {
        vault: meta.get_vault(vault_id)?,
        stale_files,
    })
}

/// Deletes a vault and all its files, gated by the vault credential.
pub fn delete_vault<B, M>(blob: &B, meta: &M, vault_id: Uuid, secret: &str) -> VaultResult<()>
where
    B: BlobStore + ?Sized,
    M: MetadataStore + ?Sized,
{
    let vault = meta.get_vault(vault_id)?;
    check_presented_secret(secret)?;
    if !verify_secret(secret, &vault.credential) {
        return Err(VaultError::InvalidCredential);
    }

    let files = meta.list_files(vault_id)?;
    for file in &files {
        // A missing blob is tolerable during teardown; everything else is
        // a real I/O failure and aborts.
        match blob.delete(&file.blob_path) {
            Ok(()) | Err(coffer_store::StoreError::BlobNotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }
    meta.delete_vault(vault_id)?;
    debug!(vault_id = %vault_id, files = files.len(), "deleted vault");
    Ok(())
}
