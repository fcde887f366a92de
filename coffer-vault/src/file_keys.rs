//! Per-file encryption lifecycle: upload, read, re-upload, key rotation.
//!
//! Rotation ordering guarantee: ciphertext is never overwritten without
//! first decrypting the prior ciphertext with the prior secret. A rotation
//! that was never verified against real plaintext cannot destroy data.

use chrono::Utc;
use coffer_crypto::{decrypt, encrypt, hash_secret, verify_secret, CryptoError, Iv};
use coffer_store::{
    BlobStore, EncryptionType, FileKeyRecord, FileRecord, MetadataStore, StoreError,
};
use tracing::{debug, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::diagnose::{diagnose_and_flag, refine_decrypt_failure};
use crate::error::{map_crypto, VaultError, VaultResult};
use crate::{check_new_secret, check_presented_secret};

/// Target encryption mode for a key rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotationTarget {
    /// Keep the file's current mode; only the key changes.
    Keep,
    /// Switch a vault-encrypted file onto its own per-file key.
    Custom,
}

/// Outcome of a file key rotation.
#[derive(Debug)]
pub enum RotationOutcome {
    /// Ciphertext, IV, encryption type, and credential all committed.
    Complete(FileRecord),
    /// The safety-critical pair committed — new ciphertext is uploaded and
    /// its IV persisted, so the file decrypts under the new secret — but
    /// the encryption-type/credential update failed even after the IV-only
    /// retry. The caller should re-drive that follow-up.
    CredentialPending(FileRecord),
}

impl RotationOutcome {
    pub fn file(&self) -> &FileRecord {
        match self {
            RotationOutcome::Complete(f) | RotationOutcome::CredentialPending(f) => f,
        }
    }
}

/// Encrypts and stores a new file in a vault.
///
/// `mode` selects which credential will govern the file: the vault's
/// (secret is the vault secret; no per-file record) or its own (secret is
/// user-chosen; a [`FileKeyRecord`] is created). The secret is not
/// verified against the vault credential here — what is encrypted under it
/// is what will decrypt under it.
pub fn upload_file<B, M>(
    blob: &B,
    meta: &M,
    vault_id: Uuid,
    name: &str,
    plaintext: &[u8],
    secret: &str,
    mode: EncryptionType,
) -> VaultResult<FileRecord>
where
    B: BlobStore + ?Sized,
    M: MetadataStore + ?Sized,
{
    meta.get_vault(vault_id)?;
    match mode {
        // A custom upload mints a new credential; policy applies.
        EncryptionType::Custom => check_new_secret(secret)?,
        EncryptionType::Vault => check_presented_secret(secret)?,
    }

    // All pure computation happens before any write.
    let credential = match mode {
        EncryptionType::Custom => Some(hash_secret(secret).map_err(map_crypto)?),
        EncryptionType::Vault => None,
    };
    let (iv, ciphertext) = encrypt(plaintext, secret).map_err(map_crypto)?;

    let id = Uuid::new_v4();
    let blob_path = format!("vaults/{vault_id}/{id}");
    blob.upload(&blob_path, &ciphertext)?;

    let now = Utc::now();
    let file = FileRecord {
        id,
        vault_id,
        name: name.to_string(),
        size: plaintext.len() as u64,
        iv_hex: iv.to_hex(),
        encryption_type: mode,
        blob_path,
        needs_repair: false,
        created_at: now,
        updated_at: now,
    };
    meta.insert_file(file.clone())?;
    if let Some(credential) = credential {
        meta.upsert_file_key(FileKeyRecord {
            id: Uuid::new_v4(),
            file_id: id,
            credential,
        })?;
    }

    debug!(file_id = %id, vault_id = %vault_id, ?mode, size = file.size, "uploaded file");
    Ok(file)
}

/// Decrypts a file with a presented secret.
///
/// Custom files are gated by `verify_secret` against their key record
/// first — a cheap reject before the I/O-bound decrypt path. Vault files
/// are deliberately *not* pre-checked against the vault's current
/// credential: the file may be encrypted under a superseded vault secret,
/// so the decrypt attempt itself is the only meaningful signal.
pub fn read_file<B, M>(blob: &B, meta: &M, file_id: Uuid, secret: &str) -> VaultResult<Vec<u8>>
where
    B: BlobStore + ?Sized,
    M: MetadataStore + ?Sized,
{
    let file = meta.get_file(file_id)?;
    check_presented_secret(secret)?;

    if file.encryption_type == EncryptionType::Custom {
        let key = meta.get_file_key(file_id)?;
        if !verify_secret(secret, &key.credential) {
            return Err(VaultError::InvalidCredential);
        }
    }

    let iv = parse_iv_or_flag(meta, &file)?;
    let ciphertext = blob.download(&file.blob_path)?;
    match decrypt(&ciphertext, secret, &iv) {
        Ok(plaintext) => Ok(plaintext),
        Err(CryptoError::Decryption) => Err(diagnose_and_flag(meta, &file)),
        Err(other) => Err(map_crypto(other)),
    }
}

/// Re-encrypts fresh plaintext over an existing file record.
///
/// This is the repair path for files flagged `needs_repair`: new IV and
/// ciphertext replace the unrecoverable ones and the flag is cleared by
/// the content commit. Custom files verify the presented secret so the
/// stored credential stays true to the new ciphertext.
pub fn reupload_file<B, M>(
    blob: &B,
    meta: &M,
    file_id: Uuid,
    plaintext: &[u8],
    secret: &str,
) -> VaultResult<FileRecord>
where
    B: BlobStore + ?Sized,
    M: MetadataStore + ?Sized,
{
    let file = meta.get_file(file_id)?;
    check_presented_secret(secret)?;
    if file.encryption_type == EncryptionType::Custom {
        let key = meta.get_file_key(file_id)?;
        if !verify_secret(secret, &key.credential) {
            return Err(VaultError::InvalidCredential);
        }
    }

    let (iv, ciphertext) = encrypt(plaintext, secret).map_err(map_crypto)?;
    blob.upload(&file.blob_path, &ciphertext)?;
    meta.update_file_content(file_id, &iv.to_hex(), plaintext.len() as u64, Utc::now())?;

    debug!(file_id = %file_id, "re-uploaded file content");
    meta.get_file(file_id).map_err(Into::into)
}

/// Rotates a file's encryption key: download → decrypt → re-encrypt →
/// overwrite → commit metadata.
///
/// The decrypt in step two gates everything: its failure is terminal for
/// the operation and mutates no stored state. After the overwrite, the
/// combined metadata commit is attempted first; if it fails, the IV-only
/// commit is retried before giving up, because a consistent
/// `(ciphertext, iv)` pair is safety-critical while the credential fields
/// can fail into [`RotationOutcome::CredentialPending`].
///
/// Callers must serialize rotations and concurrent reads per file: the
/// file is single-writer for the duration of this protocol.
pub fn rotate_file_key<B, M>(
    blob: &B,
    meta: &M,
    file_id: Uuid,
    current_secret: &str,
    new_secret: &str,
    target: RotationTarget,
) -> VaultResult<RotationOutcome>
where
    B: BlobStore + ?Sized,
    M: MetadataStore + ?Sized,
{
    let file = meta.get_file(file_id)?;
    check_presented_secret(current_secret)?;
    check_new_secret(new_secret)?;

    // Malformed IV is unrecoverable by rotation; nothing has been mutated
    // yet and the read path owns flagging.
    let iv = Iv::from_hex(&file.iv_hex).map_err(|_| VaultError::InvalidIv)?;

    // 1. Download the current ciphertext.
    let ciphertext = blob.download(&file.blob_path)?;

    // 2. Decrypt with the current secret. Failure must not mutate state,
    //    so refinement here never sets the repair flag.
    let plaintext = match decrypt(&ciphertext, current_secret, &iv) {
        Ok(pt) => Zeroizing::new(pt),
        Err(CryptoError::Decryption) => return Err(refine_decrypt_failure(meta, &file)),
        Err(other) => return Err(map_crypto(other)),
    };

    // 3. Re-encrypt under the new secret. The credential is hashed before
    //    the overwrite so a hashing failure cannot strand new ciphertext.
    let (new_iv, new_ciphertext) = encrypt(&plaintext, new_secret).map_err(map_crypto)?;
    drop(plaintext);

    let becomes_custom =
        target == RotationTarget::Custom && file.encryption_type == EncryptionType::Vault;
    let new_type = if becomes_custom {
        EncryptionType::Custom
    } else {
        file.encryption_type
    };
    let credential = if new_type == EncryptionType::Custom {
        Some(hash_secret(new_secret).map_err(map_crypto)?)
    } else {
        None
    };

    // 4. Overwrite the old ciphertext at the same path.
    blob.upload(&file.blob_path, &new_ciphertext)?;

    // 5. Commit metadata: combined first, IV-only fallback.
    let iv_hex = new_iv.to_hex();
    let now = Utc::now();
    match commit_rotation(meta, &file, &iv_hex, new_type, credential.as_ref()) {
        Ok(()) => {
            debug!(file_id = %file_id, ?new_type, "rotated file key");
            Ok(RotationOutcome::Complete(meta.get_file(file_id)?))
        }
        Err(first_err) => {
            warn!(
                file_id = %file_id,
                error = %first_err,
                "combined rotation commit failed; retrying IV-only commit"
            );
            meta.update_file_iv(file_id, &iv_hex, now).map_err(|e| {
                warn!(
                    file_id = %file_id,
                    error = %e,
                    "IV-only commit failed after ciphertext overwrite"
                );
                VaultError::Storage(e)
            })?;
            Ok(RotationOutcome::CredentialPending(meta.get_file(file_id)?))
        }
    }
}

fn commit_rotation<M: MetadataStore + ?Sized>(
    meta: &M,
    file: &FileRecord,
    iv_hex: &str,
    new_type: EncryptionType,
    credential: Option<&coffer_crypto::KeyCredential>,
) -> Result<(), StoreError> {
    // The key record goes in before the type flips to custom. A key record
    // on a still-vault file is inert (nothing consults it until the type is
    // custom), but a custom file without its key record is unreadable.
    if let Some(credential) = credential {
        // An already-custom file keeps its key record; only the credential
        // inside it changes.
        let record = match meta.get_file_key(file.id) {
            Ok(existing) => FileKeyRecord {
                id: existing.id,
                file_id: file.id,
                credential: credential.clone(),
            },
            Err(StoreError::FileKeyNotFound(_)) => FileKeyRecord {
                id: Uuid::new_v4(),
                file_id: file.id,
                credential: credential.clone(),
            },
            Err(e) => return Err(e),
        };
        meta.upsert_file_key(record)?;
    }
    meta.update_file_encryption(file.id, iv_hex, new_type, Utc::now())?;
    Ok(())
}

/// Deletes a file, gated by whichever credential governs it.
pub fn delete_file<B, M>(blob: &B, meta: &M, file_id: Uuid, secret: &str) -> VaultResult<()>
where
    B: BlobStore + ?Sized,
    M: MetadataStore + ?Sized,
{
    let file = meta.get_file(file_id)?;
    check_presented_secret(secret)?;

    let credential = match file.encryption_type {
        EncryptionType::Custom => meta.get_file_key(file_id)?.credential,
        EncryptionType::Vault => meta.get_vault(file.vault_id)?.credential,
    };
    if !verify_secret(secret, &credential) {
        return Err(VaultError::InvalidCredential);
    }

    match blob.delete(&file.blob_path) {
        Ok(()) | Err(StoreError::BlobNotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }
    meta.delete_file(file_id)?;
    debug!(file_id = %file_id, "deleted file");
    Ok(())
}

fn parse_iv_or_flag<M: MetadataStore + ?Sized>(
    meta: &M,
    file: &FileRecord,
) -> VaultResult<Iv> {
    match Iv::from_hex(&file.iv_hex) {
        Ok(iv) => Ok(iv),
        Err(_) => {
            warn!(file_id = %file.id, "malformed IV on record; flagging for repair");
            if let Err(e) = meta.set_needs_repair(file.id, true) {
                warn!(file_id = %file.id, error = %e, "failed to flag file for repair");
            }
            Err(VaultError::InvalidIv)
        }
    }
}
