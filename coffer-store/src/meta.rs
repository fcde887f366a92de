//! Metadata store interface: vault, file, and file-key records with
//! field-level updates.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use coffer_crypto::KeyCredential;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::types::{EncryptionType, FileKeyRecord, FileRecord, VaultRecord};

/// Vault/file/file-key metadata consumed by the lifecycle protocols.
///
/// Field-level updates exist because the rotation protocol needs a narrow
/// IV-only commit as its fallback: once new ciphertext has overwritten the
/// old, the IV is the single field required to make it decryptable again.
/// Every method that commits a new IV also clears the repair flag — a fresh
/// `(ciphertext, iv)` pair was just written consistently.
pub trait MetadataStore: Send + Sync {
    fn insert_vault(&self, vault: VaultRecord) -> StoreResult<()>;
    fn get_vault(&self, id: Uuid) -> StoreResult<VaultRecord>;
    /// Replaces the vault credential and bumps `updated_at` to `rotated_at`.
    fn update_vault_credential(
        &self,
        id: Uuid,
        credential: KeyCredential,
        rotated_at: DateTime<Utc>,
    ) -> StoreResult<()>;
    fn delete_vault(&self, id: Uuid) -> StoreResult<()>;

    fn insert_file(&self, file: FileRecord) -> StoreResult<()>;
    fn get_file(&self, id: Uuid) -> StoreResult<FileRecord>;
    fn list_files(&self, vault_id: Uuid) -> StoreResult<Vec<FileRecord>>;
    fn delete_file(&self, id: Uuid) -> StoreResult<()>;

    /// IV-only rotation commit: new IV, bumped `updated_at`, repair flag
    /// cleared. Everything else is left untouched.
    fn update_file_iv(&self, id: Uuid, iv_hex: &str, updated_at: DateTime<Utc>)
        -> StoreResult<()>;

    /// Combined rotation commit: IV, encryption type, bumped `updated_at`,
    /// repair flag cleared.
    fn update_file_encryption(
        &self,
        id: Uuid,
        iv_hex: &str,
        encryption_type: EncryptionType,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    /// Re-upload commit: new IV and plaintext size, bumped `updated_at`,
    /// repair flag cleared.
    fn update_file_content(
        &self,
        id: Uuid,
        iv_hex: &str,
        size: u64,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    fn set_needs_repair(&self, id: Uuid, needs_repair: bool) -> StoreResult<()>;

    /// How many of the vault's files are in vault-encryption mode (the
    /// files a credential rotation strands on their original secret).
    fn count_vault_encrypted_files(&self, vault_id: Uuid) -> StoreResult<u64>;

    fn upsert_file_key(&self, key: FileKeyRecord) -> StoreResult<()>;
    fn get_file_key(&self, file_id: Uuid) -> StoreResult<FileKeyRecord>;
    fn delete_file_key(&self, file_id: Uuid) -> StoreResult<()>;
}

// ============================================================================
// MemoryMetadataStore
// ============================================================================

#[derive(Default)]
struct Inner {
    vaults: HashMap<Uuid, VaultRecord>,
    files: HashMap<Uuid, FileRecord>,
    // Keyed by file id: a file has at most one key record.
    file_keys: HashMap<Uuid, FileKeyRecord>,
}

/// In-memory metadata store for tests and embedders.
#[derive(Default)]
pub struct MemoryMetadataStore {
    inner: RwLock<Inner>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, Inner>> {
        self.inner.read().map_err(|e| StoreError::Io(e.to_string()))
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, Inner>> {
        self.inner.write().map_err(|e| StoreError::Io(e.to_string()))
    }
}

fn file_mut(inner: &mut Inner, id: Uuid) -> StoreResult<&mut FileRecord> {
    inner.files.get_mut(&id).ok_or(StoreError::FileNotFound(id))
}

impl MetadataStore for MemoryMetadataStore {
    fn insert_vault(&self, vault: VaultRecord) -> StoreResult<()> {
        self.write()?.vaults.insert(vault.id, vault);
        Ok(())
    }

    fn get_vault(&self, id: Uuid) -> StoreResult<VaultRecord> {
        self.read()?
            .vaults
            .get(&id)
            .cloned()
            .ok_or(StoreError::VaultNotFound(id))
    }

    fn update_vault_credential(
        &self,
        id: Uuid,
        credential: KeyCredential,
        rotated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut inner = self.write()?;
        let vault = inner.vaults.get_mut(&id).ok_or(StoreError::VaultNotFound(id))?;
        vault.credential = credential;
        vault.updated_at = rotated_at;
        Ok(())
    }

    fn delete_vault(&self, id: Uuid) -> StoreResult<()> {
        let mut inner = self.write()?;
        inner
            .vaults
            .remove(&id)
            .ok_or(StoreError::VaultNotFound(id))?;
        let file_ids: Vec<Uuid> = inner
            .files
            .values()
            .filter(|f| f.vault_id == id)
            .map(|f| f.id)
            .collect();
        for file_id in file_ids {
            inner.files.remove(&file_id);
            inner.file_keys.remove(&file_id);
        }
        Ok(())
    }

    fn insert_file(&self, file: FileRecord) -> StoreResult<()> {
        let mut inner = self.write()?;
        let vault = inner
            .vaults
            .get_mut(&file.vault_id)
            .ok_or(StoreError::VaultNotFound(file.vault_id))?;
        vault.files_count += 1;
        inner.files.insert(file.id, file);
        Ok(())
    }

    fn get_file(&self, id: Uuid) -> StoreResult<FileRecord> {
        self.read()?
            .files
            .get(&id)
            .cloned()
            .ok_or(StoreError::FileNotFound(id))
    }

    fn list_files(&self, vault_id: Uuid) -> StoreResult<Vec<FileRecord>> {
        Ok(self
            .read()?
            .files
            .values()
            .filter(|f| f.vault_id == vault_id)
            .cloned()
            .collect())
    }

    fn delete_file(&self, id: Uuid) -> StoreResult<()> {
        let mut inner = self.write()?;
        let file = inner.files.remove(&id).ok_or(StoreError::FileNotFound(id))?;
        inner.file_keys.remove(&id);
        if let Some(vault) = inner.vaults.get_mut(&file.vault_id) {
            vault.files_count = vault.files_count.saturating_sub(1);
        }
        Ok(())
    }

    fn update_file_iv(
        &self,
        id: Uuid,
        iv_hex: &str,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut inner = self.write()?;
        let file = file_mut(&mut inner, id)?;
        file.iv_hex = iv_hex.to_string();
        file.updated_at = updated_at;
        file.needs_repair = false;
        Ok(())
    }

    fn update_file_encryption(
        &self,
        id: Uuid,
        iv_hex: &str,
        encryption_type: EncryptionType,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut inner = self.write()?;
        let file = file_mut(&mut inner, id)?;
        file.iv_hex = iv_hex.to_string();
        file.encryption_type = encryption_type;
        file.updated_at = updated_at;
        file.needs_repair = false;
        Ok(())
    }

    fn update_file_content(
        &self,
        id: Uuid,
        iv_hex: &str,
        size: u64,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut inner = self.write()?;
        let file = file_mut(&mut inner, id)?;
        file.iv_hex = iv_hex.to_string();
        file.size = size;
        file.updated_at = updated_at;
        file.needs_repair = false;
        Ok(())
    }

    fn set_needs_repair(&self, id: Uuid, needs_repair: bool) -> StoreResult<()> {
        let mut inner = self.write()?;
        file_mut(&mut inner, id)?.needs_repair = needs_repair;
        Ok(())
    }

    fn count_vault_encrypted_files(&self, vault_id: Uuid) -> StoreResult<u64> {
        Ok(self
            .read()?
            .files
            .values()
            .filter(|f| f.vault_id == vault_id && f.encryption_type == EncryptionType::Vault)
            .count() as u64)
    }

    fn upsert_file_key(&self, key: FileKeyRecord) -> StoreResult<()> {
        self.write()?.file_keys.insert(key.file_id, key);
        Ok(())
    }

    fn get_file_key(&self, file_id: Uuid) -> StoreResult<FileKeyRecord> {
        self.read()?
            .file_keys
            .get(&file_id)
            .cloned()
            .ok_or(StoreError::FileKeyNotFound(file_id))
    }

    fn delete_file_key(&self, file_id: Uuid) -> StoreResult<()> {
        self.write()?
            .file_keys
            .remove(&file_id)
            .map(|_| ())
            .ok_or(StoreError::FileKeyNotFound(file_id))
    }
}
