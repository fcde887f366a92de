//! Shared fixtures: in-memory collaborators and a failure-injecting
//! metadata store for partial-commit scenarios.

// Not every test binary uses every fixture.
#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, Utc};
use coffer_crypto::KeyCredential;
use coffer_store::{
    EncryptionType, FileKeyRecord, FileRecord, MemoryBlobStore, MemoryMetadataStore,
    MetadataStore, StoreError, StoreResult, VaultRecord,
};
use uuid::Uuid;

pub fn stores() -> (MemoryBlobStore, MemoryMetadataStore) {
    (MemoryBlobStore::new(), MemoryMetadataStore::new())
}

/// Delegating metadata store that fails the combined rotation commit a
/// configurable number of times, and optionally the IV-only commit too.
pub struct FlakyMetadataStore {
    pub inner: MemoryMetadataStore,
    combined_failures: AtomicU32,
    iv_failures: AtomicU32,
    key_upsert_failures: AtomicU32,
}

impl FlakyMetadataStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryMetadataStore::new(),
            combined_failures: AtomicU32::new(0),
            iv_failures: AtomicU32::new(0),
            key_upsert_failures: AtomicU32::new(0),
        }
    }

    pub fn fail_combined_commits(&self, n: u32) {
        self.combined_failures.store(n, Ordering::SeqCst);
    }

    pub fn fail_iv_commits(&self, n: u32) {
        self.iv_failures.store(n, Ordering::SeqCst);
    }

    pub fn fail_key_upserts(&self, n: u32) {
        self.key_upsert_failures.store(n, Ordering::SeqCst);
    }

    fn take_failure(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl MetadataStore for FlakyMetadataStore {
    fn insert_vault(&self, vault: VaultRecord) -> StoreResult<()> {
        self.inner.insert_vault(vault)
    }

    fn get_vault(&self, id: Uuid) -> StoreResult<VaultRecord> {
        self.inner.get_vault(id)
    }

    fn update_vault_credential(
        &self,
        id: Uuid,
        credential: KeyCredential,
        rotated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        self.inner.update_vault_credential(id, credential, rotated_at)
    }

    fn delete_vault(&self, id: Uuid) -> StoreResult<()> {
        self.inner.delete_vault(id)
    }

    fn insert_file(&self, file: FileRecord) -> StoreResult<()> {
        self.inner.insert_file(file)
    }

    fn get_file(&self, id: Uuid) -> StoreResult<FileRecord> {
        self.inner.get_file(id)
    }

    fn list_files(&self, vault_id: Uuid) -> StoreResult<Vec<FileRecord>> {
        self.inner.list_files(vault_id)
    }

    fn delete_file(&self, id: Uuid) -> StoreResult<()> {
        self.inner.delete_file(id)
    }

    fn update_file_iv(
        &self,
        id: Uuid,
        iv_hex: &str,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        if Self::take_failure(&self.iv_failures) {
            return Err(StoreError::Io("injected IV commit failure".to_string()));
        }
        self.inner.update_file_iv(id, iv_hex, updated_at)
    }

    fn update_file_encryption(
        &self,
        id: Uuid,
        iv_hex: &str,
        encryption_type: EncryptionType,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        if Self::take_failure(&self.combined_failures) {
            return Err(StoreError::Io(
                "injected combined commit failure".to_string(),
            ));
        }
        self.inner
            .update_file_encryption(id, iv_hex, encryption_type, updated_at)
    }

    fn update_file_content(
        &self,
        id: Uuid,
        iv_hex: &str,
        size: u64,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        self.inner.update_file_content(id, iv_hex, size, updated_at)
    }

    fn set_needs_repair(&self, id: Uuid, needs_repair: bool) -> StoreResult<()> {
        self.inner.set_needs_repair(id, needs_repair)
    }

    fn count_vault_encrypted_files(&self, vault_id: Uuid) -> StoreResult<u64> {
        self.inner.count_vault_encrypted_files(vault_id)
    }

    fn upsert_file_key(&self, key: FileKeyRecord) -> StoreResult<()> {
        if Self::take_failure(&self.key_upsert_failures) {
            return Err(StoreError::Io("injected key upsert failure".to_string()));
        }
        self.inner.upsert_file_key(key)
    }

    fn get_file_key(&self, file_id: Uuid) -> StoreResult<FileKeyRecord> {
        self.inner.get_file_key(file_id)
    }

    fn delete_file_key(&self, file_id: Uuid) -> StoreResult<()> {
        self.inner.delete_file_key(file_id)
    }
}
