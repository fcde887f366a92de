//! Byte-addressable blob storage keyed by an opaque path.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};

/// Ciphertext blob storage consumed by the lifecycle protocols.
///
/// `upload` has upsert semantics: writing to an existing path overwrites the
/// previous bytes in place. Key rotation relies on this — new ciphertext
/// replaces old ciphertext at the same path, with no durable state in which
/// both versions exist.
pub trait BlobStore: Send + Sync {
    fn download(&self, path: &str) -> StoreResult<Vec<u8>>;

    /// Stores `data` at `path`, overwriting any existing blob.
    fn upload(&self, path: &str, data: &[u8]) -> StoreResult<()>;

    fn delete(&self, path: &str) -> StoreResult<()>;
}

// ============================================================================
// MemoryBlobStore
// ============================================================================

/// In-memory blob store for tests and embedders without durable storage.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn download(&self, path: &str) -> StoreResult<Vec<u8>> {
        let blobs = self.blobs.read().map_err(|e| StoreError::Io(e.to_string()))?;
        blobs
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::BlobNotFound(path.to_string()))
    }

    fn upload(&self, path: &str, data: &[u8]) -> StoreResult<()> {
        let mut blobs = self.blobs.write().map_err(|e| StoreError::Io(e.to_string()))?;
        blobs.insert(path.to_string(), data.to_vec());
        Ok(())
    }

    fn delete(&self, path: &str) -> StoreResult<()> {
        let mut blobs = self.blobs.write().map_err(|e| StoreError::Io(e.to_string()))?;
        blobs
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StoreError::BlobNotFound(path.to_string()))
    }
}

// ============================================================================
// FsBlobStore
// ============================================================================

/// Filesystem-backed blob store rooted at a directory.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        // Blob paths are opaque ids generated by the engine, never
        // user-controlled; join components to stay inside the root.
        let mut full = self.root.clone();
        for part in path.split('/').filter(|p| !p.is_empty() && *p != "..") {
            full.push(part);
        }
        full
    }

    fn map_io(path: &str, e: std::io::Error) -> StoreError {
        if e.kind() == ErrorKind::NotFound {
            StoreError::BlobNotFound(path.to_string())
        } else {
            StoreError::Io(e.to_string())
        }
    }
}

impl BlobStore for FsBlobStore {
    fn download(&self, path: &str) -> StoreResult<Vec<u8>> {
        std::fs::read(self.resolve(path)).map_err(|e| Self::map_io(path, e))
    }

    fn upload(&self, path: &str, data: &[u8]) -> StoreResult<()> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
        }
        std::fs::write(&full, data).map_err(|e| StoreError::Io(e.to_string()))
    }

    fn delete(&self, path: &str) -> StoreResult<()> {
        std::fs::remove_file(self.resolve(path)).map_err(|e| Self::map_io(path, e))
    }
}

impl FsBlobStore {
    pub fn root(&self) -> &Path {
        &self.root
    }
}
