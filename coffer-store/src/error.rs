//! Storage error taxonomy.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("vault not found: {0}")]
    VaultNotFound(Uuid),

    #[error("file not found: {0}")]
    FileNotFound(Uuid),

    #[error("file key not found for file: {0}")]
    FileKeyNotFound(Uuid),

    #[error("blob not found: {0}")]
    BlobNotFound(String),

    /// Collaborator I/O failure. Retries are the caller's policy; nothing
    /// in the core retries these silently.
    #[error("storage I/O failure: {0}")]
    Io(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
