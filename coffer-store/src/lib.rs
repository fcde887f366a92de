//! Storage collaborator interfaces and record types for Coffer.
//!
//! The lifecycle engine in `coffer-vault` performs no I/O of its own; it
//! drives the [`BlobStore`] and [`MetadataStore`] traits defined here. Real
//! deployments implement them over object storage and a relational store;
//! this crate ships an in-memory metadata store and memory/filesystem blob
//! stores for tests and embedders.

mod blob;
mod error;
mod meta;
mod types;

pub use blob::{BlobStore, FsBlobStore, MemoryBlobStore};
pub use error::{StoreError, StoreResult};
pub use meta::{MemoryMetadataStore, MetadataStore};
pub use types::{EncryptionType, FileKeyRecord, FileRecord, VaultRecord};
