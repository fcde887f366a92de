//! Persistent record types for vaults, files, and file keys.

use chrono::{DateTime, Utc};
use coffer_crypto::KeyCredential;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which credential governs a file's key verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncryptionType {
    /// Encrypted with the owning vault's secret; no per-file key record.
    Vault,
    /// Encrypted with its own secret; exactly one [`FileKeyRecord`] exists.
    Custom,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VaultRecord {
    pub id: Uuid,
    pub name: String,
    /// Verification gate for administrative operations. Replacing it does
    /// not re-encrypt anything.
    pub credential: KeyCredential,
    pub files_count: u64,
    pub created_at: DateTime<Utc>,
    /// Bumped on every credential rotation; compared against a file's
    /// `updated_at` to diagnose stale-vault-key decryption failures.
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: Uuid,
    pub vault_id: Uuid,
    pub name: String,
    /// Plaintext size in bytes.
    pub size: u64,
    /// At-rest IV encoding: exactly 32 hex characters.
    pub iv_hex: String,
    pub encryption_type: EncryptionType,
    /// Opaque blob-store path holding the ciphertext.
    pub blob_path: String,
    /// Sticky: set when ciphertext is confirmed unrecoverable with any key
    /// the user is expected to supply; cleared only by a successful key
    /// rotation or re-upload.
    pub needs_repair: bool,
    pub created_at: DateTime<Utc>,
    /// Last (re-)encryption time: set at upload and on every key rotation.
    pub updated_at: DateTime<Utc>,
}

/// Per-file key credential; exists iff the file is custom-encrypted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileKeyRecord {
    pub id: Uuid,
    pub file_id: Uuid,
    pub credential: KeyCredential,
}
