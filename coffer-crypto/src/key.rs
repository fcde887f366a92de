//! Key derivation from user secrets.

use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const KEY_SIZE: usize = 32;

/// A 256-bit cipher key derived from a user secret.
///
/// Exists only for the duration of one encrypt/decrypt call; never
/// persisted, never logged, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; KEY_SIZE]);

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey(..)")
    }
}

/// Derives the cipher key for a secret: SHA-256 over its UTF-8 bytes.
///
/// Deterministic, pure, and infallible for any input including the empty
/// string — rejecting empty secrets is caller policy, not this function's.
pub fn derive_key(secret: &str) -> DerivedKey {
    let digest = Sha256::digest(secret.as_bytes());
    DerivedKey(digest.into())
}
