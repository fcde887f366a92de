//! AES-256-CBC encryption of file payloads.
//!
//! IV and ciphertext move between layers as raw bytes; the 32-hex-character
//! form is strictly an at-rest/transport encoding applied at this boundary
//! via [`Iv::to_hex`] / [`Iv::from_hex`].

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::error::{CryptoError, CryptoResult};
use crate::key::derive_key;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

pub const IV_SIZE: usize = 16;
pub const IV_HEX_LEN: usize = 32;

/// A 16-byte CBC initialization vector.
///
/// At rest an IV is exactly [`IV_HEX_LEN`] hex characters; any other length
/// is a hard validation failure, distinct from decryption failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Iv([u8; IV_SIZE]);

impl Iv {
    pub fn from_bytes(bytes: [u8; IV_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; IV_SIZE] {
        &self.0
    }

    /// Storage encoding: 32 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses the storage encoding, rejecting anything that is not exactly
    /// 32 hex characters.
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        if s.len() != IV_HEX_LEN {
            return Err(CryptoError::InvalidIv(format!(
                "expected {IV_HEX_LEN} hex characters, got {}",
                s.len()
            )));
        }
        let decoded = hex::decode(s)
            .map_err(|_| CryptoError::InvalidIv("non-hex character".to_string()))?;
        let mut bytes = [0u8; IV_SIZE];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }
}

/// Encrypts a payload under a user secret.
///
/// Generates a fresh random IV from the OS RNG per call. The only failure
/// mode is the RNG itself, which is fatal and never papered over with a
/// predictable IV.
pub fn encrypt(plaintext: &[u8], secret: &str) -> CryptoResult<(Iv, Vec<u8>)> {
    let mut iv = [0u8; IV_SIZE];
    OsRng
        .try_fill_bytes(&mut iv)
        .map_err(|e| CryptoError::Rng(e.to_string()))?;

    let key = derive_key(secret);
    let ciphertext = Aes256CbcEnc::new(key.as_bytes().into(), (&iv).into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    Ok((Iv(iv), ciphertext))
}

/// Decrypts a payload under a user secret and its recorded IV.
///
/// Fails with [`CryptoError::Decryption`] when padding or block validation
/// fails — wrong key, wrong IV, and corrupted ciphertext are
/// indistinguishable at this level.
pub fn decrypt(ciphertext: &[u8], secret: &str, iv: &Iv) -> CryptoResult<Vec<u8>> {
    let key = derive_key(secret);
    Aes256CbcDec::new(key.as_bytes().into(), iv.as_bytes().into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::Decryption)
}
