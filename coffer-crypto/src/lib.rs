//! Cipher primitive and key verifier for Coffer.
//!
//! Two independent primitives live here:
//!
//! 1. **Cipher** ([`encrypt`] / [`decrypt`]): a user secret is hashed with
//!    SHA-256 into a 256-bit [`DerivedKey`], which drives AES-256-CBC with
//!    PKCS#7 padding over opaque byte payloads. A fresh random [`Iv`] is
//!    generated per encryption.
//!
//! 2. **Verifier** ([`hash_secret`] / [`verify_secret`]): Argon2id with a
//!    per-call random salt produces a self-describing [`KeyCredential`]
//!    suitable for storage; verification is constant-time inside the
//!    library.
//!
//! The two are deliberately decoupled: a secret can verify against a stored
//! credential yet fail to decrypt a particular ciphertext (the credential
//! may have been replaced after that ciphertext was written). Callers must
//! treat "this secret is known" and "this secret opens this ciphertext" as
//! separate questions and call both primitives accordingly.
//!
//! Nothing in this crate performs I/O and nothing retains a secret or key
//! beyond the scope of a single call; [`DerivedKey`] zeroizes on drop.

mod cipher;
mod credential;
mod error;
mod key;

pub use cipher::{decrypt, encrypt, Iv, IV_HEX_LEN, IV_SIZE};
pub use credential::{
    hash_secret, hash_secret_with_params, verify_secret, HashParams, KeyCredential,
};
pub use error::{CryptoError, CryptoResult};
pub use key::{derive_key, DerivedKey, KEY_SIZE};
