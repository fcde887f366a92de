//! Adversarial tests for the AES-256-CBC cipher primitive.
//!
//! CBC with PKCS#7 padding has no authentication tag, so a wrong key or a
//! tampered ciphertext is detected through padding validation. That check
//! has a small false-accept probability (roughly 2^-8 for a random final
//! block), so fail-closed behavior is asserted statistically and through
//! the stronger invariant that a wrong key never reproduces the original
//! plaintext.

use coffer_crypto::{decrypt, encrypt, CryptoError, Iv};

// ── Wrong Key ──

#[test]
fn wrong_key_fails_closed_statistically() {
    let plaintext = b"sensitive file payload that must not leak";
    let mut false_accepts = 0u32;
    for i in 0..256 {
        let (iv, ct) = encrypt(plaintext, "secret-one").unwrap();
        match decrypt(&ct, &format!("secret-two-{i}"), &iv) {
            Err(CryptoError::Decryption) => {}
            Err(other) => panic!("unexpected error variant: {other:?}"),
            Ok(garbage) => {
                // Padding happened to validate; the output must still be
                // garbage, never the original plaintext.
                assert_ne!(garbage, plaintext);
                false_accepts += 1;
            }
        }
    }
    // Expected ~1 false accept in 256 trials; 16 is far beyond any
    // plausible run of bad luck and indicates a broken padding check.
    assert!(
        false_accepts <= 16,
        "padding oracle accepted {false_accepts}/256 wrong-key decryptions"
    );
}

#[test]
fn wrong_iv_never_returns_original_plaintext() {
    let plaintext = b"two full blocks of data padded out to length!!!";
    let (_, ct) = encrypt(plaintext, "secret").unwrap();
    let wrong_iv = Iv::from_bytes([0u8; 16]);
    if let Ok(out) = decrypt(&ct, "secret", &wrong_iv) {
        // Only the first block is affected by the IV, so decryption can
        // succeed — but the result must differ from the original.
        assert_ne!(out, plaintext);
    }
}

// ── Ciphertext Tampering ──

#[test]
fn tampered_ciphertext_fails_or_yields_garbage() {
    let plaintext = b"integrity matters even without a MAC";
    let (iv, ct) = encrypt(plaintext, "secret").unwrap();

    for i in 0..ct.len() {
        let mut tampered = ct.clone();
        tampered[i] ^= 0xFF;
        if let Ok(out) = decrypt(&tampered, "secret", &iv) {
            assert_ne!(out, plaintext, "tampering at byte {i} went unnoticed");
        }
    }
}

#[test]
fn truncated_to_partial_block_fails() {
    let (iv, mut ct) = encrypt(b"payload spanning multiple blocks here", "secret").unwrap();
    ct.truncate(ct.len() - 7);
    assert!(matches!(
        decrypt(&ct, "secret", &iv),
        Err(CryptoError::Decryption)
    ));
}

#[test]
fn appended_partial_block_fails() {
    let (iv, mut ct) = encrypt(b"payload", "secret").unwrap();
    ct.extend_from_slice(&[0xAA; 5]);
    assert!(matches!(
        decrypt(&ct, "secret", &iv),
        Err(CryptoError::Decryption)
    ));
}

// ── IV Uniqueness ──

#[test]
fn ten_thousand_encryptions_produce_distinct_ivs() {
    use std::collections::HashSet;

    let mut seen = HashSet::with_capacity(10_000);
    for _ in 0..10_000 {
        let (iv, _) = encrypt(b"same plaintext", "same secret").unwrap();
        assert!(seen.insert(*iv.as_bytes()), "IV collision");
    }
}
