//! Full lifecycle against real filesystem blob storage: upload, read,
//! reject, and rotate a custom-key file.

mod support;

use coffer_store::{EncryptionType, FsBlobStore, MetadataStore};
use coffer_vault::{
    create_vault, read_file, rotate_file_key, upload_file, RotationTarget, VaultError,
};
use support::stores;

#[test]
fn custom_key_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let blob = FsBlobStore::new(dir.path());
    let (_, meta) = stores();

    let vault = create_vault(&meta, "personal", "vault-secret-1").unwrap();
    let file = upload_file(
        &blob,
        &meta,
        vault.id,
        "greeting.txt",
        b"hello world",
        "correct-key-123",
        EncryptionType::Custom,
    )
    .unwrap();
    let iv1 = file.iv_hex.clone();

    // Correct secret round-trips.
    assert_eq!(
        read_file(&blob, &meta, file.id, "correct-key-123").unwrap(),
        b"hello world"
    );

    // Wrong secret is rejected by the verify gate before any cipher runs.
    assert!(matches!(
        read_file(&blob, &meta, file.id, "wrong-key-456"),
        Err(VaultError::InvalidCredential)
    ));

    // Rotate onto a new secret; fresh IV, same plaintext.
    rotate_file_key(
        &blob,
        &meta,
        file.id,
        "correct-key-123",
        "new-key-789",
        RotationTarget::Keep,
    )
    .unwrap();

    let rotated = meta.get_file(file.id).unwrap();
    assert_ne!(rotated.iv_hex, iv1);
    assert_eq!(
        read_file(&blob, &meta, file.id, "new-key-789").unwrap(),
        b"hello world"
    );
    assert!(matches!(
        read_file(&blob, &meta, file.id, "correct-key-123"),
        Err(VaultError::InvalidCredential)
    ));
}
