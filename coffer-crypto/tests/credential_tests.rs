//! Verifier correctness over randomized secret pairs.

use coffer_crypto::{hash_secret_with_params, verify_secret, HashParams};
use rand::distr::Alphanumeric;
use rand::Rng;

// Minimal Argon2 cost so 1,000 pairs stay fast; the verifier reads cost out
// of the PHC string, so correctness is identical at production cost.
const TEST_PARAMS: HashParams = HashParams {
    m_cost: 256,
    t_cost: 1,
    p_cost: 1,
};

fn random_secret(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[test]
fn thousand_random_pairs_verify_correctly() {
    for _ in 0..1_000 {
        let s1 = random_secret(12);
        let mut s2 = random_secret(12);
        while s2 == s1 {
            s2 = random_secret(12);
        }

        let cred = hash_secret_with_params(&s1, &TEST_PARAMS).unwrap();
        assert!(verify_secret(&s1, &cred));
        assert!(!verify_secret(&s2, &cred));
    }
}

#[test]
fn verification_survives_cost_differences() {
    let heavy = HashParams {
        m_cost: 8192,
        t_cost: 2,
        p_cost: 1,
    };
    let cred = hash_secret_with_params("portable-secret", &heavy).unwrap();
    assert!(verify_secret("portable-secret", &cred));
    assert!(!verify_secret("Portable-secret", &cred));
}

#[test]
fn near_miss_secrets_fail() {
    let cred = hash_secret_with_params("correct-key-123", &TEST_PARAMS).unwrap();
    for wrong in ["correct-key-12", "correct-key-1234", "correct-key-124", " correct-key-123"] {
        assert!(!verify_secret(wrong, &cred), "{wrong:?} should not verify");
    }
}
