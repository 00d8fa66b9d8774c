//! Integration tests for the OnceVault crypto module.

use oncevault::crypto::encryption::{NONCE_LEN, TAG_LEN};
use oncevault::crypto::kdf::{KdfParams, MIN_ITERATIONS, SALT_LEN};
use oncevault::crypto::{decrypt, derive_key, encrypt, generate_salt, password_verifier};
use oncevault::errors::VaultError;

const FAST: KdfParams = KdfParams {
    iterations: MIN_ITERATIONS,
};

/// Password -> key -> ciphertext, the way `submit` seals a secret.
fn seal(password: &str, salt: &[u8], secret: &[u8]) -> Vec<u8> {
    let key = derive_key(password.as_bytes(), salt, &FAST).expect("derive");
    encrypt(&key[..], secret).expect("encrypt")
}

fn open(password: &str, salt: &[u8], sealed: &[u8]) -> Result<Vec<u8>, VaultError> {
    let key = derive_key(password.as_bytes(), salt, &FAST).expect("derive");
    decrypt(&key[..], sealed)
}

// ---------------------------------------------------------------------------
// Password round-trip
// ---------------------------------------------------------------------------

#[test]
fn password_sealed_secret_roundtrips() {
    let salt = generate_salt();
    let sealed = seal("correct horse battery staple", &salt, b"launch code 0000");

    assert_eq!(sealed.len(), NONCE_LEN + b"launch code 0000".len() + TAG_LEN);
    let opened = open("correct horse battery staple", &salt, &sealed).expect("open");
    assert_eq!(opened, b"launch code 0000");
}

#[test]
fn wrong_password_is_an_authentication_failure() {
    let salt = generate_salt();
    let sealed = seal("right", &salt, b"secret");

    let err = open("wrong", &salt, &sealed).unwrap_err();
    assert!(matches!(err, VaultError::AuthenticationFailure));
}

#[test]
fn right_password_with_wrong_salt_fails() {
    let sealed = seal("pw", &[1u8; SALT_LEN], b"secret");
    let err = open("pw", &[2u8; SALT_LEN], &sealed).unwrap_err();
    assert!(matches!(err, VaultError::AuthenticationFailure));
}

#[test]
fn tampered_ciphertext_is_an_authentication_failure() {
    let salt = generate_salt();
    let mut sealed = seal("pw", &salt, b"do not touch");
    let last = sealed.len() - 1;
    sealed[last] ^= 0x01;

    let err = open("pw", &salt, &sealed).unwrap_err();
    assert!(matches!(err, VaultError::AuthenticationFailure));
}

#[test]
fn truncated_ciphertext_is_an_authentication_failure() {
    let key = [0x42u8; 32];
    for len in [0, NONCE_LEN - 1, NONCE_LEN, NONCE_LEN + TAG_LEN - 1] {
        let err = decrypt(&key, &vec![0u8; len]).unwrap_err();
        assert!(
            matches!(err, VaultError::AuthenticationFailure),
            "length {len}"
        );
    }
}

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

#[test]
fn derivation_is_deterministic_per_password_and_salt() {
    let salt = [7u8; SALT_LEN];
    let a = derive_key(b"pw", &salt, &FAST).unwrap();
    let b = derive_key(b"pw", &salt, &FAST).unwrap();
    let c = derive_key(b"pw2", &salt, &FAST).unwrap();
    let d = derive_key(b"pw", &[8u8; SALT_LEN], &FAST).unwrap();

    assert_eq!(*a, *b);
    assert_ne!(*a, *c);
    assert_ne!(*a, *d);
}

#[test]
fn iteration_count_changes_the_key() {
    let salt = [9u8; SALT_LEN];
    let low = derive_key(b"pw", &salt, &FAST).unwrap();
    let high = derive_key(
        b"pw",
        &salt,
        &KdfParams {
            iterations: MIN_ITERATIONS + 1,
        },
    )
    .unwrap();
    assert_ne!(*low, *high);
}

#[test]
fn too_few_iterations_are_refused() {
    let weak = KdfParams {
        iterations: MIN_ITERATIONS - 1,
    };
    let err = derive_key(b"pw", &[0u8; SALT_LEN], &weak).unwrap_err();
    assert!(matches!(err, VaultError::KeyDerivationFailed(_)));
}

#[test]
fn salts_are_fresh() {
    assert_ne!(generate_salt(), generate_salt());
}

// ---------------------------------------------------------------------------
// Verifier
// ---------------------------------------------------------------------------

#[test]
fn verifier_is_hex_sha256_and_not_the_key() {
    let verifier = password_verifier(b"pw");
    assert_eq!(verifier.len(), 64);
    assert!(verifier.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    assert_eq!(verifier, password_verifier(b"pw"));

    let key = derive_key(b"pw", &[0u8; SALT_LEN], &FAST).unwrap();
    let key_hex: String = key.iter().map(|b| format!("{b:02x}")).collect();
    assert_ne!(verifier, key_hex);
}
