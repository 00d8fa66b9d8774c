//! Fast one-way password verifier stored alongside each record.
//!
//! This is a plain SHA-256 digest, hex encoded.  It is kept for
//! operators who want to correlate rows, and it is never consulted
//! before decryption: the AEAD tag check is the only gate.

use std::fmt::Write;

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of the raw password bytes.
pub fn password_verifier(password: &[u8]) -> String {
    let digest = Sha256::digest(password);
    digest
        .iter()
        .fold(String::with_capacity(64), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
}
