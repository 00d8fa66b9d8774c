//! `VaultRecord`: the persisted unit for one secret.
//!
//! Binary fields (`salt`, `ciphertext`) live in memory as raw bytes and
//! are converted to base64 text only at the storage boundary, via
//! `encode_bytes` / `decode_bytes`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};

use super::code::Code;
use crate::errors::{Result, VaultError};

/// One sealed secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultRecord {
    /// Public retrieval code.
    pub code: Code,

    /// Instant at which the record stops being retrievable.
    pub expiry: DateTime<Utc>,

    /// Hex SHA-256 of the password. Never used as a gate.
    pub password_verifier: String,

    /// Per-record PBKDF2 salt.
    pub salt: Vec<u8>,

    /// nonce || AES-256-GCM ciphertext + tag.
    pub ciphertext: Vec<u8>,

    /// `true` until the first successful unlock.
    pub active: bool,

    pub created_at: DateTime<Utc>,
}

impl VaultRecord {
    /// `true` once `now` has reached the expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiry
    }
}

/// Encode bytes for a text column.
pub fn encode_bytes(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Decode a text column back into bytes, attributing failures to `code`.
pub fn decode_bytes(code: &str, field: &str, text: &str) -> Result<Vec<u8>> {
    BASE64.decode(text).map_err(|e| VaultError::CorruptRecord {
        code: code.to_string(),
        reason: format!("{field} is not valid base64: {e}"),
    })
}
