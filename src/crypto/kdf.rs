//! Password-based key derivation using PBKDF2-HMAC-SHA256.
//!
//! Every record gets its own random salt; the same password + salt +
//! iteration count always yields the same key, so nothing key-shaped is
//! ever persisted.  The iteration count is what makes an offline guess
//! against a stolen row expensive.

use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};

/// Length of the per-record salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Default PBKDF2 round count.
pub const DEFAULT_ITERATIONS: u32 = 480_000;

/// Lowest round count we will ever run with.
pub const MIN_ITERATIONS: u32 = 1_000;

/// Tunable PBKDF2 parameters.
///
/// Maps 1:1 to `Settings::kdf_iterations` so deployments can raise the
/// cost without touching code.  Lowering it only affects records created
/// afterwards *and* makes old records unreadable, so treat it as fixed
/// per database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl KdfParams {
    /// Reject parameter sets that would make derivation trivially cheap.
    pub fn validate(&self) -> Result<()> {
        if self.iterations < MIN_ITERATIONS {
            return Err(VaultError::KeyDerivationFailed(format!(
                "PBKDF2 iterations must be at least {MIN_ITERATIONS} (got {})",
                self.iterations
            )));
        }
        Ok(())
    }
}

/// Derive a 32-byte key from a password and salt.
///
/// The key is wrapped in `Zeroizing` so it is wiped when dropped.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    params.validate()?;
    if salt.is_empty() {
        return Err(VaultError::KeyDerivationFailed("salt cannot be empty".into()));
    }

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, params.iterations, &mut key[..]);
    Ok(key)
}

/// Generate a cryptographically random salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: KdfParams = KdfParams {
        iterations: MIN_ITERATIONS,
    };

    #[test]
    fn default_params_match_documented_cost() {
        assert_eq!(KdfParams::default().iterations, 480_000);
        assert!(KdfParams::default().validate().is_ok());
    }

    #[test]
    fn rejects_iterations_below_floor() {
        let weak = KdfParams { iterations: 10 };
        let result = derive_key(b"pw", &[1u8; SALT_LEN], &weak);
        assert!(matches!(result, Err(VaultError::KeyDerivationFailed(_))));
    }

    #[test]
    fn rejects_empty_salt() {
        assert!(derive_key(b"pw", &[], &FAST).is_err());
    }

    #[test]
    fn matches_rfc_6070_style_vector() {
        // PBKDF2-HMAC-SHA256("password", "salt", 4096) first 32 bytes.
        let params = KdfParams { iterations: 4096 };
        let key = derive_key(b"password", b"salt", &params).unwrap();
        let expected: [u8; 32] = [
            0xc5, 0xe4, 0x78, 0xd5, 0x92, 0x88, 0xc8, 0x41, 0xaa, 0x53, 0x0d, 0xb6, 0x84, 0x5c,
            0x4c, 0x8d, 0x96, 0x28, 0x93, 0xa0, 0x01, 0xce, 0x4e, 0x11, 0xa4, 0x96, 0x38, 0x73,
            0xaa, 0x98, 0x13, 0x4a,
        ];
        assert_eq!(*key, expected);
    }

    #[test]
    fn salts_are_fresh() {
        assert_ne!(generate_salt(), generate_salt());
    }
}
