//! `VaultEngine`: the secret lifecycle.
//!
//! Three entry points, and no others mutate state:
//! - `submit`  seals a secret under a password and returns its code.
//! - `inspect` reports a code's status without a password.
//! - `unlock`  releases the plaintext at most once, ever.
//!
//! The engine owns no shared mutable state; the store and the throttle
//! are injected and carry all of it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use zeroize::{Zeroize, Zeroizing};

use super::code::Code;
use super::record::VaultRecord;
use crate::crypto::kdf::SALT_LEN;
use crate::crypto::{decrypt, derive_key, encrypt, generate_salt, password_verifier, KdfParams};
use crate::errors::{Result, VaultError};
use crate::store::VaultStore;
use crate::throttle::{RetrievalThrottle, ThrottleDecision, ThrottleScope};

/// Salt for the decoy derivation run on dead codes.
const DECOY_SALT: &[u8; SALT_LEN] = b"oncevault-decoy!";

/// Default bound on code generation attempts per submit.
pub const DEFAULT_MAX_CODE_ATTEMPTS: u32 = 16;

/// What `inspect` can say about a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecretStatus {
    NotFound,
    Expired,
    Consumed,
    Ready,
}

impl SecretStatus {
    fn of(record: &VaultRecord, now: DateTime<Utc>) -> Self {
        if !record.active {
            Self::Consumed
        } else if record.is_expired_at(now) {
            Self::Expired
        } else {
            Self::Ready
        }
    }
}

/// Result of an unlock attempt.
///
/// Only `Unlocked` carries data; the plaintext is wiped when dropped.
#[derive(Debug, PartialEq, Eq)]
pub enum UnlockOutcome {
    Unlocked(Zeroizing<String>),
    /// No retrievable secret under this code (unknown or expired).
    WrongCode,
    /// The password did not decrypt the secret. Nothing changed.
    WrongPassword,
    /// Someone already retrieved it.
    Consumed,
    /// Too many attempts; nothing was checked.
    RateLimited { retry_after: Duration },
}

impl UnlockOutcome {
    pub fn is_unlocked(&self) -> bool {
        matches!(self, Self::Unlocked(_))
    }

    /// The plaintext, if this attempt won it.
    pub fn into_plaintext(self) -> Option<Zeroizing<String>> {
        match self {
            Self::Unlocked(plaintext) => Some(plaintext),
            _ => None,
        }
    }
}

/// Engine tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub kdf: KdfParams,
    pub max_code_attempts: u32,
    pub throttle_scope: ThrottleScope,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kdf: KdfParams::default(),
            max_code_attempts: DEFAULT_MAX_CODE_ATTEMPTS,
            throttle_scope: ThrottleScope::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        self.kdf.validate()?;
        if self.max_code_attempts < 1 {
            return Err(VaultError::ConfigError(
                "max_code_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Orchestrates code allocation, sealing, and one-shot release.
pub struct VaultEngine<S, T> {
    store: S,
    throttle: T,
    config: EngineConfig,
}

impl<S: VaultStore, T: RetrievalThrottle> VaultEngine<S, T> {
    /// Engine with default tuning (480 000 PBKDF2 rounds, per-client throttle).
    pub fn new(store: S, throttle: T) -> Self {
        Self {
            store,
            throttle,
            config: EngineConfig::default(),
        }
    }

    /// Engine with explicit tuning, validated up front.
    pub fn with_config(store: S, throttle: T, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            throttle,
            config,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn throttle(&self) -> &T {
        &self.throttle
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Submit
    // ------------------------------------------------------------------

    /// Seal `secret` under `password` until `expiry` and return its code.
    ///
    /// The expiry is taken as given; rejecting past instants is the
    /// caller's call.  Either one row is written or none is.
    pub fn submit(&self, password: &str, expiry: DateTime<Utc>, secret: &str) -> Result<Code> {
        if password.is_empty() {
            return Err(VaultError::InvalidInput("password cannot be empty".into()));
        }

        let salt = generate_salt();
        let key = derive_key(password.as_bytes(), &salt, &self.config.kdf)?;
        let ciphertext = encrypt(&key[..], secret.as_bytes())?;
        drop(key);

        let mut record = VaultRecord {
            code: Code::generate(),
            expiry,
            password_verifier: password_verifier(password.as_bytes()),
            salt: salt.to_vec(),
            ciphertext,
            active: true,
            created_at: Utc::now(),
        };

        for attempt in 1..=self.config.max_code_attempts {
            if attempt > 1 {
                record.code = Code::generate();
            }

            // Cheap pre-check; the unique index is what actually decides.
            if self.store.find_by_code(&record.code)?.is_some() {
                debug!(attempt, "generated code already in use, regenerating");
                continue;
            }

            match self.store.create_unique(&record) {
                Ok(()) => {
                    info!(code = %record.code, %expiry, "secret sealed");
                    return Ok(record.code);
                }
                Err(VaultError::CodeCollision(_)) => {
                    warn!(attempt, "code collided on insert, regenerating");
                }
                Err(e) => return Err(e),
            }
        }

        Err(VaultError::CodeSpaceExhausted(self.config.max_code_attempts))
    }

    // ------------------------------------------------------------------
    // Inspect
    // ------------------------------------------------------------------

    /// Status of `code` right now.  No password, no throttle, no writes.
    pub fn inspect(&self, code: &Code) -> Result<SecretStatus> {
        self.inspect_at(code, Utc::now())
    }

    /// `inspect` for untrusted text; malformed codes are simply not found.
    pub fn inspect_raw(&self, code: &str) -> Result<SecretStatus> {
        match Code::parse(code) {
            Ok(code) => self.inspect(&code),
            Err(_) => Ok(SecretStatus::NotFound),
        }
    }

    fn inspect_at(&self, code: &Code, now: DateTime<Utc>) -> Result<SecretStatus> {
        let status = match self.store.find_by_code(code)? {
            None => SecretStatus::NotFound,
            Some(record) => SecretStatus::of(&record, now),
        };
        debug!(%code, ?status, "inspected");
        Ok(status)
    }

    // ------------------------------------------------------------------
    // Unlock
    // ------------------------------------------------------------------

    /// Try to release the secret under `code` for `client`.
    ///
    /// At most one call per record ever returns `Unlocked`.  A wrong
    /// password leaves the record untouched.
    pub fn unlock(&self, client: &str, code: &Code, password: &str) -> Result<UnlockOutcome> {
        if let Some(limited) = self.gate(client, code.as_str())? {
            return Ok(limited);
        }
        self.unlock_gated(code, password, Utc::now())
    }

    /// `unlock` for untrusted code text.
    ///
    /// The throttle is charged before the code is even parsed, so probing
    /// with garbage costs the same budget as probing with real codes.
    pub fn unlock_raw(&self, client: &str, code: &str, password: &str) -> Result<UnlockOutcome> {
        if let Some(limited) = self.gate(client, code)? {
            return Ok(limited);
        }
        match Code::parse(code) {
            Ok(code) => self.unlock_gated(&code, password, Utc::now()),
            Err(_) => {
                self.decoy_derivation(password);
                Ok(UnlockOutcome::WrongCode)
            }
        }
    }

    /// Charge one attempt; `Some(RateLimited)` if the budget is spent.
    fn gate(&self, client: &str, code: &str) -> Result<Option<UnlockOutcome>> {
        let key = self.config.throttle_scope.key(client, code);
        match self.throttle.check_and_consume(&key)? {
            ThrottleDecision::Allowed => Ok(None),
            ThrottleDecision::Denied { retry_after } => {
                Ok(Some(UnlockOutcome::RateLimited { retry_after }))
            }
        }
    }

    fn unlock_gated(
        &self,
        code: &Code,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<UnlockOutcome> {
        // Re-validate from the store; never trust an earlier inspect.
        let record = match self.store.find_by_code(code)? {
            Some(record) => record,
            None => {
                self.decoy_derivation(password);
                return Ok(UnlockOutcome::WrongCode);
            }
        };

        // Expiry wins over the active flag: a dead record reveals nothing.
        if record.is_expired_at(now) {
            self.decoy_derivation(password);
            return Ok(UnlockOutcome::WrongCode);
        }
        if !record.active {
            self.decoy_derivation(password);
            return Ok(UnlockOutcome::Consumed);
        }

        let key = derive_key(password.as_bytes(), &record.salt, &self.config.kdf)?;
        let plaintext = match decrypt(&key[..], &record.ciphertext) {
            Ok(bytes) => bytes,
            Err(VaultError::AuthenticationFailure) => {
                debug!(%code, "wrong password");
                return Ok(UnlockOutcome::WrongPassword);
            }
            Err(e) => return Err(e),
        };
        drop(key);

        let plaintext = String::from_utf8(plaintext).map_err(|e| {
            let mut bad_bytes = e.into_bytes();
            bad_bytes.zeroize();
            VaultError::CorruptRecord {
                code: code.to_string(),
                reason: "secret is not valid UTF-8".into(),
            }
        })?;
        let plaintext = Zeroizing::new(plaintext);

        // The conditional write is the only thing standing between two
        // correct guesses and a double read.
        match self.store.deactivate_if_active(code)? {
            0 => {
                warn!(%code, "lost consumption race, discarding plaintext");
                Ok(UnlockOutcome::Consumed)
            }
            _ => {
                info!(%code, "secret released and consumed");
                Ok(UnlockOutcome::Unlocked(plaintext))
            }
        }
    }

    /// Burn one key derivation so dead codes answer as slowly as live ones.
    fn decoy_derivation(&self, password: &str) {
        let _ = derive_key(password.as_bytes(), DECOY_SALT, &self.config.kdf);
    }
}
