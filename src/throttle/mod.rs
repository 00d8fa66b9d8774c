//! Password-attempt throttling behind the `RetrievalThrottle` trait.
//!
//! A throttle answers one question per unlock attempt: may this key try
//! now?  Asking *is* the attempt, so an `Allowed` answer consumes one slot
//! of the window whether the password turns out right or wrong.
//!
//! Implementations:
//! - `SlidingWindowThrottle` (`window`): in-process, for long-lived hosts.
//! - `SqliteThrottle` (`sqlite`): persisted next to the record store, so
//!   separate CLI invocations share one budget.

pub mod sqlite;
pub mod window;

pub use sqlite::SqliteThrottle;
pub use window::SlidingWindowThrottle;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Verdict for a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    Allowed,
    Denied { retry_after: Duration },
}

/// How many attempts fit in how long a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottlePolicy {
    pub max_attempts: u32,
    pub window: Duration,
}

impl Default for ThrottlePolicy {
    /// Three attempts per minute.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            window: Duration::from_secs(60),
        }
    }
}

/// What a throttle bucket is keyed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThrottleScope {
    /// One budget per client (network origin, CLI `--client`, ...).
    #[default]
    Client,
    /// One budget per code, shared by every client.  Stops a distributed
    /// guesser but lets anyone lock the recipient out for a window.
    Code,
}

impl ThrottleScope {
    /// Bucket key for an attempt by `client` against `code`.
    pub fn key(self, client: &str, code: &str) -> String {
        match self {
            Self::Client => format!("client:{client}"),
            Self::Code => format!("code:{code}"),
        }
    }
}

/// Rate limiter consulted before any unlock attempt.
pub trait RetrievalThrottle: Send + Sync {
    /// Record an attempt for `key` if the budget allows it.
    fn check_and_consume(&self, key: &str) -> Result<ThrottleDecision>;
}

impl<T: RetrievalThrottle + ?Sized> RetrievalThrottle for std::sync::Arc<T> {
    fn check_and_consume(&self, key: &str) -> Result<ThrottleDecision> {
        (**self).check_and_consume(key)
    }
}
