//! SQLite-persisted sliding-window throttle.
//!
//! Attempts are rows in `unlock_attempts`.  Each check runs in a
//! `BEGIN IMMEDIATE` transaction so two processes cannot both read
//! "two attempts so far" and both insert a third.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, TransactionBehavior};
use tracing::warn;

use super::{RetrievalThrottle, ThrottleDecision, ThrottlePolicy};
use crate::errors::{Result, VaultError};
use crate::store::sqlite::{connect, format_timestamp};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS unlock_attempts (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    throttle_key TEXT NOT NULL,
    attempted_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_unlock_attempts_key
    ON unlock_attempts (throttle_key, attempted_at);
";

/// Throttle whose state survives process restarts.
#[derive(Debug, Clone)]
pub struct SqliteThrottle {
    path: PathBuf,
    policy: ThrottlePolicy,
    window: chrono::Duration,
}

impl SqliteThrottle {
    /// Open (or create) the attempts table in the database at `path`.
    pub fn open(path: &Path, policy: ThrottlePolicy) -> Result<Self> {
        let window = chrono::Duration::from_std(policy.window)
            .map_err(|e| VaultError::ConfigError(format!("throttle window out of range: {e}")))?;

        let conn = connect(path)?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            path: path.to_path_buf(),
            policy,
            window,
        })
    }

    /// Same as `check_and_consume`, with the clock supplied by the caller.
    pub fn check_and_consume_at(&self, key: &str, now: DateTime<Utc>) -> Result<ThrottleDecision> {
        let mut conn = connect(&self.path)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let cutoff = format_timestamp(now - self.window);
        tx.execute(
            "DELETE FROM unlock_attempts WHERE throttle_key = ?1 AND attempted_at <= ?2",
            params![key, cutoff],
        )?;

        let (count, oldest): (i64, Option<String>) = tx.query_row(
            "SELECT COUNT(*), MIN(attempted_at) FROM unlock_attempts WHERE throttle_key = ?1",
            params![key],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let decision = if count >= i64::from(self.policy.max_attempts) {
            let retry_after = oldest
                .as_deref()
                .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
                .and_then(|first| (first.with_timezone(&Utc) + self.window - now).to_std().ok())
                .unwrap_or(Duration::ZERO);
            warn!(key, ?retry_after, "unlock attempt throttled");
            ThrottleDecision::Denied { retry_after }
        } else {
            tx.execute(
                "INSERT INTO unlock_attempts (throttle_key, attempted_at) VALUES (?1, ?2)",
                params![key, format_timestamp(now)],
            )?;
            ThrottleDecision::Allowed
        };

        tx.commit()?;
        Ok(decision)
    }

    /// Drop every attempt that has aged out of the window as of `now`.
    pub fn purge(&self, now: DateTime<Utc>) -> Result<usize> {
        let conn = connect(&self.path)?;
        let removed = conn.execute(
            "DELETE FROM unlock_attempts WHERE attempted_at <= ?1",
            params![format_timestamp(now - self.window)],
        )?;
        Ok(removed)
    }
}

impl RetrievalThrottle for SqliteThrottle {
    fn check_and_consume(&self, key: &str) -> Result<ThrottleDecision> {
        self.check_and_consume_at(key, Utc::now())
    }
}
