//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use chrono::{DateTime, Datelike, Utc};
use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{Result, VaultError};
use crate::store::SqliteStore;
use crate::throttle::SqliteThrottle;
use crate::vault::VaultEngine;

/// Environment variable consulted for the password before prompting.
pub const PASSWORD_ENV: &str = "ONCEVAULT_PASSWORD";

/// The engine as the CLI wires it: SQLite for records and for attempts.
pub type CliEngine = VaultEngine<SqliteStore, SqliteThrottle>;

/// OnceVault CLI: one-time secrets sealed with a password.
#[derive(Parser)]
#[command(
    name = "oncevault",
    about = "One-time secret vault: seal a secret, share a code, read it once",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database file (default: from .oncevault.toml, else .oncevault/vault.db)
    #[arg(long, global = true)]
    pub db: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Seal a secret and print its retrieval code
    Submit {
        /// Secret text (omit to pipe it in or type it at a prompt)
        secret: Option<String>,

        /// How long the secret stays retrievable (e.g. 30m, 24h, 7d)
        #[arg(short, long, default_value = "24h")]
        expires_in: String,
    },

    /// Show whether a code is ready, expired, consumed, or unknown
    Inspect {
        /// Retrieval code
        code: String,

        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },

    /// Retrieve a secret (works once)
    Unlock {
        /// Retrieval code
        code: String,

        /// Identity the attempt is throttled under
        #[arg(long, env = "ONCEVAULT_CLIENT", default_value = "local")]
        client: String,
    },

    /// Delete consumed and expired secrets and stale attempt records
    Purge,

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolve the database path: `--db` first, then settings.
pub fn database_path(cli: &Cli, settings: &Settings) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(match &cli.db {
        Some(db) => cwd.join(db),
        None => settings.database_path(&cwd),
    })
}

/// Load settings from the working directory and build the engine.
pub fn open_engine(cli: &Cli) -> Result<CliEngine> {
    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;
    let path = database_path(cli, &settings)?;

    let store = SqliteStore::open(&path)?;
    let throttle = SqliteThrottle::open(&path, settings.throttle_policy()?)?;
    VaultEngine::with_config(store, throttle, settings.engine_config())
}

/// Get the password for an unlock, trying in order:
/// 1. `ONCEVAULT_PASSWORD` env var
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Password")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation (used by `submit`).
///
/// Also respects `ONCEVAULT_PASSWORD` for scripted usage.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Choose a password for this secret")
        .with_confirmation("Confirm password", "Passwords do not match, try again")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

fn password_from_env() -> Option<Zeroizing<String>> {
    match std::env::var(PASSWORD_ENV) {
        Ok(pw) if !pw.is_empty() => Some(Zeroizing::new(pw)),
        _ => None,
    }
}

/// Turn a human-friendly lifetime like "7d", "24h", "30m" into an expiry instant.
///
/// The result must land in a four-digit year; the store cannot keep anything later.
pub fn expiry_from_now(input: &str) -> Result<DateTime<Utc>> {
    Utc::now()
        .checked_add_signed(parse_lifetime(input)?)
        .filter(|expiry| expiry.year() <= MAX_EXPIRY_YEAR)
        .ok_or_else(|| {
            VaultError::InvalidInput(format!("invalid lifetime '{input}' — too far in the future"))
        })
}

/// Last calendar year an expiry may fall in.
const MAX_EXPIRY_YEAR: i32 = 9999;

/// Parse "7d" / "24h" / "30m" into a strictly positive duration.
pub fn parse_lifetime(input: &str) -> Result<chrono::Duration> {
    let input = input.trim();

    let (num_str, unit) = if let Some(s) = input.strip_suffix('d') {
        (s, 'd')
    } else if let Some(s) = input.strip_suffix('h') {
        (s, 'h')
    } else if let Some(s) = input.strip_suffix('m') {
        (s, 'm')
    } else {
        return Err(VaultError::InvalidInput(format!(
            "invalid lifetime '{input}' — use a format like 7d, 24h, or 30m"
        )));
    };

    let num: i64 = num_str.parse().map_err(|_| {
        VaultError::InvalidInput(format!(
            "invalid lifetime '{input}' — number part is not valid"
        ))
    })?;

    if num <= 0 {
        return Err(VaultError::InvalidInput(format!(
            "invalid lifetime '{input}' — the secret must expire in the future"
        )));
    }

    let duration = match unit {
        'd' => chrono::Duration::try_days(num),
        'h' => chrono::Duration::try_hours(num),
        _ => chrono::Duration::try_minutes(num),
    };

    duration.ok_or_else(|| {
        VaultError::InvalidInput(format!("invalid lifetime '{input}' — too far in the future"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifetime_units() {
        assert_eq!(parse_lifetime("7d").unwrap(), chrono::Duration::days(7));
        assert_eq!(parse_lifetime("24h").unwrap(), chrono::Duration::hours(24));
        assert_eq!(parse_lifetime("30m").unwrap(), chrono::Duration::minutes(30));
        assert_eq!(parse_lifetime(" 1h ").unwrap(), chrono::Duration::hours(1));
    }

    #[test]
    fn lifetime_rejects_garbage() {
        assert!(parse_lifetime("abc").is_err());
        assert!(parse_lifetime("7x").is_err());
        assert!(parse_lifetime("d").is_err());
        assert!(parse_lifetime("").is_err());
    }

    #[test]
    fn lifetime_must_be_positive() {
        assert!(parse_lifetime("0h").is_err());
        assert!(parse_lifetime("-5m").is_err());
    }

    #[test]
    fn lifetime_rejects_overflow() {
        assert!(parse_lifetime(&format!("{}d", i64::MAX)).is_err());
    }

    #[test]
    fn expiry_past_year_9999_is_rejected() {
        // Parses as a duration, but lands in year 10240.
        assert!(parse_lifetime("3000000d").is_ok());
        let err = expiry_from_now("3000000d").unwrap_err();
        assert!(matches!(err, VaultError::InvalidInput(ref m) if m.contains("too far")));

        let ok = expiry_from_now("36500d").unwrap();
        assert!(ok.year() <= MAX_EXPIRY_YEAR);
    }

    #[test]
    fn expiry_is_in_the_future() {
        let expiry = expiry_from_now("1h").unwrap();
        let diff = expiry - Utc::now();
        assert!((diff.num_minutes() - 60).abs() <= 1);
    }
}
