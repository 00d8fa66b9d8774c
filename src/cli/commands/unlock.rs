//! `oncevault unlock` — retrieve a secret, consuming it.

use std::time::Duration;

use crate::cli::output;
use crate::cli::{open_engine, prompt_password, Cli};
use crate::errors::{Result, VaultError};
use crate::vault::UnlockOutcome;

/// Execute the `unlock` command.
pub fn execute(cli: &Cli, code: &str, client: &str) -> Result<()> {
    let engine = open_engine(cli)?;
    let password = prompt_password()?;

    match engine.unlock_raw(client, code, &password)? {
        UnlockOutcome::Unlocked(secret) => {
            output::plain(&secret);
            Ok(())
        }
        other => Err(VaultError::UnlockRefused(refusal_message(&other))),
    }
}

/// User-facing wording for everything except a successful unlock.
fn refusal_message(outcome: &UnlockOutcome) -> String {
    match outcome {
        UnlockOutcome::WrongPassword => "Incorrect password.".to_string(),
        UnlockOutcome::WrongCode => "Invalid code, please try again.".to_string(),
        UnlockOutcome::Consumed => "This secret has already been retrieved.".to_string(),
        UnlockOutcome::RateLimited { retry_after } => format!(
            "Too many attempts, try again in {}.",
            format_wait(*retry_after)
        ),
        UnlockOutcome::Unlocked(_) => String::new(),
    }
}

/// "45s", "2m 5s": rounded up so we never tell someone to retry too early.
fn format_wait(wait: Duration) -> String {
    let mut secs = wait.as_secs();
    if wait.subsec_nanos() > 0 {
        secs += 1;
    }
    match (secs / 60, secs % 60) {
        (0, s) => format!("{s}s"),
        (m, 0) => format!("{m}m"),
        (m, s) => format!("{m}m {s}s"),
    }
}
