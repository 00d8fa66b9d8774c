//! `oncevault inspect` — report a code's status without a password.

use serde::Serialize;

use crate::cli::output;
use crate::cli::{open_engine, Cli};
use crate::errors::{Result, VaultError};
use crate::vault::SecretStatus;

#[derive(Serialize)]
struct Report<'a> {
    code: &'a str,
    status: SecretStatus,
}

/// Execute the `inspect` command.
pub fn execute(cli: &Cli, code: &str, json: bool) -> Result<()> {
    let engine = open_engine(cli)?;
    let status = engine.inspect_raw(code)?;

    if json {
        let report = serde_json::to_string(&Report { code, status })
            .map_err(|e| VaultError::SerializationError(format!("status report: {e}")))?;
        output::plain(&report);
    } else {
        output::print_status(code, status);
    }

    Ok(())
}
