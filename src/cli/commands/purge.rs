//! `oncevault purge` — housekeeping for dead rows.
//!
//! Removes consumed and expired secrets, plus attempt records that have
//! aged out of the throttle window.  Nothing retrievable is touched.

use chrono::Utc;

use crate::cli::output;
use crate::cli::{open_engine, Cli};
use crate::errors::Result;

/// Execute the `purge` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let engine = open_engine(cli)?;
    let now = Utc::now();

    let secrets = engine.store().purge(now)?;
    let attempts = engine.throttle().purge(now)?;

    if secrets == 0 && attempts == 0 {
        output::info("Nothing to purge.");
    } else {
        output::success(&format!(
            "Purged {secrets} dead secret(s) and {attempts} stale attempt record(s)."
        ));
    }

    Ok(())
}
