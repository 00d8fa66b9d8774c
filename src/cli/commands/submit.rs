//! `oncevault submit` — seal a secret and print its code.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{expiry_from_now, open_engine, prompt_new_password, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `submit` command.
pub fn execute(cli: &Cli, secret: Option<&str>, expires_in: &str) -> Result<()> {
    // Validate the lifetime before asking the user for anything.
    let expiry = expiry_from_now(expires_in)?;

    // Determine the secret from one of three sources.
    let secret_value = Zeroizing::new(if let Some(s) = secret {
        // Source 1: Inline value on the command line.
        output::warning("Secret provided on command line — it may appear in shell history.");
        s.to_string()
    } else if !io::stdin().is_terminal() {
        // Source 2: Piped input (stdin is not a terminal).
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf.trim_end().to_string()
    } else {
        // Source 3: Interactive secure prompt (default).
        dialoguer::Password::new()
            .with_prompt("Enter the secret")
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("input prompt: {e}")))?
    });

    let password = prompt_new_password()?;
    let engine = open_engine(cli)?;
    let code = engine.submit(&password, expiry, &secret_value)?;

    output::success(&format!(
        "Secret sealed until {}. Share this code:",
        expiry.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output::plain(code.as_str());
    output::tip("Send the password through a different channel than the code.");

    Ok(())
}
