use clap::Parser;
use oncevault::cli::{Cli, Commands};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() {
    init_logging();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Submit {
            ref secret,
            ref expires_in,
        } => oncevault::cli::commands::submit::execute(&cli, secret.as_deref(), expires_in),
        Commands::Inspect { ref code, json } => {
            oncevault::cli::commands::inspect::execute(&cli, code, json)
        }
        Commands::Unlock {
            ref code,
            ref client,
        } => oncevault::cli::commands::unlock::execute(&cli, code, client),
        Commands::Purge => oncevault::cli::commands::purge::execute(&cli),
        Commands::Completions { shell } => oncevault::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        oncevault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Install the global subscriber.
///
/// Filter comes from `RUST_LOG` (e.g. `RUST_LOG=oncevault=debug`); the
/// default only shows errors so normal CLI output stays clean.  Logs go
/// to stderr, never stdout, which carries codes and secrets.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    let subscriber = FmtSubscriber::builder()
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Unable to set global default subscriber");
    }
}
