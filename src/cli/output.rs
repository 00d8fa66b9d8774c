//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.  Secrets and codes are
//! printed bare (see `plain`) so they can be piped.

use console::style;

use crate::vault::SecretStatus;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a value with no decoration, for piping.
pub fn plain(value: &str) {
    println!("{value}");
}

/// Human wording for an inspect result.
pub fn describe_status(status: SecretStatus) -> &'static str {
    match status {
        SecretStatus::Ready => "Ready: enter the password to retrieve it.",
        SecretStatus::Expired => "Code has expired.",
        SecretStatus::Consumed => "This secret has already been retrieved.",
        SecretStatus::NotFound => "Invalid code, please try again.",
    }
}

/// Print an inspect result, colored by whether the code is usable.
pub fn print_status(code: &str, status: SecretStatus) {
    let text = describe_status(status);
    match status {
        SecretStatus::Ready => success(&format!("{} {text}", style(code).bold())),
        _ => warning(&format!("{} {text}", style(code).bold())),
    }
}
