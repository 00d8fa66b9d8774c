//! One module per subcommand, each exposing `execute`.

pub mod completions;
pub mod inspect;
pub mod purge;
pub mod submit;
pub mod unlock;
