//! Configuration loaded from `.oncevault.toml`.

pub mod settings;

pub use settings::Settings;
