//! Vault module — one-time secret lifecycle.
//!
//! This module provides:
//! - Retrieval codes (`code`)
//! - The persisted `VaultRecord` and its text encodings (`record`)
//! - `VaultEngine`, which seals, inspects, and releases secrets (`engine`)

pub mod code;
pub mod engine;
pub mod record;

// Re-export the most commonly used items.
pub use code::Code;
pub use engine::{EngineConfig, SecretStatus, UnlockOutcome, VaultEngine};
pub use record::VaultRecord;
