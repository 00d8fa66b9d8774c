//! Record storage behind the `VaultStore` trait.
//!
//! The engine only ever needs three operations, and each one must be
//! atomic on its own:
//! - `create_unique`: insert, failing with `CodeCollision` when the code
//!   is already present (enforced by the store, not by a prior lookup).
//! - `find_by_code`: fetch the most recent row for a code.
//! - `deactivate_if_active`: conditional `active 1 -> 0`, reporting how
//!   many rows changed. A `0` means someone else consumed it first.
//!
//! Implementations:
//! - `SqliteStore` (`sqlite`): file-backed, one connection per call.
//! - `MemoryStore` (`memory`): in-process, for embedding and tests.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::errors::Result;
use crate::vault::{Code, VaultRecord};

/// Storage operations consumed by `VaultEngine`.
pub trait VaultStore: Send + Sync {
    /// Insert a new record; `Err(VaultError::CodeCollision)` if the code exists.
    fn create_unique(&self, record: &VaultRecord) -> Result<()>;

    /// Most recently created record for `code`, if any.
    fn find_by_code(&self, code: &Code) -> Result<Option<VaultRecord>>;

    /// Atomically flip `active` to `0` where it is still `1`.
    ///
    /// Returns the number of rows changed: `1` for the caller that won,
    /// `0` for everyone else.
    fn deactivate_if_active(&self, code: &Code) -> Result<usize>;
}

impl<S: VaultStore + ?Sized> VaultStore for std::sync::Arc<S> {
    fn create_unique(&self, record: &VaultRecord) -> Result<()> {
        (**self).create_unique(record)
    }

    fn find_by_code(&self, code: &Code) -> Result<Option<VaultRecord>> {
        (**self).find_by_code(code)
    }

    fn deactivate_if_active(&self, code: &Code) -> Result<usize> {
        (**self).deactivate_if_active(code)
    }
}
