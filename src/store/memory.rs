//! In-process `VaultStore` backed by a mutex-guarded `Vec`.
//!
//! Every operation runs under a single guard, which gives the same
//! atomicity the SQLite store gets from its unique index and
//! conditional `UPDATE`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::VaultStore;
use crate::errors::{Result, VaultError};
use crate::vault::{Code, VaultRecord};

/// Volatile record store.  Rows vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<VaultRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently held, active or not.
    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn rows(&self) -> MutexGuard<'_, Vec<VaultRecord>> {
        // A panic while holding the guard cannot leave a half-written
        // row behind (every mutation is a single push or flag store).
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl VaultStore for MemoryStore {
    fn create_unique(&self, record: &VaultRecord) -> Result<()> {
        let mut rows = self.rows();
        if rows.iter().any(|r| r.code == record.code) {
            return Err(VaultError::CodeCollision(record.code.to_string()));
        }
        rows.push(record.clone());
        Ok(())
    }

    fn find_by_code(&self, code: &Code) -> Result<Option<VaultRecord>> {
        Ok(self.rows().iter().rev().find(|r| &r.code == code).cloned())
    }

    fn deactivate_if_active(&self, code: &Code) -> Result<usize> {
        let mut rows = self.rows();
        let mut changed = 0;
        for row in rows.iter_mut().filter(|r| &r.code == code && r.active) {
            row.active = false;
            changed += 1;
        }
        Ok(changed)
    }
}
