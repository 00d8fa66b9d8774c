//! SQLite-backed `VaultStore`.
//!
//! Stores one row per secret in `vault_records`:
//!
//! ```text
//! id | code | expiry | password_verifier | salt | ciphertext | active | created_at
//! ```
//!
//! - `code` carries a UNIQUE index, so two racing inserts cannot both win.
//! - `salt` and `ciphertext` are base64 text; timestamps are RFC 3339 UTC
//!   with a fixed width so they also compare correctly as strings.
//! - A fresh connection is opened per operation; SQLite's own locking
//!   (plus a busy timeout) serializes writers across threads and processes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use tracing::debug;

use super::VaultStore;
use crate::errors::{Result, VaultError};
use crate::vault::record::{decode_bytes, encode_bytes};
use crate::vault::{Code, VaultRecord};

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS vault_records (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    code              TEXT    NOT NULL,
    expiry            TEXT    NOT NULL,
    password_verifier TEXT    NOT NULL,
    salt              TEXT    NOT NULL,
    ciphertext        TEXT    NOT NULL,
    active            INTEGER NOT NULL DEFAULT 1 CHECK (active IN (0, 1)),
    created_at        TEXT    NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_vault_records_code ON vault_records (code);
";

/// File-backed record store.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and make sure the schema exists.
    ///
    /// Missing parent directories are created.  On Unix the file is
    /// restricted to its owner.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = connect(path)?;
        conn.execute_batch(SCHEMA)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(path, perms);
        }

        debug!(path = %path.display(), "opened record store");
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Path to the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete rows that can never be retrieved again: consumed ones and
    /// ones whose expiry is at or before `now`.
    ///
    /// Housekeeping only; the engine never calls this.
    pub fn purge(&self, now: DateTime<Utc>) -> Result<usize> {
        let conn = connect(&self.path)?;
        let removed = conn.execute(
            "DELETE FROM vault_records WHERE active = 0 OR expiry <= ?1",
            params![format_timestamp(now)],
        )?;
        debug!(removed, "purged dead records");
        Ok(removed)
    }
}

impl VaultStore for SqliteStore {
    fn create_unique(&self, record: &VaultRecord) -> Result<()> {
        let expiry = storable_timestamp("expiry", record.expiry)?;
        let created_at = storable_timestamp("created_at", record.created_at)?;

        let conn = connect(&self.path)?;
        let inserted = conn.execute(
            "INSERT INTO vault_records
                (code, expiry, password_verifier, salt, ciphertext, active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.code.as_str(),
                expiry,
                record.password_verifier,
                encode_bytes(&record.salt),
                encode_bytes(&record.ciphertext),
                i64::from(record.active),
                created_at,
            ],
        );

        match inserted {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(VaultError::CodeCollision(record.code.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn find_by_code(&self, code: &Code) -> Result<Option<VaultRecord>> {
        let conn = connect(&self.path)?;
        let raw = conn
            .query_row(
                "SELECT code, expiry, password_verifier, salt, ciphertext, active, created_at
                 FROM vault_records
                 WHERE code = ?1
                 ORDER BY id DESC
                 LIMIT 1",
                params![code.as_str()],
                |row| {
                    Ok(RawRecord {
                        code: row.get("code")?,
                        expiry: row.get("expiry")?,
                        password_verifier: row.get("password_verifier")?,
                        salt: row.get("salt")?,
                        ciphertext: row.get("ciphertext")?,
                        active: row.get("active")?,
                        created_at: row.get("created_at")?,
                    })
                },
            )
            .optional()?;

        raw.map(RawRecord::into_record).transpose()
    }

    fn deactivate_if_active(&self, code: &Code) -> Result<usize> {
        let conn = connect(&self.path)?;
        let changed = conn.execute(
            "UPDATE vault_records SET active = 0 WHERE code = ?1 AND active = 1",
            params![code.as_str()],
        )?;
        Ok(changed)
    }
}

/// Open a connection with the shared busy timeout applied.
pub(crate) fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}

/// Fixed-width RFC 3339 in UTC, e.g. `2026-01-02T03:04:05.000000Z`.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// `format_timestamp`, refusing instants outside years 0000-9999.
///
/// Those render with a sign prefix, which neither parses back as RFC 3339
/// nor sorts with the fixed-width rows.
fn storable_timestamp(field: &str, ts: DateTime<Utc>) -> Result<String> {
    if !(0..=9999).contains(&ts.year()) {
        return Err(VaultError::InvalidInput(format!(
            "{field} {ts} is outside the storable range (years 0000-9999)"
        )));
    }
    Ok(format_timestamp(ts))
}

fn parse_timestamp(code: &str, field: &str, text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| VaultError::CorruptRecord {
            code: code.to_string(),
            reason: format!("{field} is not an RFC 3339 timestamp: {e}"),
        })
}

/// Column values exactly as SQLite returned them.
struct RawRecord {
    code: String,
    expiry: String,
    password_verifier: String,
    salt: String,
    ciphertext: String,
    active: i64,
    created_at: String,
}

impl RawRecord {
    fn into_record(self) -> Result<VaultRecord> {
        let code = Code::parse(&self.code).map_err(|_| VaultError::CorruptRecord {
            code: self.code.clone(),
            reason: "stored code is malformed".into(),
        })?;
        let active = match self.active {
            0 => false,
            1 => true,
            other => {
                return Err(VaultError::CorruptRecord {
                    code: self.code,
                    reason: format!("active flag is {other}, expected 0 or 1"),
                })
            }
        };

        Ok(VaultRecord {
            expiry: parse_timestamp(&self.code, "expiry", &self.expiry)?,
            created_at: parse_timestamp(&self.code, "created_at", &self.created_at)?,
            salt: decode_bytes(&self.code, "salt", &self.salt)?,
            ciphertext: decode_bytes(&self.code, "ciphertext", &self.ciphertext)?,
            password_verifier: self.password_verifier,
            active,
            code,
        })
    }
}
