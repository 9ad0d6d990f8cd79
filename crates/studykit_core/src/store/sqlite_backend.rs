//! SQLite implementation of the storage port.
//!
//! # Responsibility
//! - Persist raw entries in the `kv_entries` table.
//! - Refuse connections that were not bootstrapped through `db::open_db`.
//!
//! # Invariants
//! - One row per key; writes replace the previous value (last write wins).
//! - `updated_at` mirrors the time of the most recent write in epoch ms.

use super::backend::{BackendError, BackendResult, StorageBackend};
use crate::codec::iso8601;
use crate::db::migrations::{current_user_version, latest_version};
use rusqlite::{params, Connection, OptionalExtension};

const KV_TABLE: &str = "kv_entries";

/// SQLite-backed key/value storage.
pub struct SqliteBackend<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBackend<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `Unavailable` when the schema version lags behind this binary or the
    ///   `kv_entries` table is missing.
    pub fn try_new(conn: &'conn Connection) -> BackendResult<Self> {
        let actual_version = current_user_version(conn)?;
        let expected_version = latest_version();
        if actual_version < expected_version {
            return Err(BackendError::Unavailable(format!(
                "connection schema version {actual_version} is older than required {expected_version}"
            )));
        }

        let table_exists: bool = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
            );",
            [KV_TABLE],
            |row| row.get(0),
        )?;
        if !table_exists {
            return Err(BackendError::Unavailable(format!(
                "required table `{KV_TABLE}` is missing"
            )));
        }

        Ok(Self { conn })
    }

    /// Returns the `updated_at` column for one key.
    pub fn updated_at(&self, key: &str) -> BackendResult<Option<i64>> {
        let value = self
            .conn
            .query_row(
                "SELECT updated_at FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }
}

impl StorageBackend for SqliteBackend<'_> {
    fn get_item(&self, key: &str) -> BackendResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> BackendResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value, iso8601::now_utc().timestamp_millis()],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> BackendResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }

    fn keys(&self) -> BackendResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv_entries ORDER BY key ASC;")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}
