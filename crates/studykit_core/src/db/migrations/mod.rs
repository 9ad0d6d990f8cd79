//! Schema steps for the `kv_entries` table.
//!
//! Step `n` brings a database from `user_version = n - 1` to `n`. All
//! pending steps run in one transaction, so a failed step leaves the
//! previous version intact.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// `(target user_version, sql)` in ascending order.
const SCHEMA_STEPS: &[(u32, &str)] = &[
    (1, include_str!("0001_kv_entries.sql")),
    (2, include_str!("0002_kv_entries_updated_index.sql")),
];

/// Schema version this build writes and expects.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |(version, _)| *version)
}

/// Brings `conn` up to `latest_version()`.
///
/// # Errors
/// - `DbError::SchemaTooNew` when the file was written by a newer build.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = current_user_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }
    if found == supported {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (version, sql) in SCHEMA_STEPS.iter().skip_while(|(version, _)| *version <= found) {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={found} to_version={supported}");
    Ok(())
}

/// Reads `PRAGMA user_version`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}
