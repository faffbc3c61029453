//! Database connection management
//!
//! Provides utilities for opening and configuring SQLite connections

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Configure a connection for the social schema
///
/// Foreign keys must be on for the `ON DELETE` actions the schema declares.
pub fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(from_rusqlite)?;

    Ok(())
}

/// Switch a file database to WAL journaling
pub fn enable_wal(conn: &Connection) -> Result<()> {
    let mode: String = conn
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
        .map_err(from_rusqlite)?;
    tracing::debug!(journal_mode = %mode, "journal mode set");
    Ok(())
}

/// How long a statement waits on a locked database before failing
pub fn set_busy_timeout(conn: &Connection, millis: u64) -> Result<()> {
    conn.busy_timeout(Duration::from_millis(millis))
        .map_err(from_rusqlite)
}

/// Whether foreign-key enforcement is on for this connection
pub fn foreign_keys_enabled(conn: &Connection) -> Result<bool> {
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .map_err(from_rusqlite)?;
    Ok(enabled == 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configure_enables_foreign_keys() {
        let conn = open_in_memory().unwrap();
        assert!(!foreign_keys_enabled(&conn).unwrap());

        configure(&conn).unwrap();
        assert!(foreign_keys_enabled(&conn).unwrap());
    }
}
