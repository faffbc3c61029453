//! Store configuration
//!
//! Where the database lives and how its connection is set up. The CLI
//! builds one from `--db` / `SOCIAL_DB`; tests use `in_memory()`.

use std::ffi::OsString;
use std::path::PathBuf;

use rusqlite::Connection;

use crate::db;
use crate::errors::{io_error, Result};
use crate::repo::SqliteRepo;

/// Environment variable naming the database file
pub const DB_ENV_VAR: &str = "SOCIAL_DB";

/// Database file used when nothing else is configured
pub const DEFAULT_DB_PATH: &str = "social.db";

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// `None` selects an in-memory database
    pub db_path: Option<PathBuf>,
    pub journal_wal: bool,
    pub busy_timeout_ms: u64,
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self {
            db_path: None,
            journal_wal: false,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Some(path.into()),
            journal_wal: true,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }

    /// `SOCIAL_DB` if set and non-empty, else `social.db` in the working directory
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var_os(DB_ENV_VAR))
    }

    fn from_env_value(value: Option<OsString>) -> Self {
        match value {
            Some(path) if !path.is_empty() => Self::from_path(path),
            _ => Self::from_path(DEFAULT_DB_PATH),
        }
    }

    pub fn with_journal_wal(mut self, enabled: bool) -> Self {
        self.journal_wal = enabled;
        self
    }

    pub fn with_busy_timeout_ms(mut self, millis: u64) -> Self {
        self.busy_timeout_ms = millis;
        self
    }

    /// Open and configure a raw connection
    pub fn connect(&self) -> Result<Connection> {
        let conn = match &self.db_path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|e| io_error("open_db", e))?;
                }
                db::open(path)?
            }
            None => db::open_in_memory()?,
        };

        db::configure(&conn)?;
        db::set_busy_timeout(&conn, self.busy_timeout_ms)?;
        if self.journal_wal && self.db_path.is_some() {
            db::enable_wal(&conn)?;
        }

        tracing::debug!(
            db_path = ?self.db_path,
            journal_wal = self.journal_wal,
            "store connection opened"
        );
        Ok(conn)
    }

    /// Open a repository over the social schema
    pub fn open(&self) -> Result<SqliteRepo> {
        SqliteRepo::new(self.connect()?)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::from_path(DEFAULT_DB_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_value_selects_path() {
        let config = StoreConfig::from_env_value(Some(OsString::from("/tmp/x/social.db")));
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/x/social.db")));
        assert!(config.journal_wal);
    }

    #[test]
    fn test_missing_or_empty_env_value_uses_default() {
        let unset = StoreConfig::from_env_value(None);
        let empty = StoreConfig::from_env_value(Some(OsString::new()));
        assert_eq!(unset.db_path, Some(PathBuf::from(DEFAULT_DB_PATH)));
        assert_eq!(empty, unset);
    }

    #[test]
    fn test_in_memory_connect_enables_foreign_keys() {
        let conn = StoreConfig::in_memory().connect().unwrap();
        assert!(db::foreign_keys_enabled(&conn).unwrap());
    }

    #[test]
    fn test_builders() {
        let config = StoreConfig::in_memory()
            .with_journal_wal(true)
            .with_busy_timeout_ms(10);
        assert!(config.journal_wal);
        assert_eq!(config.busy_timeout_ms, 10);
    }
}
