//! Error handling for social-store
//!
//! Wraps social-core ExError with store-specific helpers

use social_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a sync error for a table whose DDL failed to apply
pub fn sync_error(table: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sync")
        .with_message(format!("Sync of table {} failed: {}", table, reason))
}

/// Create a value conversion error
pub fn value_error(column: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op("sqlite_value")
        .with_message(format!("Column {}: {}", column, reason))
}

/// Create a database error from rusqlite::Error
///
/// Constraint failures keep their own kind so callers can tell a rejected
/// write from a broken database.
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    let kind = match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            ExErrorKind::ConstraintViolation
        }
        _ => ExErrorKind::Persistence,
    };
    ExError::new(kind)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
