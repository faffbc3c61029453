//! Repository layer persisting social records to SQLite

mod rows;
pub mod sqlite_repo;

pub use sqlite_repo::SqliteRepo;
