//! Social Store - SQLite persistence for the social schema
//!
//! Provides:
//! - Connection management and configuration (`db`, `config`)
//! - Schema sync: DDL generated from the registry, with a checksum ledger
//! - `SqliteRepo`, the SQLite implementation of `SocialRepo`

pub mod config;
pub mod db;
pub mod errors;
pub mod repo;
pub mod sync;

// Re-export key types
pub use config::StoreConfig;
pub use errors::Result;
pub use repo::SqliteRepo;
pub use sync::SyncReport;
