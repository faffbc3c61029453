//! Schema sync
//!
//! Provides:
//! - DDL generated from the schema registry
//! - A `schema_sync` ledger of per-table DDL checksums
//! - Create-if-missing sync, or drop-and-recreate with `force`

mod checksums;
pub mod ddl;
mod runner;

pub use checksums::compute_checksum;
pub use ddl::TableDdl;
pub use runner::{sync, SyncReport, SYNC_LEDGER_TABLE};
