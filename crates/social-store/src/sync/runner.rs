//! Sync runner
//!
//! Materializes the registry's schema inside one transaction. Missing tables
//! are created and tables that already exist are left alone. Each table's DDL
//! checksum is recorded so a later sync can report a table whose declaration
//! has changed since; only `force` rebuilds it.

#![allow(clippy::result_large_err)]

use rusqlite::{Connection, OptionalExtension, Transaction};
use social_core::repo::SyncOptions;
use social_core::schema::Registry;

use crate::errors::{from_rusqlite, sync_error, Result};
use crate::sync::ddl::{self, TableDdl};

/// Ledger of tables created by sync
pub const SYNC_LEDGER_TABLE: &str = "schema_sync";

/// What a sync did, table by table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub dropped: Vec<&'static str>,
    pub created: Vec<&'static str>,
    pub unchanged: Vec<&'static str>,
    /// Existing tables whose recorded checksum differs from the declaration
    pub drifted: Vec<&'static str>,
}

/// What happened to one declared table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableOutcome {
    Created,
    Unchanged,
    Drifted,
}

/// Materialize the schema; `force` drops every declared table first
pub fn sync(conn: &mut Connection, registry: &Registry, options: SyncOptions) -> Result<SyncReport> {
    let tables = ddl::schema(registry)?;
    let mut report = SyncReport::default();

    let tx = conn.transaction().map_err(from_rusqlite)?;
    create_ledger_table(&tx)?;

    if options.force {
        // Reverse creation order: join tables, then referencing tables
        for table in tables.iter().rev() {
            if table_exists(&tx, table.table)? {
                tx.execute_batch(&format!("DROP TABLE {};", table.table))
                    .map_err(|e| sync_error(table.table, &e.to_string()))?;
                report.dropped.push(table.table);
            }
        }
        tx.execute(&format!("DELETE FROM {}", SYNC_LEDGER_TABLE), [])
            .map_err(from_rusqlite)?;
    }

    for table in &tables {
        match apply_table(&tx, table)? {
            TableOutcome::Created => report.created.push(table.table),
            TableOutcome::Unchanged => report.unchanged.push(table.table),
            TableOutcome::Drifted => {
                tracing::warn!(
                    table = table.table,
                    "table differs from its declaration; run sync with force to rebuild it"
                );
                report.unchanged.push(table.table);
                report.drifted.push(table.table);
            }
        }
    }

    tx.commit().map_err(from_rusqlite)?;

    tracing::debug!(
        force = options.force,
        dropped = report.dropped.len(),
        created = report.created.len(),
        unchanged = report.unchanged.len(),
        drifted = report.drifted.len(),
        "schema synced"
    );
    Ok(report)
}

/// Create the ledger table if it doesn't exist
fn create_ledger_table(tx: &Transaction) -> Result<()> {
    tx.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS {} (
                table_name TEXT PRIMARY KEY,
                checksum TEXT NOT NULL,
                synced_at INTEGER NOT NULL
            )",
            SYNC_LEDGER_TABLE
        ),
        [],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}

/// Create one table unless it is already there
///
/// An existing table is kept as is. One that sync did not create gets its
/// checksum recorded; one whose recorded checksum differs is reported as
/// drifted and its ledger entry is left untouched.
fn apply_table(tx: &Transaction, table: &TableDdl) -> Result<TableOutcome> {
    let checksum = table.checksum();
    let recorded: Option<String> = tx
        .query_row(
            &format!(
                "SELECT checksum FROM {} WHERE table_name = ?1",
                SYNC_LEDGER_TABLE
            ),
            [table.table],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)?;

    if table_exists(tx, table.table)? {
        return match recorded {
            Some(existing) if existing == checksum => Ok(TableOutcome::Unchanged),
            Some(_) => Ok(TableOutcome::Drifted),
            None => {
                record_checksum(tx, table.table, &checksum)?;
                Ok(TableOutcome::Unchanged)
            }
        };
    }

    tx.execute_batch(&table.sql)
        .map_err(|e| sync_error(table.table, &e.to_string()))?;
    record_checksum(tx, table.table, &checksum)?;

    Ok(TableOutcome::Created)
}

fn record_checksum(tx: &Transaction, table: &str, checksum: &str) -> Result<()> {
    let now = chrono::Utc::now().timestamp_millis();
    tx.execute(
        &format!(
            "INSERT OR REPLACE INTO {} (table_name, checksum, synced_at) VALUES (?1, ?2, ?3)",
            SYNC_LEDGER_TABLE
        ),
        rusqlite::params![table, checksum, now],
    )
    .map_err(from_rusqlite)?;
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    conn.query_row(
        "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |_| Ok(()),
    )
    .optional()
    .map(|found| found.is_some())
    .map_err(from_rusqlite)
}
