//! SQLite repository implementation
//!
//! Persists social records to the tables laid out by `sync`. Column lists,
//! foreign keys and join tables all come from the registry, so the typed
//! association operations of `SocialRepo` work unchanged over SQLite.

#![allow(clippy::result_large_err)]

use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use social_core::errors::{ExError, SocialError};
use social_core::model::{now_millis, EntityRecord};
use social_core::repo::{ensure_kind, join_keys, SocialRepo, SyncOptions};
use social_core::schema::registry::{CREATED_AT_COLUMN, ID_COLUMN, UPDATED_AT_COLUMN};
use social_core::schema::{AssociationDef, AssociationKind, EntityKind, Registry};

use crate::db;
use crate::errors::{from_rusqlite, Result};
use crate::repo::rows::{to_record, to_sql};
use crate::sync::{self, SyncReport};

/// SQLite repository for social records
pub struct SqliteRepo {
    conn: Connection,
    registry: Registry,
}

impl SqliteRepo {
    /// Repository over the social schema; turns on foreign keys
    pub fn new(conn: Connection) -> Result<Self> {
        Self::with_registry(conn, Registry::social()?)
    }

    pub fn with_registry(conn: Connection, registry: Registry) -> Result<Self> {
        db::configure(&conn)?;
        Ok(Self { conn, registry })
    }

    /// Fresh in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::new(db::open_in_memory()?)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Sync and report what was dropped, created or left alone
    pub fn sync_with_report(&mut self, options: SyncOptions) -> Result<SyncReport> {
        sync::sync(&mut self.conn, &self.registry, options)
    }
}

impl SocialRepo for SqliteRepo {
    fn registry(&self) -> &Registry {
        &self.registry
    }

    fn sync(&mut self, options: SyncOptions) -> Result<()> {
        self.sync_with_report(options).map(|_| ())
    }

    fn insert(&mut self, record: EntityRecord) -> Result<EntityRecord> {
        let kind = record.kind();
        let columns = self.registry.columns(kind)?;
        let values = record.to_columns()?;
        self.registry.entity(kind)?.check_required(&values)?;

        let params = columns
            .iter()
            .map(|c| to_sql(c, values.get(*c)))
            .collect::<Result<Vec<SqlValue>>>()?;
        let placeholders = (1..=columns.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");

        self.conn
            .execute(
                &format!(
                    "INSERT INTO {} ({}) VALUES ({})",
                    kind.table(),
                    columns.join(", "),
                    placeholders
                ),
                params_from_iter(params.iter()),
            )
            .map_err(|e| {
                from_rusqlite(e)
                    .with_op("insert")
                    .with_entity(kind)
                    .with_entity_id(record.id())
            })?;

        tracing::debug!(entity = %kind, entity_id = record.id(), "record inserted");
        Ok(record)
    }

    fn find(&self, kind: EntityKind, id: &str) -> Result<Option<EntityRecord>> {
        find_record(&self.conn, &self.registry, kind, id)
    }

    fn delete(&mut self, kind: EntityKind, id: &str) -> Result<bool> {
        // Foreign keys go NULL and join rows cascade in SQLite itself
        let removed = self
            .conn
            .execute(
                &format!("DELETE FROM {} WHERE {} = ?1", kind.table(), ID_COLUMN),
                [id],
            )
            .map_err(|e| from_rusqlite(e).with_op("delete").with_entity(kind))?;
        Ok(removed > 0)
    }

    fn set_link(
        &mut self,
        assoc: &AssociationDef,
        owner_id: &str,
        target_id: Option<&str>,
    ) -> Result<()> {
        ensure_kind(assoc, "set", false)?;
        let tx = self.conn.transaction().map_err(from_rusqlite)?;
        require(&tx, assoc.source, owner_id)?;
        if let Some(target) = target_id {
            require(&tx, assoc.target, target)?;
        }

        let now = now_millis().timestamp_millis();
        match assoc.kind {
            AssociationKind::HasOne => {
                tx.execute(
                    &format!(
                        "UPDATE {table} SET {fk} = NULL, {updated} = ?1 WHERE {fk} = ?2",
                        table = assoc.target.table(),
                        fk = assoc.foreign_key,
                        updated = UPDATED_AT_COLUMN
                    ),
                    rusqlite::params![now, owner_id],
                )
                .map_err(from_rusqlite)?;
                if let Some(target) = target_id {
                    point_foreign_key(&tx, assoc.target, target, assoc.foreign_key, Some(owner_id), now)?;
                }
            }
            AssociationKind::BelongsTo => {
                if let (true, Some(target)) = (self.registry.is_exclusive(assoc), target_id) {
                    // The other side is has-one: release the target's previous holder
                    tx.execute(
                        &format!(
                            "UPDATE {table} SET {fk} = NULL, {updated} = ?1 WHERE {fk} = ?2 AND {id} <> ?3",
                            table = assoc.source.table(),
                            fk = assoc.foreign_key,
                            updated = UPDATED_AT_COLUMN,
                            id = ID_COLUMN
                        ),
                        rusqlite::params![now, target, owner_id],
                    )
                    .map_err(from_rusqlite)?;
                }
                point_foreign_key(&tx, assoc.source, owner_id, assoc.foreign_key, target_id, now)?;
            }
            AssociationKind::HasMany | AssociationKind::BelongsToMany => {}
        }

        tx.commit().map_err(from_rusqlite)?;
        Ok(())
    }

    fn add_links(
        &mut self,
        assoc: &AssociationDef,
        owner_id: &str,
        target_ids: &[String],
    ) -> Result<usize> {
        ensure_kind(assoc, "add", true)?;
        let tx = self.conn.transaction().map_err(from_rusqlite)?;
        require(&tx, assoc.source, owner_id)?;
        for target in target_ids {
            require(&tx, assoc.target, target)?;
        }

        let now = now_millis().timestamp_millis();
        let mut added = 0;
        if let Some((table, source_key, target_key)) = join_keys(assoc) {
            for target in target_ids {
                let linked = tx
                    .query_row(
                        &format!(
                            "SELECT 1 FROM {} WHERE {} = ?1 AND {} = ?2",
                            table, source_key, target_key
                        ),
                        [owner_id, target.as_str()],
                        |_| Ok(()),
                    )
                    .optional()
                    .map_err(from_rusqlite)?
                    .is_some();
                if linked {
                    continue;
                }
                tx.execute(
                    &format!(
                        "INSERT INTO {} ({}, {}, {}) VALUES (?1, ?2, ?3)",
                        table, source_key, target_key, CREATED_AT_COLUMN
                    ),
                    rusqlite::params![owner_id, target, now],
                )
                .map_err(from_rusqlite)?;
                added += 1;
            }
        } else {
            for target in target_ids {
                added += tx
                    .execute(
                        &format!(
                            "UPDATE {table} SET {fk} = ?1, {updated} = ?2 \
                             WHERE {id} = ?3 AND ({fk} IS NULL OR {fk} <> ?1)",
                            table = assoc.target.table(),
                            fk = assoc.foreign_key,
                            updated = UPDATED_AT_COLUMN,
                            id = ID_COLUMN
                        ),
                        rusqlite::params![owner_id, now, target],
                    )
                    .map_err(|e| {
                        from_rusqlite(e)
                            .with_entity(assoc.target)
                            .with_entity_id(target)
                    })?;
            }
        }

        tx.commit().map_err(from_rusqlite)?;
        Ok(added)
    }

    fn remove_links(
        &mut self,
        assoc: &AssociationDef,
        owner_id: &str,
        target_ids: &[String],
    ) -> Result<usize> {
        ensure_kind(assoc, "remove", true)?;
        let tx = self.conn.transaction().map_err(from_rusqlite)?;
        require(&tx, assoc.source, owner_id)?;
        for target in target_ids {
            require(&tx, assoc.target, target)?;
        }

        let mut removed = 0;
        if let Some((table, source_key, target_key)) = join_keys(assoc) {
            for target in target_ids {
                removed += tx.execute(
                    &format!(
                        "DELETE FROM {} WHERE {} = ?1 AND {} = ?2",
                        table, source_key, target_key
                    ),
                    [owner_id, target.as_str()],
                )
                .map_err(from_rusqlite)?;
            }
        } else {
            let now = now_millis().timestamp_millis();
            for target in target_ids {
                // Only unlink children that still point at this owner
                removed += tx.execute(
                    &format!(
                        "UPDATE {table} SET {fk} = NULL, {updated} = ?1 WHERE {id} = ?2 AND {fk} = ?3",
                        table = assoc.target.table(),
                        fk = assoc.foreign_key,
                        updated = UPDATED_AT_COLUMN,
                        id = ID_COLUMN
                    ),
                    rusqlite::params![now, target, owner_id],
                )
                .map_err(from_rusqlite)?;
            }
        }

        tx.commit().map_err(from_rusqlite)?;
        Ok(removed)
    }

    fn associated(&self, assoc: &AssociationDef, owner_id: &str) -> Result<Vec<EntityRecord>> {
        let owner = find_record(&self.conn, &self.registry, assoc.source, owner_id)?
            .ok_or_else(|| not_found(assoc.source, owner_id))?;

        let target_table = assoc.target.table();
        match assoc.kind {
            AssociationKind::HasOne | AssociationKind::HasMany => {
                let limit = if assoc.kind == AssociationKind::HasOne {
                    " LIMIT 1"
                } else {
                    ""
                };
                select_records(
                    &self.conn,
                    &self.registry,
                    assoc.target,
                    &format!(
                        "FROM {t} WHERE {t}.{fk} = ?1 ORDER BY {t}.rowid{limit}",
                        t = target_table,
                        fk = assoc.foreign_key,
                        limit = limit
                    ),
                    owner_id,
                )
            }
            AssociationKind::BelongsTo => match owner.foreign_key(assoc.foreign_key) {
                Some(target_id) => Ok(find_record(&self.conn, &self.registry, assoc.target, target_id)?
                    .into_iter()
                    .collect()),
                None => Ok(Vec::new()),
            },
            AssociationKind::BelongsToMany => {
                let (table, source_key, target_key) =
                    join_keys(assoc).ok_or_else(|| not_declared(assoc))?;
                select_records(
                    &self.conn,
                    &self.registry,
                    assoc.target,
                    &format!(
                        "FROM {j} JOIN {t} ON {t}.{id} = {j}.{tk} WHERE {j}.{sk} = ?1 ORDER BY {j}.{id}",
                        j = table,
                        t = target_table,
                        id = ID_COLUMN,
                        tk = target_key,
                        sk = source_key
                    ),
                    owner_id,
                )
            }
        }
    }
}

fn find_record(
    conn: &Connection,
    registry: &Registry,
    kind: EntityKind,
    id: &str,
) -> Result<Option<EntityRecord>> {
    let table = kind.table();
    let records = select_records(
        conn,
        registry,
        kind,
        &format!("FROM {t} WHERE {t}.{id} = ?1", t = table, id = ID_COLUMN),
        id,
    )?;
    Ok(records.into_iter().next())
}

/// Run `SELECT <kind's columns> <tail>` with one bound parameter
fn select_records(
    conn: &Connection,
    registry: &Registry,
    kind: EntityKind,
    tail: &str,
    param: &str,
) -> Result<Vec<EntityRecord>> {
    let columns = registry.columns(kind)?;
    let table = kind.table();
    let select = columns
        .iter()
        .map(|c| format!("{}.{}", table, c))
        .collect::<Vec<_>>()
        .join(", ");

    let mut stmt = conn
        .prepare(&format!("SELECT {} {}", select, tail))
        .map_err(from_rusqlite)?;
    let rows: Vec<Vec<SqlValue>> = stmt
        .query_map([param], |row| {
            (0..columns.len())
                .map(|i| row.get::<_, SqlValue>(i))
                .collect::<rusqlite::Result<Vec<_>>>()
        })
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    rows.into_iter()
        .map(|values| to_record(kind, &columns, values))
        .collect()
}

fn require(conn: &Connection, kind: EntityKind, id: &str) -> Result<()> {
    let found = conn
        .query_row(
            &format!("SELECT 1 FROM {} WHERE {} = ?1", kind.table(), ID_COLUMN),
            [id],
            |_| Ok(()),
        )
        .optional()
        .map_err(from_rusqlite)?;
    match found {
        Some(()) => Ok(()),
        None => Err(not_found(kind, id)),
    }
}

/// Point `kind`'s foreign-key column at `value` and bump `updated_at`
fn point_foreign_key(
    conn: &Connection,
    kind: EntityKind,
    id: &str,
    column: &str,
    value: Option<&str>,
    now: i64,
) -> Result<()> {
    conn.execute(
        &format!(
            "UPDATE {} SET {} = ?1, {} = ?2 WHERE {} = ?3",
            kind.table(),
            column,
            UPDATED_AT_COLUMN,
            ID_COLUMN
        ),
        rusqlite::params![value, now, id],
    )
    .map_err(|e| from_rusqlite(e).with_entity(kind).with_entity_id(id))?;
    Ok(())
}

fn not_found(kind: EntityKind, id: &str) -> ExError {
    SocialError::EntityNotFound {
        entity: kind,
        id: id.to_string(),
    }
    .into()
}

fn not_declared(assoc: &AssociationDef) -> ExError {
    SocialError::UnknownAssociation {
        source_entity: assoc.source,
        accessor: assoc.accessor.to_string(),
    }
    .into()
}
