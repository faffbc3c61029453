use std::collections::{BTreeMap, HashMap};

use crate::errors::{ExError, ExErrorKind, Result, SocialError};
use crate::model::{now_millis, EntityRecord};
use crate::repo::{ensure_kind, join_keys, SocialRepo, SyncOptions};
use crate::schema::{AssociationDef, AssociationKind, EntityKind, Registry};

#[derive(Debug, Clone)]
struct Row {
    seq: u64,
    record: EntityRecord,
}

#[derive(Debug, Clone, Default)]
struct Table {
    rows: HashMap<String, Row>,
}

impl Table {
    /// Rows in insertion order
    fn ordered(&self) -> Vec<&Row> {
        let mut rows: Vec<&Row> = self.rows.values().collect();
        rows.sort_by_key(|r| r.seq);
        rows
    }
}

/// In-memory `SocialRepo`
///
/// HashMap-backed tables laid out from the registry. Not thread-safe;
/// designed for single-threaded use in tests and the engine's unit tests.
/// Tables exist only after `sync`, mirroring a fresh database.
#[derive(Debug, Clone)]
pub struct Store {
    registry: Registry,
    tables: HashMap<EntityKind, Table>,
    /// Join table name to rows (column -> identity) in link order
    join_rows: HashMap<&'static str, Vec<BTreeMap<&'static str, String>>>,
    next_seq: u64,
}

impl Store {
    /// Store over the social schema
    pub fn new() -> Result<Self> {
        Ok(Self::with_registry(Registry::social()?))
    }

    pub fn with_registry(registry: Registry) -> Self {
        Self {
            registry,
            tables: HashMap::new(),
            join_rows: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Number of rows in an entity table
    pub fn count(&self, kind: EntityKind) -> Result<usize> {
        Ok(self.table(kind)?.rows.len())
    }

    /// Number of rows in a join table
    pub fn join_row_count(&self, table: &str) -> Result<usize> {
        self.join_rows
            .get(table)
            .map(Vec::len)
            .ok_or_else(|| table_missing(table))
    }

    fn table(&self, kind: EntityKind) -> Result<&Table> {
        self.tables
            .get(&kind)
            .ok_or_else(|| table_missing(kind.table()))
    }

    fn table_mut(&mut self, kind: EntityKind) -> Result<&mut Table> {
        self.tables
            .get_mut(&kind)
            .ok_or_else(|| table_missing(kind.table()))
    }

    fn join_table_mut(
        &mut self,
        table: &'static str,
    ) -> Result<&mut Vec<BTreeMap<&'static str, String>>> {
        self.join_rows
            .get_mut(table)
            .ok_or_else(|| table_missing(table))
    }

    fn require(&self, kind: EntityKind, id: &str) -> Result<&EntityRecord> {
        self.table(kind)?
            .rows
            .get(id)
            .map(|row| &row.record)
            .ok_or_else(|| not_found(kind, id))
    }

    fn require_all(&self, kind: EntityKind, ids: &[String]) -> Result<()> {
        for id in ids {
            self.require(kind, id)?;
        }
        Ok(())
    }

    fn set_foreign_key(
        &mut self,
        kind: EntityKind,
        id: &str,
        column: &str,
        value: Option<String>,
    ) -> Result<()> {
        let row = self
            .table_mut(kind)?
            .rows
            .get_mut(id)
            .ok_or_else(|| not_found(kind, id))?;
        row.record.set_foreign_key(column, value, now_millis())
    }

    /// Ids in `kind` whose `column` points at `owner_id`, in insertion order
    fn referencing(&self, kind: EntityKind, column: &str, owner_id: &str) -> Result<Vec<String>> {
        Ok(self
            .table(kind)?
            .ordered()
            .into_iter()
            .filter(|row| row.record.foreign_key(column) == Some(owner_id))
            .map(|row| row.record.id().to_string())
            .collect())
    }
}

impl SocialRepo for Store {
    fn registry(&self) -> &Registry {
        &self.registry
    }

    fn sync(&mut self, options: SyncOptions) -> Result<()> {
        let order = self.registry.table_order()?;
        if options.force {
            self.tables.clear();
            self.join_rows.clear();
        }
        for kind in order {
            self.tables.entry(kind).or_default();
        }
        for join in self.registry.join_tables() {
            self.join_rows.entry(join.table).or_default();
        }
        tracing::debug!(force = options.force, tables = self.tables.len(), "store synced");
        Ok(())
    }

    fn insert(&mut self, record: EntityRecord) -> Result<EntityRecord> {
        let kind = record.kind();
        self.table(kind)?;
        self.registry
            .entity(kind)?
            .check_required(&record.to_columns()?)?;

        for fk in self.registry.foreign_keys_on(kind) {
            if let Some(target) = record.foreign_key(fk.column) {
                if self.require(fk.references, target).is_err() {
                    return Err(ExError::new(ExErrorKind::ConstraintViolation)
                        .with_op("insert")
                        .with_entity(kind)
                        .with_entity_id(record.id())
                        .with_message(format!(
                            "FOREIGN KEY constraint failed: {}.{}",
                            kind.table(),
                            fk.column
                        )));
                }
            }
        }

        let seq = self.next_seq;
        let table = self.table_mut(kind)?;
        if table.rows.contains_key(record.id()) {
            return Err(ExError::new(ExErrorKind::ConstraintViolation)
                .with_op("insert")
                .with_entity(kind)
                .with_entity_id(record.id())
                .with_message(format!("UNIQUE constraint failed: {}.id", kind.table())));
        }
        table.rows.insert(
            record.id().to_string(),
            Row {
                seq,
                record: record.clone(),
            },
        );
        self.next_seq += 1;
        Ok(record)
    }

    fn find(&self, kind: EntityKind, id: &str) -> Result<Option<EntityRecord>> {
        Ok(self
            .table(kind)?
            .rows
            .get(id)
            .map(|row| row.record.clone()))
    }

    fn delete(&mut self, kind: EntityKind, id: &str) -> Result<bool> {
        if self.table_mut(kind)?.rows.remove(id).is_none() {
            return Ok(false);
        }

        // ON DELETE SET NULL leaves updated_at alone
        for (holder, fk) in self.registry.incoming_foreign_keys(kind) {
            let table = self.table_mut(holder)?;
            for row in table.rows.values_mut() {
                if row.record.foreign_key(fk.column) == Some(id) {
                    let untouched = row.record.updated_at();
                    row.record.set_foreign_key(fk.column, None, untouched)?;
                }
            }
        }

        // ON DELETE CASCADE for join rows
        for join in self.registry.join_tables() {
            let columns: Vec<&'static str> = join
                .keys
                .iter()
                .filter(|k| k.references == kind)
                .map(|k| k.column)
                .collect();
            if columns.is_empty() {
                continue;
            }
            let rows = self.join_table_mut(join.table)?;
            rows.retain(|row| {
                !columns
                    .iter()
                    .any(|c| row.get(c).map(String::as_str) == Some(id))
            });
        }

        Ok(true)
    }

    fn set_link(
        &mut self,
        assoc: &AssociationDef,
        owner_id: &str,
        target_id: Option<&str>,
    ) -> Result<()> {
        ensure_kind(assoc, "set", false)?;
        self.require(assoc.source, owner_id)?;
        if let Some(target) = target_id {
            self.require(assoc.target, target)?;
        }

        match assoc.kind {
            AssociationKind::HasOne => {
                for previous in self.referencing(assoc.target, assoc.foreign_key, owner_id)? {
                    self.set_foreign_key(assoc.target, &previous, assoc.foreign_key, None)?;
                }
                if let Some(target) = target_id {
                    self.set_foreign_key(
                        assoc.target,
                        target,
                        assoc.foreign_key,
                        Some(owner_id.to_string()),
                    )?;
                }
            }
            AssociationKind::BelongsTo => {
                if let (true, Some(target)) = (self.registry.is_exclusive(assoc), target_id) {
                    for previous in self.referencing(assoc.source, assoc.foreign_key, target)? {
                        if previous != owner_id {
                            self.set_foreign_key(assoc.source, &previous, assoc.foreign_key, None)?;
                        }
                    }
                }
                self.set_foreign_key(
                    assoc.source,
                    owner_id,
                    assoc.foreign_key,
                    target_id.map(str::to_string),
                )?;
            }
            AssociationKind::HasMany | AssociationKind::BelongsToMany => {}
        }
        Ok(())
    }

    fn add_links(
        &mut self,
        assoc: &AssociationDef,
        owner_id: &str,
        target_ids: &[String],
    ) -> Result<usize> {
        ensure_kind(assoc, "add", true)?;
        self.require(assoc.source, owner_id)?;
        self.require_all(assoc.target, target_ids)?;

        let mut added = 0;
        if let Some((table, source_key, target_key)) = join_keys(assoc) {
            let rows = self.join_table_mut(table)?;
            for target in target_ids {
                let linked = rows.iter().any(|row| {
                    row.get(source_key).map(String::as_str) == Some(owner_id)
                        && row.get(target_key) == Some(target)
                });
                if linked {
                    continue;
                }
                let mut row = BTreeMap::new();
                row.insert(source_key, owner_id.to_string());
                row.insert(target_key, target.clone());
                rows.push(row);
                added += 1;
            }
        } else {
            for target in target_ids {
                let points_here = self
                    .require(assoc.target, target)?
                    .foreign_key(assoc.foreign_key)
                    == Some(owner_id);
                if points_here {
                    continue;
                }
                self.set_foreign_key(
                    assoc.target,
                    target,
                    assoc.foreign_key,
                    Some(owner_id.to_string()),
                )?;
                added += 1;
            }
        }
        Ok(added)
    }

    fn remove_links(
        &mut self,
        assoc: &AssociationDef,
        owner_id: &str,
        target_ids: &[String],
    ) -> Result<usize> {
        ensure_kind(assoc, "remove", true)?;
        self.require(assoc.source, owner_id)?;
        self.require_all(assoc.target, target_ids)?;

        let mut removed = 0;
        if let Some((table, source_key, target_key)) = join_keys(assoc) {
            let rows = self.join_table_mut(table)?;
            let before = rows.len();
            rows.retain(|row| {
                let linked_owner = row.get(source_key).map(String::as_str) == Some(owner_id);
                let listed = row
                    .get(target_key)
                    .map(|t| target_ids.contains(t))
                    .unwrap_or(false);
                !(linked_owner && listed)
            });
            removed = before - rows.len();
        } else {
            for target in target_ids {
                let points_here = self
                    .require(assoc.target, target)?
                    .foreign_key(assoc.foreign_key)
                    == Some(owner_id);
                if points_here {
                    self.set_foreign_key(assoc.target, target, assoc.foreign_key, None)?;
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    fn associated(&self, assoc: &AssociationDef, owner_id: &str) -> Result<Vec<EntityRecord>> {
        let owner = self.require(assoc.source, owner_id)?;

        let ids: Vec<String> = match assoc.kind {
            AssociationKind::HasOne => self
                .referencing(assoc.target, assoc.foreign_key, owner_id)?
                .into_iter()
                .take(1)
                .collect(),
            AssociationKind::HasMany => {
                self.referencing(assoc.target, assoc.foreign_key, owner_id)?
            }
            AssociationKind::BelongsTo => owner
                .foreign_key(assoc.foreign_key)
                .map(|id| vec![id.to_string()])
                .unwrap_or_default(),
            AssociationKind::BelongsToMany => {
                let (table, source_key, target_key) =
                    join_keys(assoc).ok_or_else(|| table_missing(assoc.accessor))?;
                self.join_rows
                    .get(table)
                    .ok_or_else(|| table_missing(table))?
                    .iter()
                    .filter(|row| row.get(source_key).map(String::as_str) == Some(owner_id))
                    .filter_map(|row| row.get(target_key).cloned())
                    .collect()
            }
        };

        ids.iter()
            .map(|id| self.require(assoc.target, id).cloned())
            .collect()
    }
}

fn table_missing(table: &str) -> ExError {
    SocialError::TableMissing {
        table: table.to_string(),
    }
    .into()
}

fn not_found(kind: EntityKind, id: &str) -> ExError {
    SocialError::EntityNotFound {
        entity: kind,
        id: id.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewComment, NewLike, NewPost, NewProfile, NewUser};

    fn synced() -> Store {
        let mut store = Store::new().unwrap();
        store.sync(SyncOptions::default()).unwrap();
        store
    }

    #[test]
    fn test_operations_before_sync_fail() {
        let mut store = Store::new().unwrap();
        let err = store
            .create_user(NewUser::new("emart", "test@test.com"))
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Persistence);
    }

    #[test]
    fn test_force_sync_clears_rows() {
        let mut store = synced();
        store.create_like(NewLike::new("happy")).unwrap();
        assert_eq!(store.count(EntityKind::Like).unwrap(), 1);

        store.sync(SyncOptions::default()).unwrap();
        assert_eq!(store.count(EntityKind::Like).unwrap(), 1);

        store.sync(SyncOptions::force()).unwrap();
        assert_eq!(store.count(EntityKind::Like).unwrap(), 0);
    }

    #[test]
    fn test_set_profile_replaces_previous() {
        let mut store = synced();
        let user = store.create_user(NewUser::new("emart", "test@test.com")).unwrap();
        let first = store.create_profile(NewProfile::default()).unwrap();
        let second = store.create_profile(NewProfile::default()).unwrap();

        store.set_user_profile(&user.id, Some(&first.id)).unwrap();
        store.set_user_profile(&user.id, Some(&second.id)).unwrap();

        assert_eq!(store.get_user_profile(&user.id).unwrap().unwrap().id, second.id);
        assert!(store.find_profile(&first.id).unwrap().unwrap().user_id.is_none());
    }

    #[test]
    fn test_has_many_preserves_creation_order() {
        let mut store = synced();
        let post = store.create_post(NewPost::new("t", "b")).unwrap();
        let c1 = store.create_comment(NewComment::new("one")).unwrap();
        let c2 = store.create_comment(NewComment::new("two")).unwrap();

        store
            .add_post_comments(&post.id, &[c2.id.clone(), c1.id.clone()])
            .unwrap();
        let ids: Vec<String> = store
            .get_post_comments(&post.id)
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![c1.id, c2.id]);
    }

    #[test]
    fn test_many_to_many_add_skips_existing_pairs() {
        let mut store = synced();
        let user = store.create_user(NewUser::new("emart", "test@test.com")).unwrap();
        let like = store.create_like(NewLike::new("happy")).unwrap();

        store.add_user_likes(&user.id, &[like.id.clone()]).unwrap();
        store
            .add_user_likes(&user.id, &[like.id.clone(), like.id.clone()])
            .unwrap();
        store.add_like_users(&like.id, &[user.id.clone()]).unwrap();

        assert_eq!(store.get_user_likes(&user.id).unwrap().len(), 1);
        assert_eq!(store.join_row_count("user_likes").unwrap(), 1);
    }

    #[test]
    fn test_set_on_collection_rejected() {
        let mut store = synced();
        let user = store.create_user(NewUser::new("emart", "test@test.com")).unwrap();
        let assoc = store.resolve_association(EntityKind::User, "posts").unwrap();
        let err = store.set_link(&assoc, &user.id, None).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut store = synced();
        let like = store.create_like(NewLike::new("happy")).unwrap();
        let err = store.insert(like.into()).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);
    }
}
