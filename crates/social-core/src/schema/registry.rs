use super::association::{AssociationDef, AssociationKind, ForeignKey, JoinTable, JoinTableDef};
use super::entity::{EntityDef, EntityKind, FieldDef};
use crate::errors::{Result, SocialError};

/// Identity column carried by every entity table
pub const ID_COLUMN: &str = "id";
pub const CREATED_AT_COLUMN: &str = "created_at";
pub const UPDATED_AT_COLUMN: &str = "updated_at";

/// Entity and association declarations
///
/// Declarations are validated as they are registered, so a `Registry` that
/// was built without error always describes a schema that can be laid out:
/// every association points at defined entities, accessors are unique per
/// source, a foreign-key column always references the same entity, and
/// foreign keys between tables are acyclic once `table_order` succeeds.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entities: Vec<EntityDef>,
    associations: Vec<AssociationDef>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The social schema: User, Profile, Post, Comment, Like and their links
    pub fn social() -> Result<Self> {
        let mut registry = Registry::new();
        registry
            .define(EntityDef::new(
                EntityKind::User,
                vec![
                    FieldDef::required_text("username"),
                    FieldDef::required_text("email"),
                ],
            ))?
            .define(EntityDef::new(
                EntityKind::Profile,
                vec![
                    FieldDef::text("bio"),
                    FieldDef::text("profile_picture"),
                    FieldDef::text("birthday"),
                ],
            ))?
            .define(EntityDef::new(
                EntityKind::Post,
                vec![FieldDef::text("title"), FieldDef::text("body")],
            ))?
            .define(EntityDef::new(
                EntityKind::Comment,
                vec![FieldDef::text("body")],
            ))?
            .define(EntityDef::new(
                EntityKind::Like,
                vec![FieldDef::text("reaction_type")],
            ))?;

        registry
            .has_one(EntityKind::User, EntityKind::Profile, "profile")?
            .belongs_to(EntityKind::Profile, EntityKind::User, "user")?
            .has_many(EntityKind::User, EntityKind::Post, "posts")?
            .belongs_to(EntityKind::Post, EntityKind::User, "user")?
            .has_many(EntityKind::Post, EntityKind::Comment, "comments")?
            .belongs_to(EntityKind::Comment, EntityKind::Post, "post")?
            .belongs_to_many(EntityKind::User, EntityKind::Like, "likes", "user_likes")?
            .belongs_to_many(EntityKind::Like, EntityKind::User, "users", "user_likes")?;

        Ok(registry)
    }

    /// Declare an entity and its fields
    pub fn define(&mut self, def: EntityDef) -> Result<&mut Self> {
        if self.entities.iter().any(|e| e.kind == def.kind) {
            return Err(SocialError::DuplicateEntity { entity: def.kind }.into());
        }
        self.entities.push(def);
        Ok(self)
    }

    /// `source` has one `target`; the target table holds the foreign key
    pub fn has_one(
        &mut self,
        source: EntityKind,
        target: EntityKind,
        accessor: &'static str,
    ) -> Result<&mut Self> {
        self.register(AssociationDef {
            kind: AssociationKind::HasOne,
            source,
            target,
            accessor,
            foreign_key: source.foreign_key_column(),
            through: None,
        })
    }

    /// `source` has many `target`s; the target table holds the foreign key
    pub fn has_many(
        &mut self,
        source: EntityKind,
        target: EntityKind,
        accessor: &'static str,
    ) -> Result<&mut Self> {
        self.register(AssociationDef {
            kind: AssociationKind::HasMany,
            source,
            target,
            accessor,
            foreign_key: source.foreign_key_column(),
            through: None,
        })
    }

    /// `source` belongs to one `target`; the source table holds the foreign key
    pub fn belongs_to(
        &mut self,
        source: EntityKind,
        target: EntityKind,
        accessor: &'static str,
    ) -> Result<&mut Self> {
        self.register(AssociationDef {
            kind: AssociationKind::BelongsTo,
            source,
            target,
            accessor,
            foreign_key: target.foreign_key_column(),
            through: None,
        })
    }

    /// Many-to-many through the join table `through`
    pub fn belongs_to_many(
        &mut self,
        source: EntityKind,
        target: EntityKind,
        accessor: &'static str,
        through: &'static str,
    ) -> Result<&mut Self> {
        self.register(AssociationDef {
            kind: AssociationKind::BelongsToMany,
            source,
            target,
            accessor,
            foreign_key: source.foreign_key_column(),
            through: Some(JoinTable {
                table: through,
                source_key: source.foreign_key_column(),
                target_key: target.foreign_key_column(),
            }),
        })
    }

    fn register(&mut self, assoc: AssociationDef) -> Result<&mut Self> {
        for kind in [assoc.source, assoc.target] {
            if !self.entities.iter().any(|e| e.kind == kind) {
                return Err(SocialError::UndefinedEntity { entity: kind }.into());
            }
        }

        if self
            .associations
            .iter()
            .any(|a| a.source == assoc.source && a.accessor == assoc.accessor)
        {
            return Err(SocialError::DuplicateAccessor {
                source_entity: assoc.source,
                accessor: assoc.accessor.to_string(),
            }
            .into());
        }

        if let Some(holder) = assoc.foreign_key_holder() {
            let references = referenced_entity(&assoc);
            let clashes_with_field = self
                .entity(holder)?
                .field(assoc.foreign_key)
                .is_some();
            let clashes_with_fk = self
                .foreign_keys_on(holder)
                .iter()
                .any(|fk| fk.column == assoc.foreign_key && fk.references != references);
            if clashes_with_field || clashes_with_fk {
                return Err(SocialError::ConflictingForeignKey {
                    table: holder.table().to_string(),
                    column: assoc.foreign_key.to_string(),
                }
                .into());
            }
        }

        if let Some(join) = assoc.join_table_def() {
            let is_entity_table = EntityKind::ALL.iter().any(|k| k.table() == join.table);
            let conflicting = self
                .join_tables()
                .iter()
                .any(|existing| existing.table == join.table && !existing.same_shape(&join));
            if is_entity_table || conflicting {
                return Err(SocialError::ConflictingForeignKey {
                    table: join.table.to_string(),
                    column: join.keys[0].column.to_string(),
                }
                .into());
            }
        }

        tracing::debug!(
            association = %assoc.path(),
            kind = ?assoc.kind,
            target = %assoc.target,
            "registered association"
        );
        self.associations.push(assoc);
        Ok(self)
    }

    /// Look up an entity definition
    pub fn entity(&self, kind: EntityKind) -> Result<&EntityDef> {
        self.entities
            .iter()
            .find(|e| e.kind == kind)
            .ok_or_else(|| SocialError::UndefinedEntity { entity: kind }.into())
    }

    pub fn entities(&self) -> &[EntityDef] {
        &self.entities
    }

    pub fn associations(&self) -> &[AssociationDef] {
        &self.associations
    }

    /// Associations whose source is `kind`, in declaration order
    pub fn associations_from(&self, kind: EntityKind) -> impl Iterator<Item = &AssociationDef> {
        self.associations.iter().filter(move |a| a.source == kind)
    }

    /// The declaration for the other side of `assoc`, if one was made
    ///
    /// Both sides share the foreign-key column, or the join table for
    /// many-to-many.
    pub fn inverse(&self, assoc: &AssociationDef) -> Option<&AssociationDef> {
        self.associations_from(assoc.target).find(|other| {
            other.target == assoc.source
                && match (assoc.through, other.through) {
                    (Some(a), Some(b)) => a.table == b.table,
                    (None, None) => {
                        other.foreign_key == assoc.foreign_key
                            && referenced_entity(other) == referenced_entity(assoc)
                    }
                    _ => false,
                }
        })
    }

    /// Whether setting a belongs-to link must first release the target's
    /// previous holder, because the other side is has-one
    pub fn is_exclusive(&self, assoc: &AssociationDef) -> bool {
        assoc.kind == AssociationKind::BelongsTo
            && matches!(self.inverse(assoc), Some(other) if other.kind == AssociationKind::HasOne)
    }

    /// Find the association reached as `source.accessor`
    pub fn association(&self, source: EntityKind, accessor: &str) -> Result<&AssociationDef> {
        self.associations
            .iter()
            .find(|a| a.source == source && a.accessor == accessor)
            .ok_or_else(|| {
                SocialError::UnknownAssociation {
                    source_entity: source,
                    accessor: accessor.to_string(),
                }
                .into()
            })
    }

    /// Resolve a `entity.accessor` path such as `user.posts`
    pub fn resolve(&self, path: &str) -> Result<&AssociationDef> {
        let (entity, accessor) = path.split_once('.').ok_or_else(|| SocialError::InvalidInput {
            message: format!("association path '{}' must look like entity.accessor", path),
        })?;
        self.association(entity.parse()?, accessor.trim())
    }

    /// Foreign-key columns carried by `kind`'s table, deduplicated
    pub fn foreign_keys_on(&self, kind: EntityKind) -> Vec<ForeignKey> {
        let mut keys: Vec<ForeignKey> = Vec::new();
        for assoc in &self.associations {
            if assoc.foreign_key_holder() != Some(kind) {
                continue;
            }
            let fk = ForeignKey {
                column: assoc.foreign_key,
                references: referenced_entity(assoc),
            };
            if !keys.contains(&fk) {
                keys.push(fk);
            }
        }
        keys
    }

    /// Foreign keys on other tables that reference `kind`
    pub fn incoming_foreign_keys(&self, kind: EntityKind) -> Vec<(EntityKind, ForeignKey)> {
        self.entities
            .iter()
            .flat_map(|e| {
                self.foreign_keys_on(e.kind)
                    .into_iter()
                    .filter(|fk| fk.references == kind)
                    .map(move |fk| (e.kind, fk))
            })
            .collect()
    }

    /// Join tables, one entry per table even when both sides declare it
    pub fn join_tables(&self) -> Vec<JoinTableDef> {
        let mut tables: Vec<JoinTableDef> = Vec::new();
        for join in self.associations.iter().filter_map(|a| a.join_table_def()) {
            if !tables.iter().any(|t| t.table == join.table) {
                tables.push(join);
            }
        }
        tables
    }

    /// Column names of `kind`'s table in storage order
    pub fn columns(&self, kind: EntityKind) -> Result<Vec<&'static str>> {
        let def = self.entity(kind)?;
        let mut columns = vec![ID_COLUMN];
        columns.extend(def.fields.iter().map(|f| f.name));
        columns.extend(self.foreign_keys_on(kind).iter().map(|fk| fk.column));
        columns.push(CREATED_AT_COLUMN);
        columns.push(UPDATED_AT_COLUMN);
        Ok(columns)
    }

    /// Entities ordered so referenced tables come before referencing ones
    pub fn table_order(&self) -> Result<Vec<EntityKind>> {
        let mut placed: Vec<EntityKind> = Vec::with_capacity(self.entities.len());
        let mut pending: Vec<EntityKind> = self.entities.iter().map(|e| e.kind).collect();

        while !pending.is_empty() {
            let next = pending.iter().position(|kind| {
                self.foreign_keys_on(*kind)
                    .iter()
                    .all(|fk| fk.references == *kind || placed.contains(&fk.references))
            });
            match next {
                Some(idx) => placed.push(pending.remove(idx)),
                None => {
                    return Err(SocialError::ForeignKeyCycle { entity: pending[0] }.into());
                }
            }
        }

        Ok(placed)
    }
}

fn referenced_entity(assoc: &AssociationDef) -> EntityKind {
    match assoc.kind {
        AssociationKind::BelongsTo => assoc.target,
        _ => assoc.source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;

    #[test]
    fn test_social_registry_builds() {
        let registry = Registry::social().unwrap();
        assert_eq!(registry.entities().len(), 5);
        assert_eq!(registry.associations().len(), 8);
    }

    #[test]
    fn test_foreign_keys_are_deduplicated() {
        let registry = Registry::social().unwrap();
        // has_one User->Profile and belongs_to Profile->User share profiles.user_id
        let fks = registry.foreign_keys_on(EntityKind::Profile);
        assert_eq!(
            fks,
            vec![ForeignKey {
                column: "user_id",
                references: EntityKind::User
            }]
        );
        assert!(registry.foreign_keys_on(EntityKind::User).is_empty());
        assert!(registry.foreign_keys_on(EntityKind::Like).is_empty());
    }

    #[test]
    fn test_join_table_declared_once() {
        let registry = Registry::social().unwrap();
        let joins = registry.join_tables();
        assert_eq!(joins.len(), 1);
        assert_eq!(joins[0].table, "user_likes");
    }

    #[test]
    fn test_columns_order() {
        let registry = Registry::social().unwrap();
        assert_eq!(
            registry.columns(EntityKind::Comment).unwrap(),
            vec!["id", "body", "post_id", "created_at", "updated_at"]
        );
    }

    #[test]
    fn test_table_order_places_referenced_first() {
        let registry = Registry::social().unwrap();
        let order = registry.table_order().unwrap();
        let pos = |k: EntityKind| order.iter().position(|o| *o == k).unwrap();
        assert!(pos(EntityKind::User) < pos(EntityKind::Profile));
        assert!(pos(EntityKind::User) < pos(EntityKind::Post));
        assert!(pos(EntityKind::Post) < pos(EntityKind::Comment));
    }

    #[test]
    fn test_undefined_entity_rejected() {
        let mut registry = Registry::new();
        registry
            .define(EntityDef::new(EntityKind::User, vec![]))
            .unwrap();
        let err = registry
            .has_many(EntityKind::User, EntityKind::Post, "posts")
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidSchema);
    }

    #[test]
    fn test_duplicate_accessor_rejected() {
        let mut registry = Registry::social().unwrap();
        let err = registry
            .has_many(EntityKind::User, EntityKind::Comment, "posts")
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidSchema);
    }

    #[test]
    fn test_cycle_detected() {
        let mut registry = Registry::new();
        registry
            .define(EntityDef::new(EntityKind::User, vec![]))
            .unwrap()
            .define(EntityDef::new(EntityKind::Post, vec![]))
            .unwrap();
        registry
            .belongs_to(EntityKind::User, EntityKind::Post, "pinned")
            .unwrap()
            .belongs_to(EntityKind::Post, EntityKind::User, "user")
            .unwrap();
        let err = registry.table_order().unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidSchema);
    }

    #[test]
    fn test_inverse_pairs_both_sides() {
        let registry = Registry::social().unwrap();

        let profile_user = registry.resolve("profile.user").unwrap();
        let inverse = registry.inverse(profile_user).unwrap();
        assert_eq!(inverse.accessor, "profile");
        assert!(registry.is_exclusive(profile_user));

        let post_user = registry.resolve("post.user").unwrap();
        assert_eq!(registry.inverse(post_user).unwrap().accessor, "posts");
        assert!(!registry.is_exclusive(post_user));

        let likes = registry.resolve("user.likes").unwrap();
        assert_eq!(registry.inverse(likes).unwrap().accessor, "users");
        assert!(!registry.is_exclusive(likes));
    }

    #[test]
    fn test_inverse_missing_when_one_sided() {
        let mut registry = Registry::new();
        registry
            .define(EntityDef::new(EntityKind::User, vec![]))
            .unwrap()
            .define(EntityDef::new(EntityKind::Post, vec![]))
            .unwrap();
        registry
            .belongs_to(EntityKind::Post, EntityKind::User, "user")
            .unwrap();

        let assoc = *registry.resolve("post.user").unwrap();
        assert!(registry.inverse(&assoc).is_none());
        assert!(!registry.is_exclusive(&assoc));
    }

    #[test]
    fn test_resolve_path() {
        let registry = Registry::social().unwrap();
        let assoc = registry.resolve("user.posts").unwrap();
        assert_eq!(assoc.target, EntityKind::Post);
        assert_eq!(assoc.kind, AssociationKind::HasMany);

        let err = registry.resolve("user.friends").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::UnknownAssociation);
        assert!(registry.resolve("user").is_err());
    }
}
