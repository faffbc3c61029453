use serde::Serialize;

use super::entity::EntityKind;

/// Kind of a directional association
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    /// Source has at most one target; the target holds the foreign key
    HasOne,
    /// Source has many targets; each target holds the foreign key
    HasMany,
    /// Source holds a foreign key to one target
    BelongsTo,
    /// Pairs of identities stored in a join table
    BelongsToMany,
}

impl AssociationKind {
    /// True when the getter returns a sequence
    pub fn is_collection(&self) -> bool {
        matches!(self, AssociationKind::HasMany | AssociationKind::BelongsToMany)
    }
}

/// A foreign-key column and the entity it references
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references: EntityKind,
}

/// Join table as seen from one side of a many-to-many association
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinTable {
    pub table: &'static str,
    /// Column holding the source identity
    pub source_key: &'static str,
    /// Column holding the target identity
    pub target_key: &'static str,
}

/// Storage shape of a join table, independent of direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinTableDef {
    pub table: &'static str,
    pub keys: [ForeignKey; 2],
}

/// A declared association between two entities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssociationDef {
    pub kind: AssociationKind,
    pub source: EntityKind,
    pub target: EntityKind,
    pub accessor: &'static str,
    /// FK column: on the target table for has-one/has-many, on the source
    /// table for belongs-to, the source key in the join table otherwise
    pub foreign_key: &'static str,
    pub through: Option<JoinTable>,
}

impl AssociationDef {
    /// Entity whose table carries `foreign_key`, if the association uses one
    pub fn foreign_key_holder(&self) -> Option<EntityKind> {
        match self.kind {
            AssociationKind::HasOne | AssociationKind::HasMany => Some(self.target),
            AssociationKind::BelongsTo => Some(self.source),
            AssociationKind::BelongsToMany => None,
        }
    }

    /// `source.accessor` path, e.g. `user.posts`
    pub fn path(&self) -> String {
        format!("{}.{}", self.source.name().to_ascii_lowercase(), self.accessor)
    }

    /// Join table shape for many-to-many associations
    pub fn join_table_def(&self) -> Option<JoinTableDef> {
        self.through.map(|through| JoinTableDef {
            table: through.table,
            keys: [
                ForeignKey {
                    column: through.source_key,
                    references: self.source,
                },
                ForeignKey {
                    column: through.target_key,
                    references: self.target,
                },
            ],
        })
    }
}

impl JoinTableDef {
    /// Same table and same key columns, in any order
    pub fn same_shape(&self, other: &JoinTableDef) -> bool {
        self.table == other.table
            && ((self.keys[0] == other.keys[0] && self.keys[1] == other.keys[1])
                || (self.keys[0] == other.keys[1] && self.keys[1] == other.keys[0]))
    }
}
