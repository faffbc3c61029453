use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SocialError};

/// The record types persisted by the storage layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Profile,
    Post,
    Comment,
    Like,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::User,
        EntityKind::Profile,
        EntityKind::Post,
        EntityKind::Comment,
        EntityKind::Like,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::User => "User",
            EntityKind::Profile => "Profile",
            EntityKind::Post => "Post",
            EntityKind::Comment => "Comment",
            EntityKind::Like => "Like",
        }
    }

    /// Storage table name
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::User => "users",
            EntityKind::Profile => "profiles",
            EntityKind::Post => "posts",
            EntityKind::Comment => "comments",
            EntityKind::Like => "likes",
        }
    }

    /// Column name used by other tables to reference this entity
    pub fn foreign_key_column(&self) -> &'static str {
        match self {
            EntityKind::User => "user_id",
            EntityKind::Profile => "profile_id",
            EntityKind::Post => "post_id",
            EntityKind::Comment => "comment_id",
            EntityKind::Like => "like_id",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = crate::errors::ExError;

    /// Accepts the entity name or its table name, case-insensitively
    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(&lowered) || kind.table() == lowered)
            .ok_or_else(|| {
                SocialError::InvalidInput {
                    message: format!("unknown entity '{}'", s),
                }
                .into()
            })
    }
}

/// Storage type of a declared attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
}

impl FieldType {
    pub fn sql_type(&self) -> &'static str {
        match self {
            FieldType::Text => "TEXT",
        }
    }
}

/// A declared attribute of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub ty: FieldType,
    pub nullable: bool,
}

impl FieldDef {
    /// Nullable text attribute
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            ty: FieldType::Text,
            nullable: true,
        }
    }

    /// Text attribute that must be present on create
    pub const fn required_text(name: &'static str) -> Self {
        Self {
            name,
            ty: FieldType::Text,
            nullable: false,
        }
    }
}

/// An entity's declared field set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDef {
    pub kind: EntityKind,
    pub fields: Vec<FieldDef>,
}

impl EntityDef {
    pub fn new(kind: EntityKind, fields: Vec<FieldDef>) -> Self {
        Self { kind, fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Reject attribute maps where a non-nullable field is absent or null
    pub fn check_required(&self, attrs: &serde_json::Map<String, serde_json::Value>) -> Result<()> {
        for field in self.fields.iter().filter(|f| !f.nullable) {
            match attrs.get(field.name) {
                None | Some(serde_json::Value::Null) => {
                    return Err(SocialError::MissingField {
                        entity: self.kind,
                        field: field.name,
                    }
                    .into())
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}
