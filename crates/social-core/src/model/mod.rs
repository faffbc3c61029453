//! Entity records and their create-time attribute sets

mod comment;
mod like;
mod post;
mod profile;
mod user;

pub use comment::{Comment, NewComment};
pub use like::{Like, NewLike};
pub use post::{NewPost, Post};
pub use profile::{NewProfile, Profile};
pub use user::{NewUser, User};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{ExError, ExErrorKind, Result};
use crate::schema::EntityKind;

/// Generate a record identity (UUIDv7, time-ordered)
pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// Current time truncated to the millisecond precision used in storage
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// Any persisted record, tagged with its entity kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum EntityRecord {
    User(User),
    Profile(Profile),
    Post(Post),
    Comment(Comment),
    Like(Like),
}

impl EntityRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRecord::User(_) => EntityKind::User,
            EntityRecord::Profile(_) => EntityKind::Profile,
            EntityRecord::Post(_) => EntityKind::Post,
            EntityRecord::Comment(_) => EntityKind::Comment,
            EntityRecord::Like(_) => EntityKind::Like,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            EntityRecord::User(r) => &r.id,
            EntityRecord::Profile(r) => &r.id,
            EntityRecord::Post(r) => &r.id,
            EntityRecord::Comment(r) => &r.id,
            EntityRecord::Like(r) => &r.id,
        }
    }

    /// Column name to value map; timestamps are epoch milliseconds
    pub fn to_columns(&self) -> Result<Map<String, Value>> {
        let value = match self {
            EntityRecord::User(r) => serde_json::to_value(r)?,
            EntityRecord::Profile(r) => serde_json::to_value(r)?,
            EntityRecord::Post(r) => serde_json::to_value(r)?,
            EntityRecord::Comment(r) => serde_json::to_value(r)?,
            EntityRecord::Like(r) => serde_json::to_value(r)?,
        };
        match value {
            Value::Object(map) => Ok(map),
            _ => Err(ExError::new(ExErrorKind::Serialization)
                .with_entity(self.kind())
                .with_message("record did not serialize to an object")),
        }
    }

    /// Rebuild a record from a column map produced by `to_columns` or storage
    pub fn from_columns(kind: EntityKind, columns: Map<String, Value>) -> Result<Self> {
        let value = Value::Object(columns);
        let record = match kind {
            EntityKind::User => EntityRecord::User(serde_json::from_value(value)?),
            EntityKind::Profile => EntityRecord::Profile(serde_json::from_value(value)?),
            EntityKind::Post => EntityRecord::Post(serde_json::from_value(value)?),
            EntityKind::Comment => EntityRecord::Comment(serde_json::from_value(value)?),
            EntityKind::Like => EntityRecord::Like(serde_json::from_value(value)?),
        };
        Ok(record)
    }

    /// Value of a foreign-key column, `None` when unset or not carried
    pub fn foreign_key(&self, column: &str) -> Option<&str> {
        match (self, column) {
            (EntityRecord::Profile(r), "user_id") => r.user_id.as_deref(),
            (EntityRecord::Post(r), "user_id") => r.user_id.as_deref(),
            (EntityRecord::Comment(r), "post_id") => r.post_id.as_deref(),
            _ => None,
        }
    }

    /// Point a foreign-key column at `value` and bump `updated_at`
    pub fn set_foreign_key(
        &mut self,
        column: &str,
        value: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let kind = self.kind();
        match (self, column) {
            (EntityRecord::Profile(r), "user_id") => {
                r.user_id = value;
                r.updated_at = at;
            }
            (EntityRecord::Post(r), "user_id") => {
                r.user_id = value;
                r.updated_at = at;
            }
            (EntityRecord::Comment(r), "post_id") => {
                r.post_id = value;
                r.updated_at = at;
            }
            _ => {
                return Err(ExError::new(ExErrorKind::Internal)
                    .with_entity(kind)
                    .with_message(format!("{} has no foreign key {}", kind, column)))
            }
        }
        Ok(())
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        match self {
            EntityRecord::User(r) => r.updated_at,
            EntityRecord::Profile(r) => r.updated_at,
            EntityRecord::Post(r) => r.updated_at,
            EntityRecord::Comment(r) => r.updated_at,
            EntityRecord::Like(r) => r.updated_at,
        }
    }
}

macro_rules! record_conversions {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for EntityRecord {
                fn from(record: $variant) -> Self {
                    EntityRecord::$variant(record)
                }
            }

            impl TryFrom<EntityRecord> for $variant {
                type Error = ExError;

                fn try_from(record: EntityRecord) -> Result<Self> {
                    match record {
                        EntityRecord::$variant(inner) => Ok(inner),
                        other => Err(ExError::new(ExErrorKind::Internal)
                            .with_entity(other.kind())
                            .with_entity_id(other.id())
                            .with_message(format!(
                                "expected a {} record",
                                stringify!($variant)
                            ))),
                    }
                }
            }
        )*
    };
}

record_conversions!(User, Profile, Post, Comment, Like);

/// Convert storage records into a typed sequence
pub fn typed<T>(records: Vec<EntityRecord>) -> Result<Vec<T>>
where
    T: TryFrom<EntityRecord, Error = ExError>,
{
    records.into_iter().map(T::try_from).collect()
}

/// Attributes for a record about to be created
#[derive(Debug, Clone, PartialEq)]
pub enum NewRecord {
    User(NewUser),
    Profile(NewProfile),
    Post(NewPost),
    Comment(NewComment),
    Like(NewLike),
}

impl NewRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            NewRecord::User(_) => EntityKind::User,
            NewRecord::Profile(_) => EntityKind::Profile,
            NewRecord::Post(_) => EntityKind::Post,
            NewRecord::Comment(_) => EntityKind::Comment,
            NewRecord::Like(_) => EntityKind::Like,
        }
    }

    /// Parse attributes for `kind`; missing required or unknown keys fail validation
    pub fn from_json(kind: EntityKind, attrs: Value) -> Result<Self> {
        let invalid = |e: serde_json::Error| {
            ExError::new(ExErrorKind::Validation)
                .with_entity(kind)
                .with_op("create")
                .with_message(e.to_string())
        };
        let record = match kind {
            EntityKind::User => NewRecord::User(serde_json::from_value(attrs).map_err(invalid)?),
            EntityKind::Profile => {
                NewRecord::Profile(serde_json::from_value(attrs).map_err(invalid)?)
            }
            EntityKind::Post => NewRecord::Post(serde_json::from_value(attrs).map_err(invalid)?),
            EntityKind::Comment => {
                NewRecord::Comment(serde_json::from_value(attrs).map_err(invalid)?)
            }
            EntityKind::Like => NewRecord::Like(serde_json::from_value(attrs).map_err(invalid)?),
        };
        Ok(record)
    }

    /// Assign identity and timestamps
    pub fn into_record(self) -> EntityRecord {
        match self {
            NewRecord::User(attrs) => User::create(attrs).into(),
            NewRecord::Profile(attrs) => Profile::create(attrs).into(),
            NewRecord::Post(attrs) => Post::create(attrs).into(),
            NewRecord::Comment(attrs) => Comment::create(attrs).into(),
            NewRecord::Like(attrs) => Like::create(attrs).into(),
        }
    }
}
