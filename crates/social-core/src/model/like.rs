use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, now_millis};

/// A reaction that any number of users can share
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Like {
    pub id: String,
    pub reaction_type: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NewLike {
    #[serde(alias = "reactionType")]
    pub reaction_type: Option<String>,
}

impl NewLike {
    pub fn new(reaction_type: impl Into<String>) -> Self {
        Self {
            reaction_type: Some(reaction_type.into()),
        }
    }
}

impl Like {
    pub fn create(attrs: NewLike) -> Self {
        let now = now_millis();
        Self {
            id: new_id(),
            reaction_type: attrs.reaction_type,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaction_type_alias() {
        let attrs: NewLike = serde_json::from_str(r#"{"reactionType":"happy"}"#).unwrap();
        let like = Like::create(attrs);
        assert_eq!(like.reaction_type.as_deref(), Some("happy"));
    }
}
