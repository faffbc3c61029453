use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, now_millis};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub body: Option<String>,
    pub post_id: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NewComment {
    pub body: Option<String>,
}

impl NewComment {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
        }
    }
}

impl Comment {
    pub fn create(attrs: NewComment) -> Self {
        let now = now_millis();
        Self {
            id: new_id(),
            body: attrs.body,
            post_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}
