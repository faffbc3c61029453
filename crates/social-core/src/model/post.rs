use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, now_millis};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: Option<String>,
    pub body: Option<String>,
    pub user_id: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NewPost {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl NewPost {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            body: Some(body.into()),
        }
    }
}

impl Post {
    pub fn create(attrs: NewPost) -> Self {
        let now = now_millis();
        Self {
            id: new_id(),
            title: attrs.title,
            body: attrs.body,
            user_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}
