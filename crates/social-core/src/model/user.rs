use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, now_millis};

/// A registered account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

/// Attributes accepted when creating a User
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewUser {
    pub username: String,
    pub email: String,
}

impl NewUser {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
        }
    }
}

impl User {
    /// Build a record with a fresh identity and timestamps
    pub fn create(attrs: NewUser) -> Self {
        let now = now_millis();
        Self {
            id: new_id(),
            username: attrs.username,
            email: attrs.email,
            created_at: now,
            updated_at: now,
        }
    }
}
