use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, now_millis};

/// Public profile details; linked to at most one User through `user_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    /// Kept as entered, e.g. "01/01/01"
    pub birthday: Option<String>,
    pub user_id: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NewProfile {
    pub bio: Option<String>,
    #[serde(alias = "profilePicture")]
    pub profile_picture: Option<String>,
    pub birthday: Option<String>,
}

impl NewProfile {
    pub fn new(
        bio: impl Into<String>,
        profile_picture: impl Into<String>,
        birthday: impl Into<String>,
    ) -> Self {
        Self {
            bio: Some(bio.into()),
            profile_picture: Some(profile_picture.into()),
            birthday: Some(birthday.into()),
        }
    }
}

impl Profile {
    pub fn create(attrs: NewProfile) -> Self {
        let now = now_millis();
        Self {
            id: new_id(),
            bio: attrs.bio,
            profile_picture: attrs.profile_picture,
            birthday: attrs.birthday,
            user_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}
