use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Movie;

/// Review author as sent by the backend: older serializers send the bare
/// username, newer ones a small profile object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AuthorRef {
    Username(String),
    Profile {
        username: String,
        #[serde(default, alias = "avatar")]
        avatar_url: Option<String>,
    },
}

/// Normalized review author
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Author {
    pub username: String,
    pub avatar_url: Option<String>,
}

impl AuthorRef {
    pub fn normalize(&self) -> Author {
        match self {
            AuthorRef::Username(username) => Author {
                username: username.clone(),
                avatar_url: None,
            },
            AuthorRef::Profile {
                username,
                avatar_url,
            } => Author {
                username: username.clone(),
                avatar_url: avatar_url.clone(),
            },
        }
    }

    pub fn username(&self) -> &str {
        match self {
            AuthorRef::Username(username) | AuthorRef::Profile { username, .. } => username,
        }
    }
}

/// A user's review of a movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: i64,
    pub user: AuthorRef,
    pub movie: Movie,
    #[serde(default)]
    pub content: String,
    pub rating: u8,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_edited: bool,
}

impl Review {
    pub fn author(&self) -> Author {
        self.user.normalize()
    }
}
