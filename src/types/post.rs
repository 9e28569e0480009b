use serde::{Deserialize, Serialize};

use super::id::{PostId, UserId};
use super::{Timestamp, User};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub created_at: Timestamp,
    pub owner_id: UserId,
    pub owner: User,
}

impl Post {
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id == user
    }
}

/// A post together with its vote tally at the time it was fetched.
///
/// **ROUTE**: `GET /posts/` and `GET /posts/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PostWithVotes {
    #[serde(rename = "Post")]
    pub post: Post,
    pub votes: u64,
}

/// Query parameters for listing posts.
///
/// **ROUTE**: `GET /posts/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct PostsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl PostsQuery {
    #[must_use]
    pub fn limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }

    /// Blank searches are not sent at all.
    #[must_use]
    pub fn search(self, search: Option<String>) -> Self {
        Self {
            search: search.filter(|v| !v.trim().is_empty()),
            ..self
        }
    }

    #[must_use]
    pub fn skip(self, skip: Option<u32>) -> Self {
        Self { skip, ..self }
    }
}

/// Payload for creating or replacing a post.
///
/// **ROUTE**: `POST /posts/` and `PUT /posts/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostPayload {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}
