use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A post published by a user
///
/// Tags are free-text strings; the feed ranker normalizes them for
/// comparison but the original spelling is what gets displayed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    /// Unique identifier for the post
    pub id: Uuid,
    /// Identifier of the user who published the post
    pub author_id: Uuid,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Like counter, maintained by the interaction endpoints
    #[serde(default)]
    pub likes: u64,
    /// View counter, maintained by the interaction endpoints
    #[serde(default)]
    pub views: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Creates a new post with fresh id and timestamps
    pub fn new(author_id: Uuid, title: String, body: String, tags: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            body,
            tags,
            likes: 0,
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
