use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's declared profile
///
/// `skills` and `interests` drive the personalized feed; the remaining
/// fields are descriptive. At most one profile exists per user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    /// Identifier of the user this profile belongs to (unique)
    pub user_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub occupation: Option<String>,
    /// Declared skills, matched against post tags
    #[serde(default)]
    pub skills: Vec<String>,
    /// Declared feed preferences, matched against post tags
    #[serde(default)]
    pub interests: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Creates a new profile for a user
    pub fn new(user_id: Uuid, name: String) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            name,
            age: None,
            occupation: None,
            skills: Vec::new(),
            interests: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_skills(mut self, skills: Vec<String>) -> Self {
        self.skills = skills;
        self
    }

    pub fn with_interests(mut self, interests: Vec<String>) -> Self {
        self.interests = interests;
        self
    }
}
