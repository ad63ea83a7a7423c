use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of recorded interaction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Like,
    View,
}

/// A single user/post interaction
///
/// At most one interaction exists per (user, post, kind) triple; the
/// store enforces this on insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub kind: InteractionKind,
    pub created_at: DateTime<Utc>,
}

impl Interaction {
    pub fn new(user_id: Uuid, post_id: Uuid, kind: InteractionKind) -> Self {
        Self {
            user_id,
            post_id,
            kind,
            created_at: Utc::now(),
        }
    }

    pub fn is_like(&self) -> bool {
        self.kind == InteractionKind::Like
    }

    pub fn is_view(&self) -> bool {
        self.kind == InteractionKind::View
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&InteractionKind::Like).unwrap(),
            "\"like\""
        );
        assert_eq!(
            serde_json::to_string(&InteractionKind::View).unwrap(),
            "\"view\""
        );
    }

    #[test]
    fn test_kind_predicates() {
        let like = Interaction::new(Uuid::new_v4(), Uuid::new_v4(), InteractionKind::Like);
        assert!(like.is_like());
        assert!(!like.is_view());
    }
}
