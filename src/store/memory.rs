use std::collections::{HashMap, HashSet};

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Interaction, InteractionKind, Post, UserProfile},
    store::FeedStore,
};

/// Partial update for a post; `None` fields are left untouched
#[derive(Debug, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Partial update for a profile; `None` fields are left untouched
#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub age: Option<u8>,
    pub occupation: Option<String>,
    pub skills: Option<Vec<String>>,
    pub interests: Option<Vec<String>>,
}

#[derive(Default)]
struct Inner {
    posts: HashMap<Uuid, Post>,
    profiles: HashMap<Uuid, UserProfile>,
    interactions: Vec<Interaction>,
}

/// In-memory data store
///
/// Serves as both the CRUD backend for the HTTP surface and the
/// read-only snapshot source for the feed ranker. Uniqueness rules:
/// one profile per user, one interaction per (user, post, kind).
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Posts ----

    /// Inserts a freshly created post
    pub async fn insert_post(&self, post: Post) -> Post {
        let mut inner = self.inner.write().await;
        inner.posts.insert(post.id, post.clone());
        post
    }

    pub async fn get_post(&self, post_id: Uuid) -> Option<Post> {
        let inner = self.inner.read().await;
        inner.posts.get(&post_id).cloned()
    }

    /// All posts, newest first
    pub async fn all_posts(&self) -> Vec<Post> {
        let inner = self.inner.read().await;
        sorted_newest_first(inner.posts.values().cloned().collect())
    }

    /// Posts carrying the exact (un-normalized) tag, newest first
    pub async fn posts_by_tag(&self, tag: &str) -> Vec<Post> {
        let inner = self.inner.read().await;
        sorted_newest_first(
            inner
                .posts
                .values()
                .filter(|p| p.tags.iter().any(|t| t == tag))
                .cloned()
                .collect(),
        )
    }

    /// Posts published by a user, newest first
    pub async fn posts_by_author(&self, author_id: Uuid) -> Vec<Post> {
        let inner = self.inner.read().await;
        sorted_newest_first(
            inner
                .posts
                .values()
                .filter(|p| p.author_id == author_id)
                .cloned()
                .collect(),
        )
    }

    /// Applies a partial update; only the author may modify a post
    pub async fn update_post(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        changes: PostChanges,
    ) -> AppResult<Post> {
        let mut inner = self.inner.write().await;
        let post = inner
            .posts
            .get_mut(&post_id)
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        if post.author_id != user_id {
            return Err(AppError::Forbidden(
                "Not authorized to update this post".to_string(),
            ));
        }

        if let Some(title) = changes.title {
            post.title = title;
        }
        if let Some(body) = changes.body {
            post.body = body;
        }
        if let Some(tags) = changes.tags {
            post.tags = tags;
        }
        post.updated_at = Utc::now();

        Ok(post.clone())
    }

    /// Deletes a post and every interaction recorded against it
    pub async fn delete_post(&self, post_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let post = inner
            .posts
            .get(&post_id)
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        if post.author_id != user_id {
            return Err(AppError::Forbidden(
                "Not authorized to delete this post".to_string(),
            ));
        }

        inner.posts.remove(&post_id);
        inner.interactions.retain(|i| i.post_id != post_id);
        Ok(())
    }

    // ---- Interactions ----

    /// Records a like; rejects duplicates. Returns the new like count.
    pub async fn like_post(&self, post_id: Uuid, user_id: Uuid) -> AppResult<u64> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let post = inner
            .posts
            .get_mut(&post_id)
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        if has_interaction(&inner.interactions, user_id, post_id, InteractionKind::Like) {
            return Err(AppError::Conflict("Post already liked".to_string()));
        }

        inner
            .interactions
            .push(Interaction::new(user_id, post_id, InteractionKind::Like));
        post.likes += 1;
        Ok(post.likes)
    }

    /// Removes a like; the count never drops below zero
    pub async fn unlike_post(&self, post_id: Uuid, user_id: Uuid) -> AppResult<u64> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let post = inner
            .posts
            .get_mut(&post_id)
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        if !has_interaction(&inner.interactions, user_id, post_id, InteractionKind::Like) {
            return Err(AppError::Conflict("Post not liked yet".to_string()));
        }

        inner.interactions.retain(|i| {
            !(i.user_id == user_id && i.post_id == post_id && i.kind == InteractionKind::Like)
        });
        post.likes = post.likes.saturating_sub(1);
        Ok(post.likes)
    }

    /// Records a view. Idempotent: repeat views by the same user neither
    /// duplicate the interaction nor bump the counter. Returns the view count.
    pub async fn view_post(&self, post_id: Uuid, user_id: Uuid) -> AppResult<u64> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let post = inner
            .posts
            .get_mut(&post_id)
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        if !has_interaction(&inner.interactions, user_id, post_id, InteractionKind::View) {
            inner
                .interactions
                .push(Interaction::new(user_id, post_id, InteractionKind::View));
            post.views += 1;
        }

        Ok(post.views)
    }

    // ---- Profiles ----

    /// Creates a profile; at most one exists per user
    pub async fn create_profile(&self, profile: UserProfile) -> AppResult<UserProfile> {
        let mut inner = self.inner.write().await;
        if inner.profiles.contains_key(&profile.user_id) {
            return Err(AppError::Conflict(
                "Profile already exists for this user".to_string(),
            ));
        }
        inner.profiles.insert(profile.user_id, profile.clone());
        Ok(profile)
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Option<UserProfile> {
        let inner = self.inner.read().await;
        inner.profiles.get(&user_id).cloned()
    }

    pub async fn all_profiles(&self) -> Vec<UserProfile> {
        let inner = self.inner.read().await;
        let mut profiles: Vec<UserProfile> = inner.profiles.values().cloned().collect();
        profiles.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        profiles
    }

    /// Applies a partial update to an existing profile
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> AppResult<UserProfile> {
        let mut inner = self.inner.write().await;
        let profile = inner.profiles.get_mut(&user_id).ok_or_else(|| {
            AppError::NotFound("Profile not found. Create a profile first.".to_string())
        })?;

        if let Some(name) = changes.name {
            profile.name = name;
        }
        if let Some(age) = changes.age {
            profile.age = Some(age);
        }
        if let Some(occupation) = changes.occupation {
            profile.occupation = Some(occupation);
        }
        if let Some(skills) = changes.skills {
            profile.skills = skills;
        }
        if let Some(interests) = changes.interests {
            profile.interests = interests;
        }
        profile.updated_at = Utc::now();

        Ok(profile.clone())
    }

    pub async fn delete_profile(&self, user_id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .profiles
            .remove(&user_id)
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
        Ok(())
    }
}

fn has_interaction(
    interactions: &[Interaction],
    user_id: Uuid,
    post_id: Uuid,
    kind: InteractionKind,
) -> bool {
    interactions
        .iter()
        .any(|i| i.user_id == user_id && i.post_id == post_id && i.kind == kind)
}

/// Deterministic snapshot order: newest first, id as tiebreak
fn sorted_newest_first(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    posts
}

#[async_trait::async_trait]
impl FeedStore for MemoryStore {
    async fn profile_for(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        Ok(self.get_profile(user_id).await)
    }

    async fn interactions_for(&self, user_id: Uuid) -> AppResult<Vec<Interaction>> {
        let inner = self.inner.read().await;
        Ok(inner
            .interactions
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn candidate_posts(
        &self,
        exclude_author: Uuid,
        exclude_ids: HashSet<Uuid>,
    ) -> AppResult<Vec<Post>> {
        let inner = self.inner.read().await;
        Ok(sorted_newest_first(
            inner
                .posts
                .values()
                .filter(|p| p.author_id != exclude_author && !exclude_ids.contains(&p.id))
                .cloned()
                .collect(),
        ))
    }

    async fn post_by_id(&self, post_id: Uuid) -> AppResult<Option<Post>> {
        Ok(self.get_post(post_id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post(author: Uuid, title: &str) -> Post {
        Post::new(author, title.to_string(), "body".to_string(), vec![])
    }

    #[tokio::test]
    async fn test_insert_and_get_post() {
        let store = MemoryStore::new();
        let post = store.insert_post(sample_post(Uuid::new_v4(), "hello")).await;

        let fetched = store.get_post(post.id).await.unwrap();
        assert_eq!(fetched.title, "hello");
    }

    #[tokio::test]
    async fn test_update_post_requires_author() {
        let store = MemoryStore::new();
        let author = Uuid::new_v4();
        let post = store.insert_post(sample_post(author, "hello")).await;

        let result = store
            .update_post(
                post.id,
                Uuid::new_v4(),
                PostChanges {
                    title: Some("nope".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let updated = store
            .update_post(
                post.id,
                author,
                PostChanges {
                    title: Some("changed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "changed");
    }

    #[tokio::test]
    async fn test_like_is_unique_per_user() {
        let store = MemoryStore::new();
        let post = store.insert_post(sample_post(Uuid::new_v4(), "hello")).await;
        let fan = Uuid::new_v4();

        assert_eq!(store.like_post(post.id, fan).await.unwrap(), 1);
        let result = store.like_post(post.id, fan).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        // A different user still counts
        assert_eq!(store.like_post(post.id, Uuid::new_v4()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unlike_floors_at_zero() {
        let store = MemoryStore::new();
        let post = store.insert_post(sample_post(Uuid::new_v4(), "hello")).await;
        let fan = Uuid::new_v4();

        store.like_post(post.id, fan).await.unwrap();
        assert_eq!(store.unlike_post(post.id, fan).await.unwrap(), 0);

        let result = store.unlike_post(post.id, fan).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_view_is_idempotent() {
        let store = MemoryStore::new();
        let post = store.insert_post(sample_post(Uuid::new_v4(), "hello")).await;
        let reader = Uuid::new_v4();

        assert_eq!(store.view_post(post.id, reader).await.unwrap(), 1);
        assert_eq!(store.view_post(post.id, reader).await.unwrap(), 1);

        let interactions = store.interactions_for(reader).await.unwrap();
        assert_eq!(interactions.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_post_cascades_interactions() {
        let store = MemoryStore::new();
        let author = Uuid::new_v4();
        let post = store.insert_post(sample_post(author, "hello")).await;
        let fan = Uuid::new_v4();

        store.like_post(post.id, fan).await.unwrap();
        store.view_post(post.id, fan).await.unwrap();
        store.delete_post(post.id, author).await.unwrap();

        assert!(store.get_post(post.id).await.is_none());
        assert!(store.interactions_for(fan).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_profile_unique_per_user() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();

        store
            .create_profile(UserProfile::new(user, "Ada".to_string()))
            .await
            .unwrap();
        let result = store
            .create_profile(UserProfile::new(user, "Ada again".to_string()))
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_candidate_posts_excludes_own_and_listed() {
        let store = MemoryStore::new();
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();

        let mine = store.insert_post(sample_post(me, "mine")).await;
        let seen = store.insert_post(sample_post(other, "seen")).await;
        let fresh = store.insert_post(sample_post(other, "fresh")).await;

        let mut exclude = HashSet::new();
        exclude.insert(seen.id);

        let candidates = store.candidate_posts(me, exclude).await.unwrap();
        let ids: Vec<Uuid> = candidates.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![fresh.id]);
        assert!(!ids.contains(&mine.id));
    }
}
