use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    extract::CurrentUser,
    models::Post,
    store::memory::PostChanges,
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<i64>,
}

/// A post as it appears in the personalized feed
#[derive(Debug, Serialize)]
pub struct FeedEntry {
    #[serde(flatten)]
    pub post: Post,
    /// Derived from position: earlier entries score higher
    pub recommendation_score: usize,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub likes: u64,
}

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub views: u64,
}

// Handlers

/// Publishes a new post
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(request): Json<CreatePostRequest>,
) -> AppResult<(StatusCode, Json<Post>)> {
    if request.title.trim().is_empty() || request.body.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Title and body are required".to_string(),
        ));
    }

    let post = state
        .store
        .insert_post(Post::new(user_id, request.title, request.body, request.tags))
        .await;

    tracing::info!(post_id = %post.id, author_id = %user_id, "Post created");
    Ok((StatusCode::CREATED, Json(post)))
}

/// The personalized feed for the requesting user
///
/// Runs the ranking service, then hydrates the returned identifiers and
/// attaches a presentation score derived from position.
pub async fn feed(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<Vec<FeedEntry>>> {
    let limit = query.limit.unwrap_or(state.config.feed_limit);
    let recommended = state.feed.recommend(user_id, limit).await?;

    let total = recommended.len();
    let mut entries = Vec::with_capacity(total);
    for (position, post_id) in recommended.into_iter().enumerate() {
        if let Some(post) = state.store.get_post(post_id).await {
            entries.push(FeedEntry {
                post,
                recommendation_score: total - position,
            });
        }
    }

    Ok(Json(entries))
}

/// Posts published by the requesting user, newest first
pub async fn mine(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Json<Vec<Post>> {
    Json(state.store.posts_by_author(user_id).await)
}

/// Posts carrying the given tag, newest first
pub async fn by_tag(State(state): State<AppState>, Path(tag): Path<String>) -> Json<Vec<Post>> {
    Json(state.store.posts_by_tag(&tag).await)
}

/// Fetches a single post
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> AppResult<Json<Post>> {
    let post = state
        .store
        .get_post(post_id)
        .await
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
    Ok(Json(post))
}

/// Updates a post; only the author may do this
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(post_id): Path<Uuid>,
    Json(request): Json<UpdatePostRequest>,
) -> AppResult<Json<Post>> {
    let post = state
        .store
        .update_post(
            post_id,
            user_id,
            PostChanges {
                title: request.title,
                body: request.body,
                tags: request.tags,
            },
        )
        .await?;
    Ok(Json(post))
}

/// Deletes a post and its interactions; only the author may do this
pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(post_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.store.delete_post(post_id, user_id).await?;
    tracing::info!(post_id = %post_id, "Post deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Likes a post
pub async fn like(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(post_id): Path<Uuid>,
) -> AppResult<Json<LikeResponse>> {
    let likes = state.store.like_post(post_id, user_id).await?;
    Ok(Json(LikeResponse { likes }))
}

/// Removes a like from a post
pub async fn unlike(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(post_id): Path<Uuid>,
) -> AppResult<Json<LikeResponse>> {
    let likes = state.store.unlike_post(post_id, user_id).await?;
    Ok(Json(LikeResponse { likes }))
}

/// Records that the requesting user viewed a post
pub async fn view(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(post_id): Path<Uuid>,
) -> AppResult<Json<ViewResponse>> {
    let views = state.store.view_post(post_id, user_id).await?;
    Ok(Json(ViewResponse { views }))
}
