use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    extract::CurrentUser,
    models::UserProfile,
    store::memory::ProfileChanges,
};

use super::AppState;

// Request types

#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub name: String,
    pub age: Option<u8>,
    pub occupation: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub age: Option<u8>,
    pub occupation: Option<String>,
    pub skills: Option<Vec<String>>,
    pub interests: Option<Vec<String>>,
}

// Handlers

/// Creates the requesting user's profile; each user gets at most one
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(request): Json<CreateProfileRequest>,
) -> AppResult<(StatusCode, Json<UserProfile>)> {
    if request.name.trim().is_empty() {
        return Err(AppError::InvalidInput("Name is required".to_string()));
    }

    let mut profile = UserProfile::new(user_id, request.name)
        .with_skills(request.skills)
        .with_interests(request.interests);
    profile.age = request.age;
    profile.occupation = request.occupation;

    let profile = state.store.create_profile(profile).await?;
    tracing::info!(user_id = %user_id, "Profile created");
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Updates the requesting user's existing profile
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(request): Json<UpdateProfileRequest>,
) -> AppResult<Json<UserProfile>> {
    let profile = state
        .store
        .update_profile(
            user_id,
            ProfileChanges {
                name: request.name,
                age: request.age,
                occupation: request.occupation,
                skills: request.skills,
                interests: request.interests,
            },
        )
        .await?;
    Ok(Json(profile))
}

/// The requesting user's own profile
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> AppResult<Json<UserProfile>> {
    let profile = state
        .store
        .get_profile(user_id)
        .await
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
    Ok(Json(profile))
}

/// All declared profiles
pub async fn list(State(state): State<AppState>) -> Json<Vec<UserProfile>> {
    Json(state.store.all_profiles().await)
}

/// Deletes the requesting user's profile
pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> AppResult<StatusCode> {
    state.store.delete_profile(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
