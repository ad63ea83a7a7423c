use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::AppError;

/// HTTP header carrying the requesting user's identifier
///
/// Authentication itself lives outside this service; the gateway in
/// front of it resolves the session and forwards the user id here.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The identity a request acts as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing x-user-id header".to_string()))?;

        let user_id = Uuid::parse_str(value)
            .map_err(|_| AppError::Unauthorized("Invalid x-user-id header".to_string()))?;

        Ok(CurrentUser(user_id))
    }
}
