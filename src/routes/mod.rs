use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::FeedService,
    store::MemoryStore,
};

pub mod posts;
pub mod profiles;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub feed: FeedService,
    pub config: Config,
}

impl AppState {
    /// Creates application state with an empty store
    pub fn new(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        let feed = FeedService::new(store.clone());
        Self {
            store,
            feed,
            config,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes(state))
        .layer(
            TraceLayer::new_for_http().make_span_with(make_span_with_request_id),
        )
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// API routes under /api/v1
fn api_routes(state: AppState) -> Router {
    Router::new()
        // Posts and the personalized feed
        .route("/posts", post(posts::create).get(posts::feed))
        .route("/posts/mine", get(posts::mine))
        .route("/posts/tag/:tag", get(posts::by_tag))
        .route(
            "/posts/:id",
            get(posts::get_by_id)
                .put(posts::update)
                .delete(posts::remove),
        )
        .route("/posts/:id/like", post(posts::like).delete(posts::unlike))
        .route("/posts/:id/view", post(posts::view))
        // Profiles
        .route(
            "/profile",
            post(profiles::create)
                .put(profiles::update)
                .delete(profiles::remove),
        )
        .route("/profile/me", get(profiles::me))
        .route("/profiles", get(profiles::list))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
