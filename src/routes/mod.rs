use axum::{
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{
        session::{AccessToken, Session, SessionContext},
        CatalogBackend, FeaturedPicker, RecommendationResolver,
    },
};

pub mod feeds;
pub mod preferences;
pub mod recommendations;

/// List size used when a list endpoint gets no `limit`
pub const DEFAULT_LIST_LIMIT: usize = 10;

/// Shared application state
pub struct AppState {
    pub backend: Arc<dyn CatalogBackend>,
    pub resolver: RecommendationResolver,
    pub featured: FeaturedPicker,
    pub showcase_limit: usize,
}

impl AppState {
    pub fn new(backend: Arc<dyn CatalogBackend>, config: &Config) -> Self {
        Self {
            resolver: RecommendationResolver::new(
                backend.clone(),
                config.recommendation_algorithm,
            ),
            featured: FeaturedPicker::new(backend.clone(), config.featured_pool_size),
            showcase_limit: config.showcase_limit,
            backend,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/recommendations/showcase", get(recommendations::showcase))
        .route("/recommendations/featured", get(recommendations::featured))
        .route("/recommendations/for-you", get(recommendations::for_you))
        .route("/recommendations/similar/:movie_id", get(recommendations::similar))
        .route("/recommendations/taste-profile", get(recommendations::taste_profile))
        .route("/feeds/:feed", get(feeds::feed))
        .route(
            "/preferences/genres",
            get(preferences::get_genres).put(preferences::update_genres),
        )
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Token of a signed-in session, or 401
fn require_token(session: &Session) -> AppResult<&AccessToken> {
    session
        .access_token()
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
}
