use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::{
    db::VectorStore, middleware::request_id::with_request_ids,
    services::providers::PosterProvider,
};

pub mod recommendations;
pub mod titles;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: VectorStore,
    pub posters: Arc<dyn PosterProvider>,
    /// Results per recommendation request
    pub recommendation_count: usize,
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(Arc::new(state));

    with_request_ids(router).layer(CorsLayer::permissive())
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/titles", get(titles::list))
        .route("/recommendations", post(recommendations::recommend))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
