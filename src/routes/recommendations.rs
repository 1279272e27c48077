use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::Recommendation,
    routes::AppState,
    services::recommendations,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub selected: String,
    pub recommendations: Vec<Recommendation>,
}

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    request_id: RequestId,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    tracing::info!(
        request_id = %request_id,
        title = %request.title,
        "Processing recommendation request"
    );

    let results = recommendations::recommend_for_title(
        &state.store,
        state.posters.clone(),
        &request.title,
        state.recommendation_count,
    )
    .await?;

    tracing::info!(
        request_id = %request_id,
        results = results.len(),
        "Recommendations completed"
    );

    Ok(Json(RecommendationResponse {
        selected: request.title,
        recommendations: results,
    }))
}
