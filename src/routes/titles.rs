use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{error::AppResult, routes::AppState};

/// Handler listing every stored title, alphabetically
pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<String>>> {
    let titles = state.store.list_titles().await?;
    Ok(Json(titles))
}
