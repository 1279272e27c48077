use std::sync::Arc;

use crate::{
    db::VectorStore,
    error::{AppError, AppResult},
    models::Recommendation,
    services::{providers::PosterProvider, similarity},
};

/// Recommends movies similar to the one titled `title`
///
/// Resolves the title exactly, ranks the whole corpus against its vector
/// (excluding the movie itself) and attaches a poster URL to each of the top
/// `k` results. Posters are fetched concurrently and never fail.
pub async fn recommend_for_title(
    store: &VectorStore,
    posters: Arc<dyn PosterProvider>,
    title: &str,
    k: usize,
) -> AppResult<Vec<Recommendation>> {
    let selected = store
        .find_by_title(title)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Movie '{}' not found.", title)))?;

    let corpus = store.scan_all().await?;
    let neighbors = similarity::recommend(&selected.vector, &corpus, k, Some(selected.tmdb_id));

    tracing::debug!(
        title = %title,
        corpus_size = corpus.len(),
        results = neighbors.len(),
        "Ranked corpus"
    );

    let mut tasks = Vec::with_capacity(neighbors.len());
    for neighbor in &neighbors {
        let posters = posters.clone();
        let tmdb_id = neighbor.record.tmdb_id;
        tasks.push(tokio::spawn(
            async move { posters.fetch_poster_url(tmdb_id).await },
        ));
    }

    let mut recommendations = Vec::with_capacity(neighbors.len());
    for (neighbor, task) in neighbors.iter().zip(tasks) {
        let poster_url = task.await.map_err(|e| AppError::Internal(e.to_string()))?;
        recommendations.push(Recommendation {
            title: neighbor.record.title.clone(),
            poster_url,
            external_id: neighbor.record.tmdb_id,
        });
    }

    Ok(recommendations)
}
