//! TMDB API provider
//!
//! API Flow:
//! 1. Candidates: /movie/popular?page=N
//! 2. Details: /movie/{id}?append_to_response=credits,keywords
//! 3. Posters: /movie/{id} → poster_path, appended to the image base URL
use std::time::Duration;

use reqwest::Client as HttpClient;

use crate::{
    cached,
    config::Config,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{MovieDetails, MovieSummary, TmdbMovieDetails, TmdbPopularPage},
    services::providers::{MetadataProvider, PosterProvider, PLACEHOLDER_POSTER_URL},
};

const POSTER_CACHE_TTL: u64 = 604800; // 1 week

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    image_url: String,
    cache: Cache,
}

impl TmdbProvider {
    pub fn new(
        cache: Cache,
        api_key: String,
        api_url: String,
        image_url: String,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            image_url: image_url.trim_end_matches('/').to_string(),
            cache,
        })
    }

    pub fn from_config(config: &Config, cache: Cache) -> AppResult<Self> {
        if config.tmdb_api_key.is_empty() {
            tracing::warn!("TMDB_API_KEY is not set; provider requests will fail");
        }
        Self::new(
            cache,
            config.tmdb_api_key.clone(),
            config.tmdb_api_url.clone(),
            config.tmdb_image_url.clone(),
            config.provider_timeout(),
        )
    }

    /// GETs `path` and returns the body, failing on non-success statuses
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> AppResult<String> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", "en-US")])
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {} for {}: {}",
                status, path, body
            )));
        }

        Ok(response.text().await?)
    }

    fn poster_url(&self, poster_path: &str) -> String {
        format!("{}/{}", self.image_url, poster_path.trim_start_matches('/'))
    }

    async fn fetch_poster_path(&self, tmdb_id: i64) -> AppResult<Option<String>> {
        cached!(
            self.cache,
            CacheKey::PosterPath(tmdb_id),
            POSTER_CACHE_TTL,
            async move {
                let body = self.get(&format!("/movie/{}", tmdb_id), &[]).await?;
                let details: TmdbMovieDetails = serde_json::from_str(&body).map_err(|e| {
                    AppError::MalformedMetadata(format!("Failed to parse TMDB movie: {}", e))
                })?;
                Ok::<_, AppError>(details.poster_path.filter(|p| !p.is_empty()))
            }
        )
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn fetch_popular_page(&self, page: u32) -> AppResult<Vec<MovieSummary>> {
        let page_param = page.to_string();
        let body = self
            .get("/movie/popular", &[("page", page_param.as_str())])
            .await?;

        let listing: TmdbPopularPage = serde_json::from_str(&body).map_err(|e| {
            AppError::MalformedMetadata(format!("Failed to parse TMDB popular page: {}", e))
        })?;

        let summaries: Vec<MovieSummary> = listing.results.into_iter().map(Into::into).collect();

        tracing::info!(
            page,
            results = summaries.len(),
            provider = "tmdb",
            "Popular page fetched"
        );

        Ok(summaries)
    }

    async fn fetch_details(&self, tmdb_id: i64) -> AppResult<MovieDetails> {
        let body = self
            .get(
                &format!("/movie/{}", tmdb_id),
                &[("append_to_response", "credits,keywords")],
            )
            .await?;

        let details: TmdbMovieDetails = serde_json::from_str(&body).map_err(|e| {
            tracing::debug!(tmdb_id, response = %body, "Unparseable TMDB details");
            AppError::MalformedMetadata(format!("Failed to parse TMDB details: {}", e))
        })?;

        details.into_details(tmdb_id)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[async_trait::async_trait]
impl PosterProvider for TmdbProvider {
    async fn fetch_poster_url(&self, tmdb_id: i64) -> String {
        match self.fetch_poster_path(tmdb_id).await {
            Ok(Some(path)) => self.poster_url(&path),
            Ok(None) => {
                tracing::debug!(tmdb_id, "Movie has no poster");
                PLACEHOLDER_POSTER_URL.to_string()
            }
            Err(e) => {
                tracing::warn!(tmdb_id, error = %e, "Poster lookup failed");
                PLACEHOLDER_POSTER_URL.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_provider(api_url: &str) -> TmdbProvider {
        let (cache, _handle) = Cache::disabled();
        TmdbProvider::new(
            cache,
            "test_key".to_string(),
            api_url.to_string(),
            "https://image.tmdb.org/t/p/w500/".to_string(),
            Duration::from_millis(200),
        )
        .unwrap()
    }

    #[test]
    fn test_poster_url_joins_paths() {
        let provider = create_test_provider("http://test.local");
        assert_eq!(
            provider.poster_url("/abc.jpg"),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
    }

    #[tokio::test]
    async fn test_unreachable_provider_yields_placeholder_poster() {
        // Port 9 (discard) on localhost refuses connections
        let provider = create_test_provider("http://127.0.0.1:9");
        assert_eq!(provider.fetch_poster_url(550).await, PLACEHOLDER_POSTER_URL);
    }

    /// Serves `/movie/{id}` with a fixed poster path on an ephemeral port
    async fn spawn_tmdb_stub() -> String {
        let app = axum::Router::new().route(
            "/movie/:id",
            axum::routing::get(|| async {
                axum::Json(serde_json::json!({"title": "Fight Club", "poster_path": "/fc.jpg"}))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", address)
    }

    #[tokio::test]
    async fn test_poster_survives_unreachable_redis() {
        let api_url = spawn_tmdb_stub().await;
        let client = crate::db::create_redis_client("redis://127.0.0.1:9").unwrap();
        let (cache, _handle) = Cache::new(client);
        let provider = TmdbProvider::new(
            cache,
            "test_key".to_string(),
            api_url,
            "https://image.tmdb.org/t/p/w500".to_string(),
            Duration::from_secs(2),
        )
        .unwrap();

        assert_eq!(
            provider.fetch_poster_url(550).await,
            "https://image.tmdb.org/t/p/w500/fc.jpg"
        );
    }

    #[tokio::test]
    async fn test_unreachable_provider_fails_details() {
        let provider = create_test_provider("http://127.0.0.1:9");
        let err = provider.fetch_details(550).await.unwrap_err();
        assert!(err.is_provider_error());
    }
}
