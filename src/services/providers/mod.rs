//! External movie data providers
//!
//! The metadata provider feeds the ingestion worker; the poster provider
//! decorates recommendation results. Both are fallible network collaborators:
//! callers skip, log, or fall back, and never retry.
use crate::{
    error::AppResult,
    models::{MovieDetails, MovieSummary},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Shown when a poster cannot be resolved
pub const PLACEHOLDER_POSTER_URL: &str =
    "https://placehold.co/500x750/1e1e1e/e0e0e0?text=Poster+Not+Found";

/// Source of candidate movies and their metadata
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// One page of currently popular movies
    async fn fetch_popular_page(&self, page: u32) -> AppResult<Vec<MovieSummary>>;

    /// Overview, genres, keywords and credits of one movie
    async fn fetch_details(&self, tmdb_id: i64) -> AppResult<MovieDetails>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Source of poster images
#[async_trait::async_trait]
pub trait PosterProvider: Send + Sync {
    /// Always yields a usable URL, the placeholder on any failure
    async fn fetch_poster_url(&self, tmdb_id: i64) -> String;
}
