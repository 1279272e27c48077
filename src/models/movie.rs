use serde::{Deserialize, Serialize};

use super::metadata::MovieMetadata;

/// Fixed-width count vector; its length equals the vocabulary size
pub type FeatureVector = Vec<f32>;

/// A stored movie: one row of the vector store
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    /// TMDB id, unique across the store
    pub tmdb_id: i64,
    pub title: String,
    pub vector: FeatureVector,
}

impl ItemRecord {
    pub fn new(tmdb_id: i64, title: impl Into<String>, vector: FeatureVector) -> Self {
        Self {
            tmdb_id,
            title: title.into(),
            vector,
        }
    }
}

/// A candidate returned by a popular listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieSummary {
    pub tmdb_id: i64,
    pub title: String,
}

/// Full details of a movie, ready for tag extraction
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetails {
    pub tmdb_id: i64,
    pub title: String,
    pub metadata: MovieMetadata,
}

/// A recommendation returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub title: String,
    pub poster_url: String,
    pub external_id: i64,
}
