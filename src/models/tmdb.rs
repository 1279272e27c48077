use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

use super::metadata::{
    lenient_list, lenient_string, lenient_top_cast, CrewMember, MovieMetadata, NamedEntry,
};
use super::movie::{MovieDetails, MovieSummary};
use crate::error::AppError;

// ============================================================================
// TMDB API Types
// ============================================================================

/// Response from GET /movie/popular
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbPopularPage {
    #[serde(default, deserialize_with = "lenient_list")]
    pub results: Vec<TmdbMovieSummary>,
}

/// One entry of a popular listing
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieSummary {
    pub id: i64,
    pub title: String,
}

impl From<TmdbMovieSummary> for MovieSummary {
    fn from(summary: TmdbMovieSummary) -> Self {
        MovieSummary {
            tmdb_id: summary.id,
            title: summary.title,
        }
    }
}

/// Response from GET /movie/{id}?append_to_response=credits,keywords
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbMovieDetails {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub overview: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub genres: Vec<NamedEntry>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub keywords: TmdbKeywords,
    #[serde(default, deserialize_with = "lenient_object")]
    pub credits: TmdbCredits,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbKeywords {
    #[serde(default, deserialize_with = "lenient_list")]
    pub keywords: Vec<NamedEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbCredits {
    #[serde(default, deserialize_with = "lenient_top_cast")]
    pub cast: Vec<NamedEntry>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub crew: Vec<CrewMember>,
}

/// Deserializes a nested object, falling back to its default when malformed
fn lenient_object<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

impl TmdbMovieDetails {
    /// Converts the provider response into a detail record for `tmdb_id`.
    ///
    /// Fails only when the title is missing or empty; every other field
    /// degrades to an empty contribution.
    pub fn into_details(self, tmdb_id: i64) -> Result<MovieDetails, AppError> {
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                AppError::MalformedMetadata(format!("TMDB details for {} have no title", tmdb_id))
            })?;

        Ok(MovieDetails {
            tmdb_id,
            title,
            metadata: MovieMetadata {
                overview: self.overview,
                genres: self.genres,
                keywords: self.keywords.keywords,
                cast: self.credits.cast,
                crew: self.credits.crew,
            },
        })
    }
}
