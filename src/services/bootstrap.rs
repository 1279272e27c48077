//! Bootstrap loader
//!
//! Builds the initial corpus from the TMDB 5000 CSV export: joins the movies
//! and credits files on title, fits and saves the vocabulary, then vectorizes
//! and stores every movie. Runs once; the worker takes over afterwards.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::{
    db::VectorStore,
    error::AppResult,
    models::{
        metadata::{list_from_json_str, top_cast_from_json_str},
        MovieDetails, MovieMetadata,
    },
    services::{featurizer::Featurizer, tags::extract_tags, vocabulary::Vocabulary},
};

/// Columns of `tmdb_5000_movies.csv` that feed tag extraction
#[derive(Debug, Deserialize)]
struct MovieRow {
    title: String,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    genres: String,
    #[serde(default)]
    keywords: String,
}

/// Columns of `tmdb_5000_credits.csv`
#[derive(Debug, Deserialize)]
struct CreditsRow {
    movie_id: i64,
    title: String,
    #[serde(default)]
    cast: String,
    #[serde(default)]
    crew: String,
}

/// Summary of a bootstrap run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub movies: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub vocabulary_size: usize,
}

/// Reads both CSV exports and joins them on title.
///
/// Every (movie, credits) pair sharing a title yields one record keyed by the
/// credits `movie_id`. Rows without a title are dropped.
pub fn read_corpus<M: Read, C: Read>(movies: M, credits: C) -> AppResult<Vec<MovieDetails>> {
    let mut credits_by_title: HashMap<String, Vec<CreditsRow>> = HashMap::new();
    for row in csv::Reader::from_reader(credits).deserialize::<CreditsRow>() {
        let row = row?;
        credits_by_title.entry(row.title.clone()).or_default().push(row);
    }

    let mut corpus = Vec::new();
    for row in csv::Reader::from_reader(movies).deserialize::<MovieRow>() {
        let row: MovieRow = row?;
        if row.title.is_empty() {
            continue;
        }
        let Some(credits) = credits_by_title.get(&row.title) else {
            continue;
        };

        for credit in credits {
            corpus.push(MovieDetails {
                tmdb_id: credit.movie_id,
                title: row.title.clone(),
                metadata: MovieMetadata {
                    overview: row.overview.clone().filter(|o| !o.is_empty()),
                    genres: list_from_json_str(&row.genres),
                    keywords: list_from_json_str(&row.keywords),
                    cast: top_cast_from_json_str(&credit.cast),
                    crew: list_from_json_str(&credit.crew),
                },
            });
        }
    }

    tracing::info!(movies = corpus.len(), "Read bootstrap corpus");
    Ok(corpus)
}

/// Fits the vocabulary on `corpus`, saves it to `vocabulary_path`, and
/// loads every movie into the store.
pub async fn bootstrap(
    corpus: &[MovieDetails],
    store: &mut VectorStore,
    vocabulary_path: &Path,
    max_features: usize,
) -> AppResult<BootstrapReport> {
    let bags: Vec<_> = corpus.iter().map(|m| extract_tags(&m.metadata)).collect();
    let vocabulary = Arc::new(Vocabulary::fit(&bags, max_features));
    store.bind_vocabulary(&vocabulary).await?;
    vocabulary.save(vocabulary_path)?;

    let featurizer = Featurizer::new(vocabulary.clone());
    let mut inserted = 0;
    for movie in corpus {
        let vector = featurizer.featurize(&movie.metadata);
        if store
            .insert_if_absent(movie.tmdb_id, &movie.title, &vector)
            .await?
        {
            inserted += 1;
        }
    }

    let report = BootstrapReport {
        movies: corpus.len(),
        inserted,
        duplicates: corpus.len() - inserted,
        vocabulary_size: vocabulary.len(),
    };

    tracing::info!(
        movies = report.movies,
        inserted = report.inserted,
        duplicates = report.duplicates,
        vocabulary_size = report.vocabulary_size,
        "Bootstrap complete"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;
    use crate::models::TmdbMovieDetails;
    use tempfile::tempdir;

    const MOVIES_CSV: &str = r#"budget,genres,id,keywords,overview,title,vote_average
237000000,"[{""id"": 28, ""name"": ""Action""}, {""id"": 878, ""name"": ""Science Fiction""}]",19995,"[{""id"": 1463, ""name"": ""culture clash""}]",In the 22nd century a paraplegic Marine is dispatched to the moon Pandora.,Avatar,7.2
300000000,"[{""id"": 12, ""name"": ""Adventure""}]",285,"[{""id"": 270, ""name"": ""ocean""}]","Captain Barbossa, long believed to be dead, has come back to life.",Pirates of the Caribbean: At World's End,6.9
0,not json,1,[],,No Credits Movie,0
"#;

    const CREDITS_CSV: &str = r#"movie_id,title,cast,crew
19995,Avatar,"[{""name"": ""Sam Worthington""}, {""name"": ""Zoe Saldana""}, {""name"": ""Sigourney Weaver""}, {""name"": ""Stephen Lang""}]","[{""name"": ""Stephen E. Rivkin"", ""job"": ""Editor""}, {""name"": ""James Cameron"", ""job"": ""Director""}]"
285,Pirates of the Caribbean: At World's End,"[{""name"": ""Johnny Depp""}]","[{""name"": ""Gore Verbinski"", ""job"": ""Director""}]"
"#;

    #[test]
    fn test_read_corpus_joins_on_title() {
        let corpus = read_corpus(MOVIES_CSV.as_bytes(), CREDITS_CSV.as_bytes()).unwrap();

        assert_eq!(corpus.len(), 2);
        let avatar = &corpus[0];
        assert_eq!(avatar.tmdb_id, 19995);
        assert_eq!(avatar.metadata.genres.len(), 2);
        assert_eq!(avatar.metadata.cast.len(), 3);

        let tags = extract_tags(&avatar.metadata);
        assert!(tags.as_str().ends_with(
            "action sciencefiction cultureclash samworthington zoesaldana sigourneyweaver jamescameron"
        ));
    }

    #[tokio::test]
    async fn test_bootstrap_loads_store_and_saves_vocabulary() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vectorizer.json");
        let mut store = VectorStore::new(create_memory_pool().await.unwrap());

        let corpus = read_corpus(MOVIES_CSV.as_bytes(), CREDITS_CSV.as_bytes()).unwrap();
        let report = bootstrap(&corpus, &mut store, &path, 5000).await.unwrap();

        assert_eq!(report.inserted, 2);
        assert_eq!(report.duplicates, 0);
        assert_eq!(store.count().await.unwrap(), 2);

        let vocabulary = Vocabulary::load(&path).unwrap();
        assert_eq!(vocabulary.len(), report.vocabulary_size);
        assert!(vocabulary.dimension_of("jamescameron").is_some());
        assert!(vocabulary.dimension_of("the").is_none());
    }

    #[tokio::test]
    async fn test_bootstrap_ignores_duplicate_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vectorizer.json");
        let mut store = VectorStore::new(create_memory_pool().await.unwrap());

        let mut corpus = read_corpus(MOVIES_CSV.as_bytes(), CREDITS_CSV.as_bytes()).unwrap();
        corpus.push(corpus[0].clone());
        let report = bootstrap(&corpus, &mut store, &path, 5000).await.unwrap();

        assert_eq!(report.inserted, 2);
        assert_eq!(report.duplicates, 1);
    }

    #[tokio::test]
    async fn test_bootstrap_and_provider_paths_produce_identical_vectors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vectorizer.json");
        let mut store = VectorStore::new(create_memory_pool().await.unwrap());

        let corpus = read_corpus(MOVIES_CSV.as_bytes(), CREDITS_CSV.as_bytes()).unwrap();
        bootstrap(&corpus, &mut store, &path, 5000).await.unwrap();
        let stored = store.find_by_title("Avatar").await.unwrap().unwrap();

        // The same movie as the details endpoint returns it
        let response = r#"{
            "title": "Avatar",
            "overview": "In the 22nd century a paraplegic Marine is dispatched to the moon Pandora.",
            "genres": [{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}],
            "keywords": {"keywords": [{"id": 1463, "name": "culture clash"}]},
            "credits": {
                "cast": [
                    {"name": "Sam Worthington"}, {"name": "Zoe Saldana"},
                    {"name": "Sigourney Weaver"}, {"name": "Stephen Lang"}
                ],
                "crew": [
                    {"name": "Stephen E. Rivkin", "job": "Editor"},
                    {"name": "James Cameron", "job": "Director"}
                ]
            }
        }"#;
        let details = serde_json::from_str::<TmdbMovieDetails>(response)
            .unwrap()
            .into_details(19995)
            .unwrap();

        let featurizer = Featurizer::new(Arc::new(Vocabulary::load(&path).unwrap()));
        let incremental = featurizer.featurize(&details.metadata);

        let stored_bits: Vec<u32> = stored.vector.iter().map(|v| v.to_bits()).collect();
        let incremental_bits: Vec<u32> = incremental.iter().map(|v| v.to_bits()).collect();
        assert_eq!(stored_bits, incremental_bits);
    }

    #[test]
    fn test_read_corpus_counts_malformed_cast_in_billing_window() {
        let credits = r#"movie_id,title,cast,crew
19995,Avatar,"[{""name"": ""Sam Worthington""}, {""id"": 2}, {""name"": ""Sigourney Weaver""}, {""name"": ""Stephen Lang""}]",[]
"#;
        let corpus = read_corpus(MOVIES_CSV.as_bytes(), credits.as_bytes()).unwrap();

        let tags = extract_tags(&corpus[0].metadata);
        assert!(tags.as_str().ends_with("samworthington sigourneyweaver"));
        assert!(!tags.tokens().any(|t| t == "stephenlang"));
    }
}
