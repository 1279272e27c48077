//! Frozen vocabulary model and count vectorizer
//!
//! The vocabulary is fitted once from the bootstrap corpus and saved as a JSON
//! artifact. Every later vectorization (bootstrap and ingestion alike) loads
//! that artifact, so stored vectors stay comparable. Refitting invalidates
//! every stored vector; the store refuses a vocabulary with a different
//! checksum (see [`crate::db::VectorStore::bind_vocabulary`]).

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::FeatureVector;
use crate::services::stop_words::is_stop_word;
use crate::services::tags::TagBag;

/// Artifact format understood by this build
pub const FORMAT_VERSION: u32 = 1;

/// Runs of two or more word characters
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?u)\b\w\w+\b").expect("token pattern is a valid regex")
});

/// On-disk representation of a fitted vocabulary
#[derive(Debug, Clone, Serialize, Deserialize)]
struct VocabularyArtifact {
    format_version: u32,
    checksum: String,
    max_features: usize,
    document_count: usize,
    fitted_at: DateTime<Utc>,
    terms: Vec<String>,
}

/// Immutable term → dimension mapping
#[derive(Debug, Clone)]
pub struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, usize>,
    checksum: String,
    max_features: usize,
    document_count: usize,
    fitted_at: DateTime<Utc>,
}

impl Vocabulary {
    /// Fits a vocabulary from the tag bags of the initial corpus.
    ///
    /// Keeps the `max_features` most frequent non-stop-word terms (ties broken
    /// alphabetically), then orders the kept terms alphabetically to assign
    /// dimensions.
    pub fn fit(bags: &[TagBag], max_features: usize) -> Self {
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for bag in bags {
            for term in TOKEN_PATTERN.find_iter(bag.as_str()) {
                let term = term.as_str();
                if !is_stop_word(term) {
                    *counts.entry(term).or_insert(0) += 1;
                }
            }
        }

        let mut ranked: Vec<(&str, u64)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(max_features);

        let mut terms: Vec<String> = ranked.into_iter().map(|(t, _)| t.to_string()).collect();
        terms.sort();

        tracing::info!(
            documents = bags.len(),
            terms = terms.len(),
            max_features,
            "Fitted vocabulary"
        );

        Self::build(terms, max_features, bags.len(), Utc::now())
    }

    /// Builds a vocabulary whose dimensions follow `terms` in order.
    pub fn from_terms(terms: Vec<String>) -> AppResult<Self> {
        let max_features = terms.len();
        let vocabulary = Self::build(terms, max_features, 0, Utc::now());
        if vocabulary.index.len() != vocabulary.terms.len() {
            return Err(AppError::InvalidInput(
                "Vocabulary terms must be unique".to_string(),
            ));
        }
        Ok(vocabulary)
    }

    fn build(
        terms: Vec<String>,
        max_features: usize,
        document_count: usize,
        fitted_at: DateTime<Utc>,
    ) -> Self {
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, term)| (term.clone(), i))
            .collect();
        let checksum = checksum(&terms);

        Self {
            terms,
            index,
            checksum,
            max_features,
            document_count,
            fitted_at,
        }
    }

    /// Vector length produced by [`Vocabulary::vectorize`]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn dimension_of(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    /// Content hash of the ordered term list
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn document_count(&self) -> usize {
        self.document_count
    }

    pub fn fitted_at(&self) -> DateTime<Utc> {
        self.fitted_at
    }

    /// Counts vocabulary terms in the tag bag; unknown terms are ignored.
    pub fn vectorize(&self, bag: &TagBag) -> FeatureVector {
        let mut vector = vec![0.0f32; self.terms.len()];
        let text = bag.as_str().to_lowercase();
        for term in TOKEN_PATTERN.find_iter(&text) {
            if let Some(&dimension) = self.index.get(term.as_str()) {
                vector[dimension] += 1.0;
            }
        }
        vector
    }

    /// Writes the artifact as JSON.
    pub fn save(&self, path: &Path) -> AppResult<()> {
        let artifact = VocabularyArtifact {
            format_version: FORMAT_VERSION,
            checksum: self.checksum.clone(),
            max_features: self.max_features,
            document_count: self.document_count,
            fitted_at: self.fitted_at,
            terms: self.terms.clone(),
        };
        let json = serde_json::to_string(&artifact)?;
        std::fs::write(path, json)?;

        tracing::info!(
            path = %path.display(),
            terms = self.terms.len(),
            checksum = %self.checksum,
            "Saved vocabulary artifact"
        );
        Ok(())
    }

    /// Loads and verifies an artifact written by [`Vocabulary::save`].
    pub fn load(path: &Path) -> AppResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let artifact: VocabularyArtifact = serde_json::from_str(&json)?;

        if artifact.format_version != FORMAT_VERSION {
            return Err(AppError::VocabularyMismatch(format!(
                "artifact format {} is not supported (expected {})",
                artifact.format_version, FORMAT_VERSION
            )));
        }

        let vocabulary = Self::build(
            artifact.terms,
            artifact.max_features,
            artifact.document_count,
            artifact.fitted_at,
        );

        if vocabulary.checksum != artifact.checksum {
            return Err(AppError::VocabularyMismatch(format!(
                "artifact checksum {} does not match its terms ({})",
                artifact.checksum, vocabulary.checksum
            )));
        }

        tracing::info!(
            path = %path.display(),
            terms = vocabulary.len(),
            checksum = %vocabulary.checksum,
            "Loaded vocabulary artifact"
        );
        Ok(vocabulary)
    }
}

fn checksum(terms: &[String]) -> String {
    let mut hasher = blake3::Hasher::new();
    for term in terms {
        hasher.update(term.as_bytes());
        hasher.update(b"\n");
    }
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MovieMetadata, NamedEntry};
    use crate::services::tags::extract_tags;
    use tempfile::tempdir;

    fn bag(overview: &str) -> TagBag {
        extract_tags(&MovieMetadata {
            overview: Some(overview.to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_fit_orders_terms_alphabetically() {
        let bags = vec![bag("zombie apocalypse"), bag("zombie heist")];
        let vocabulary = Vocabulary::fit(&bags, 10);

        assert_eq!(vocabulary.terms(), &["apocalypse", "heist", "zombie"]);
        assert_eq!(vocabulary.document_count(), 2);
    }

    #[test]
    fn test_fit_excludes_stop_words_and_single_characters() {
        let bags = vec![bag("the x and a heist")];
        let vocabulary = Vocabulary::fit(&bags, 10);

        assert_eq!(vocabulary.terms(), &["heist"]);
    }

    #[test]
    fn test_fit_caps_by_frequency() {
        let bags = vec![bag("space space space robot robot alien"), bag("space robot")];
        let vocabulary = Vocabulary::fit(&bags, 2);

        assert_eq!(vocabulary.terms(), &["robot", "space"]);
    }

    #[test]
    fn test_fit_breaks_frequency_ties_alphabetically() {
        let bags = vec![bag("delta charlie bravo alpha")];
        let vocabulary = Vocabulary::fit(&bags, 2);

        assert_eq!(vocabulary.terms(), &["alpha", "bravo"]);
    }

    #[test]
    fn test_vectorize_counts_and_ignores_unknown_terms() {
        let vocabulary =
            Vocabulary::from_terms(vec!["alien".into(), "robot".into(), "space".into()]).unwrap();

        let vector = vocabulary.vectorize(&bag("Space robot, SPACE! unknown alienate"));
        assert_eq!(vector, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_vectorize_is_deterministic() {
        let vocabulary = Vocabulary::fit(&[bag("heist crew vault heist")], 10);
        let metadata = MovieMetadata {
            overview: Some("A heist crew".to_string()),
            genres: vec![NamedEntry::new("Crime")],
            ..Default::default()
        };

        let first = vocabulary.vectorize(&extract_tags(&metadata));
        let second = vocabulary.vectorize(&extract_tags(&metadata));
        let first_bits: Vec<u32> = first.iter().map(|v| v.to_bits()).collect();
        let second_bits: Vec<u32> = second.iter().map(|v| v.to_bits()).collect();
        assert_eq!(first_bits, second_bits);
    }

    #[test]
    fn test_from_terms_rejects_duplicates() {
        let result = Vocabulary::from_terms(vec!["a1".into(), "a1".into()]);
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_save_and_load_preserve_dimensions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vectorizer.json");
        let vocabulary = Vocabulary::fit(&[bag("haunted house ghost"), bag("ghost ship")], 100);

        vocabulary.save(&path).unwrap();
        let loaded = Vocabulary::load(&path).unwrap();

        assert_eq!(loaded.terms(), vocabulary.terms());
        assert_eq!(loaded.checksum(), vocabulary.checksum());
        assert_eq!(loaded.fitted_at(), vocabulary.fitted_at());
    }

    #[test]
    fn test_load_rejects_tampered_artifact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vectorizer.json");
        Vocabulary::from_terms(vec!["ghost".into(), "house".into()])
            .unwrap()
            .save(&path)
            .unwrap();

        let tampered = std::fs::read_to_string(&path)
            .unwrap()
            .replace("\"house\"", "\"horse\"");
        std::fs::write(&path, tampered).unwrap();

        let result = Vocabulary::load(&path);
        assert!(matches!(result, Err(AppError::VocabularyMismatch(_))));
    }

    #[test]
    fn test_load_rejects_unknown_format_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vectorizer.json");
        Vocabulary::from_terms(vec!["ghost".into()])
            .unwrap()
            .save(&path)
            .unwrap();

        let bumped = std::fs::read_to_string(&path)
            .unwrap()
            .replace("\"format_version\":1", "\"format_version\":99");
        std::fs::write(&path, bumped).unwrap();

        let result = Vocabulary::load(&path);
        assert!(matches!(result, Err(AppError::VocabularyMismatch(_))));
    }
}
