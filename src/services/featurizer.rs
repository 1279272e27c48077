use std::sync::Arc;

use crate::models::{FeatureVector, MovieMetadata};
use crate::services::tags::extract_tags;
use crate::services::vocabulary::Vocabulary;

/// Metadata → vector pipeline shared by the bootstrap loader and the worker
///
/// Both paths must hold a clone of the same loaded [`Vocabulary`].
#[derive(Debug, Clone)]
pub struct Featurizer {
    vocabulary: Arc<Vocabulary>,
}

impl Featurizer {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn featurize(&self, metadata: &MovieMetadata) -> FeatureVector {
        self.vocabulary.vectorize(&extract_tags(metadata))
    }
}
