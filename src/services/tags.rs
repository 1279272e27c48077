//! Tag extraction
//!
//! Turns a movie's raw metadata into a normalized bag of tokens. The bootstrap
//! loader and the ingestion worker both go through [`extract_tags`], so a
//! movie produces the same tags whichever path discovered it.

use std::fmt::Display;

pub use crate::models::TOP_CAST;

use crate::models::{CrewMember, MovieMetadata, NamedEntry};

/// Crew job whose holder contributes a tag
pub const DIRECTOR_JOB: &str = "Director";

/// Normalized, lower-cased token sequence for one movie
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagBag(String);

impl TagBag {
    /// The tags joined by single spaces
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ').filter(|t| !t.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for TagBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds the tag bag for one movie.
///
/// Overview words are kept as-is; genre, keyword, cast and director names have
/// their whitespace removed so multi-word names become single tokens. The
/// whole bag is lower-cased at the end.
pub fn extract_tags(metadata: &MovieMetadata) -> TagBag {
    let mut tags: Vec<String> = Vec::new();

    if let Some(overview) = metadata.overview.as_deref() {
        tags.extend(overview.split_whitespace().map(str::to_string));
    }

    let names = names(&metadata.genres)
        .chain(names(&metadata.keywords))
        .chain(top_cast(&metadata.cast))
        .chain(director(&metadata.crew));

    tags.extend(names.map(strip_whitespace).filter(|t| !t.is_empty()));

    TagBag(tags.join(" ").to_lowercase())
}

fn names(entries: &[NamedEntry]) -> impl Iterator<Item = &str> {
    entries.iter().map(|e| e.name.as_str())
}

fn top_cast(cast: &[NamedEntry]) -> impl Iterator<Item = &str> {
    names(cast).take(TOP_CAST)
}

/// First director only
fn director(crew: &[CrewMember]) -> impl Iterator<Item = &str> {
    crew.iter()
        .find(|member| member.job == DIRECTOR_JOB)
        .map(|member| member.name.as_str())
        .into_iter()
}

fn strip_whitespace(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}
