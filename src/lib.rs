//! Content-based movie recommendations over precomputed count vectors.
//!
//! A vocabulary is fitted once from the bootstrap corpus and frozen. Every
//! movie is reduced to a tag bag, counted against that vocabulary and stored
//! in SQLite. Recommendations rescan the stored vectors and rank them by
//! cosine similarity. An ingestion worker appends newly popular movies using
//! the same frozen vocabulary.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
