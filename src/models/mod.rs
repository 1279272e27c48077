pub mod metadata;
pub mod movie;
pub mod tmdb;

pub use metadata::{CrewMember, MovieMetadata, NamedEntry, TOP_CAST};
pub use movie::{FeatureVector, ItemRecord, MovieDetails, MovieSummary, Recommendation};
pub use tmdb::{TmdbMovieDetails, TmdbPopularPage};
