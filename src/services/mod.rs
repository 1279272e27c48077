pub mod bootstrap;
pub mod featurizer;
pub mod ingestion;
pub mod providers;
pub mod recommendations;
pub mod similarity;
pub mod stop_words;
pub mod tags;
pub mod vocabulary;

pub use featurizer::Featurizer;
pub use ingestion::{CycleReport, IngestionWorker, WorkerState};
pub use vocabulary::Vocabulary;
