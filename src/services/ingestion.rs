//! Ingestion worker
//!
//! Periodically polls the metadata provider for popular movies and appends
//! the ones the store doesn't have yet, vectorized with the frozen vocabulary.
//! It is the only writer after the bootstrap load.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    db::VectorStore,
    error::AppResult,
    models::MovieSummary,
    services::{featurizer::Featurizer, providers::MetadataProvider},
};

/// What the worker is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Fetching,
    Processing { tmdb_id: i64 },
}

impl Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerState::Idle => write!(f, "idle"),
            WorkerState::Fetching => write!(f, "fetching"),
            WorkerState::Processing { tmdb_id } => write!(f, "processing {}", tmdb_id),
        }
    }
}

/// Outcome of one ingestion cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Candidates returned by the provider (0 when the fetch failed)
    pub candidates: usize,
    /// Candidates already in the store
    pub skipped: usize,
    pub inserted: usize,
    /// Candidates whose details could not be fetched or parsed
    pub failed: usize,
    /// The candidate list itself could not be fetched
    pub fetch_failed: bool,
}

pub struct IngestionWorker {
    provider: Arc<dyn MetadataProvider>,
    store: VectorStore,
    featurizer: Featurizer,
    page: u32,
    interval: Duration,
    state: WorkerState,
}

impl IngestionWorker {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        store: VectorStore,
        featurizer: Featurizer,
        page: u32,
        interval: Duration,
    ) -> Self {
        Self {
            provider,
            store,
            featurizer,
            page,
            interval,
            state: WorkerState::Idle,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Runs cycles forever, sleeping `interval` between them.
    ///
    /// Provider failures are logged and absorbed by [`Self::run_cycle`]; only
    /// store errors end the loop.
    pub async fn run(&mut self) -> AppResult<()> {
        tracing::info!(
            provider = self.provider.name(),
            interval_secs = self.interval.as_secs(),
            "Ingestion worker started"
        );

        loop {
            self.run_cycle().await?;

            tracing::info!(
                sleep_secs = self.interval.as_secs(),
                "Worker sleeping until next cycle"
            );
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Runs a single fetch → process cycle.
    #[tracing::instrument(skip(self), fields(provider = self.provider.name(), page = self.page))]
    pub async fn run_cycle(&mut self) -> AppResult<CycleReport> {
        let mut report = CycleReport::default();

        self.state = WorkerState::Fetching;
        let candidates = match self.provider.fetch_popular_page(self.page).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::error!(error = %e, "Could not fetch candidate movies, skipping cycle");
                self.state = WorkerState::Idle;
                report.fetch_failed = true;
                return Ok(report);
            }
        };
        report.candidates = candidates.len();

        for candidate in candidates {
            self.state = WorkerState::Processing {
                tmdb_id: candidate.tmdb_id,
            };
            let outcome = self.process_candidate(&candidate).await;
            self.state = WorkerState::Idle;

            match outcome? {
                CandidateOutcome::Skipped => report.skipped += 1,
                CandidateOutcome::Inserted => report.inserted += 1,
                CandidateOutcome::Failed => report.failed += 1,
            }
        }

        tracing::info!(
            candidates = report.candidates,
            skipped = report.skipped,
            inserted = report.inserted,
            failed = report.failed,
            "Ingestion cycle complete"
        );

        Ok(report)
    }

    /// Store errors propagate; provider errors become `Failed`.
    async fn process_candidate(&self, candidate: &MovieSummary) -> AppResult<CandidateOutcome> {
        let tmdb_id = candidate.tmdb_id;

        if self.store.contains(tmdb_id).await? {
            tracing::debug!(tmdb_id, "Movie already stored, skipping");
            return Ok(CandidateOutcome::Skipped);
        }

        tracing::info!(tmdb_id, title = %candidate.title, "New movie found, fetching details");

        let details = match self.provider.fetch_details(tmdb_id).await {
            Ok(details) => details,
            Err(e) => {
                tracing::warn!(tmdb_id, error = %e, "Failed to process movie");
                return Ok(CandidateOutcome::Failed);
            }
        };

        let vector = self.featurizer.featurize(&details.metadata);
        if self
            .store
            .insert_if_absent(tmdb_id, &details.title, &vector)
            .await?
        {
            tracing::info!(tmdb_id, title = %details.title, "Movie added");
            Ok(CandidateOutcome::Inserted)
        } else {
            // Another writer got there between the check and the insert
            Ok(CandidateOutcome::Skipped)
        }
    }
}

enum CandidateOutcome {
    Skipped,
    Inserted,
    Failed,
}
