//! Command-line entry points: HTTP server, bootstrap loader, ingestion worker.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::{
    config::Config,
    db::{create_pool, create_redis_client, Cache, VectorStore},
    routes::{create_router, AppState},
    services::{
        bootstrap,
        providers::TmdbProvider,
        Featurizer, IngestionWorker, Vocabulary,
    },
};

/// Movie recommendations from precomputed feature vectors
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the recommendation API
    Serve,

    /// Build the initial corpus and vocabulary from the TMDB 5000 CSV export
    Bootstrap {
        /// Path to tmdb_5000_movies.csv
        #[arg(long, default_value = "tmdb_5000_movies.csv")]
        movies: PathBuf,

        /// Path to tmdb_5000_credits.csv
        #[arg(long, default_value = "tmdb_5000_credits.csv")]
        credits: PathBuf,
    },

    /// Poll TMDB for new popular movies
    Worker {
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,
    },
}

pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve => serve(config).await,
        Command::Bootstrap { movies, credits } => run_bootstrap(config, movies, credits).await,
        Command::Worker { once } => run_worker(config, once).await,
    }
}

fn create_cache(config: &Config) -> anyhow::Result<Cache> {
    match &config.redis_url {
        Some(url) => {
            let (cache, _handle) = Cache::new(create_redis_client(url)?);
            tracing::info!("Poster cache enabled");
            Ok(cache)
        }
        None => Ok(Cache::disabled().0),
    }
}

/// Loads the frozen vocabulary and checks it against the store
async fn load_vocabulary(
    config: &Config,
    store: &mut VectorStore,
) -> anyhow::Result<Arc<Vocabulary>> {
    let vocabulary = Vocabulary::load(&config.vocabulary_path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to load vocabulary from {} (run `bootstrap` first): {}",
            config.vocabulary_path.display(),
            e
        )
    })?;
    store.bind_vocabulary(&vocabulary).await?;
    Ok(Arc::new(vocabulary))
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let store = VectorStore::new(create_pool(&config.database_url).await?);
    let posters = Arc::new(TmdbProvider::from_config(&config, create_cache(&config)?)?);

    let app = create_router(AppState {
        store,
        posters,
        recommendation_count: config.recommendation_count,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %config.bind_address(), "Server running");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_bootstrap(config: Config, movies: PathBuf, credits: PathBuf) -> anyhow::Result<()> {
    let corpus = bootstrap::read_corpus(File::open(&movies)?, File::open(&credits)?)?;
    let mut store = VectorStore::new(create_pool(&config.database_url).await?);

    let report = bootstrap::bootstrap(
        &corpus,
        &mut store,
        &config.vocabulary_path,
        config.max_features,
    )
    .await?;

    println!(
        "Bootstrap complete: {} movies, {} inserted, {} duplicates, {} terms",
        report.movies, report.inserted, report.duplicates, report.vocabulary_size
    );
    Ok(())
}

async fn run_worker(config: Config, once: bool) -> anyhow::Result<()> {
    let mut store = VectorStore::new(create_pool(&config.database_url).await?);
    let vocabulary = load_vocabulary(&config, &mut store).await?;
    let provider = Arc::new(TmdbProvider::from_config(&config, Cache::disabled().0)?);

    let mut worker = IngestionWorker::new(
        provider,
        store,
        Featurizer::new(vocabulary),
        config.worker_page,
        config.worker_interval(),
    );

    if once {
        let report = worker.run_cycle().await?;
        println!(
            "Cycle complete: {} candidates, {} inserted, {} skipped, {} failed",
            report.candidates, report.inserted, report.skipped, report.failed
        );
        return Ok(());
    }

    worker.run().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_worker_once() {
        let cli = Cli::parse_from(["reelmatch", "worker", "--once"]);
        assert!(matches!(cli.command, Command::Worker { once: true }));
    }

    #[test]
    fn test_parse_bootstrap_paths() {
        let cli = Cli::parse_from([
            "reelmatch",
            "bootstrap",
            "--movies",
            "data/movies.csv",
            "--credits",
            "data/credits.csv",
        ]);
        match cli.command {
            Command::Bootstrap { movies, credits } => {
                assert_eq!(movies, PathBuf::from("data/movies.csv"));
                assert_eq!(credits, PathBuf::from("data/credits.csv"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
