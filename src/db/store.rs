use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::models::{FeatureVector, ItemRecord};
use crate::services::vocabulary::Vocabulary;

const VOCABULARY_CHECKSUM_KEY: &str = "vocabulary_checksum";
const VOCABULARY_DIMENSION_KEY: &str = "vocabulary_dimension";

/// Durable table of (tmdb_id, title, vector) rows
///
/// The store is the only owner of item records. Rows are inserted once per
/// TMDB id and never updated or deleted here.
#[derive(Clone)]
pub struct VectorStore {
    pool: SqlitePool,
    dimension: Option<usize>,
}

impl VectorStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            dimension: None,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Ties the store to the vocabulary that produces its vectors.
    ///
    /// The first call records the vocabulary checksum and dimension; later
    /// calls with a vocabulary that disagrees on either fail with [`AppError::VocabularyMismatch`]. Once
    /// bound, inserts must match the vocabulary's dimension.
    pub async fn bind_vocabulary(&mut self, vocabulary: &Vocabulary) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT OR IGNORE INTO store_meta (key, value) VALUES (?, ?)")
            .bind(VOCABULARY_CHECKSUM_KEY)
            .bind(vocabulary.checksum())
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT OR IGNORE INTO store_meta (key, value) VALUES (?, ?)")
            .bind(VOCABULARY_DIMENSION_KEY)
            .bind(vocabulary.len().to_string())
            .execute(&mut *tx)
            .await?;

        let stored_checksum = read_meta(&mut tx, VOCABULARY_CHECKSUM_KEY).await?;
        let stored_dimension = read_meta(&mut tx, VOCABULARY_DIMENSION_KEY).await?;

        tx.commit().await?;

        if stored_checksum != vocabulary.checksum() {
            return Err(AppError::VocabularyMismatch(format!(
                "store vectors were produced by vocabulary {}, loaded artifact is {}",
                stored_checksum,
                vocabulary.checksum()
            )));
        }
        if stored_dimension != vocabulary.len().to_string() {
            return Err(AppError::VocabularyMismatch(format!(
                "store vectors have {} dimensions, loaded artifact has {}",
                stored_dimension,
                vocabulary.len()
            )));
        }

        self.dimension = Some(vocabulary.len());
        tracing::info!(
            checksum = %stored_checksum,
            dimension = vocabulary.len(),
            "Vector store bound to vocabulary"
        );
        Ok(())
    }

    /// Inserts a row unless the TMDB id is already present.
    ///
    /// Returns `false` (not an error) for an existing id. The check and the
    /// insert are one statement, so two concurrent inserts of the same id
    /// cannot both succeed.
    pub async fn insert_if_absent(
        &self,
        tmdb_id: i64,
        title: &str,
        vector: &[f32],
    ) -> AppResult<bool> {
        if title.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "Movie {} has an empty title",
                tmdb_id
            )));
        }
        if let Some(dimension) = self.dimension {
            if vector.len() != dimension {
                return Err(AppError::InvalidInput(format!(
                    "Vector for movie {} has {} dimensions, expected {}",
                    tmdb_id,
                    vector.len(),
                    dimension
                )));
            }
        }

        let result = sqlx::query(
            "INSERT INTO movies (tmdb_id, title, vector) VALUES (?, ?, ?) \
             ON CONFLICT(tmdb_id) DO NOTHING",
        )
        .bind(tmdb_id)
        .bind(title)
        .bind(encode_vector(vector))
        .execute(&self.pool)
        .await?;

        let inserted = result.rows_affected() == 1;
        if !inserted {
            tracing::debug!(tmdb_id, "Movie already stored, insert ignored");
        }
        Ok(inserted)
    }

    /// Every stored row, in insertion order
    pub async fn scan_all(&self) -> AppResult<Vec<ItemRecord>> {
        let rows: Vec<(i64, String, Vec<u8>)> =
            sqlx::query_as("SELECT tmdb_id, title, vector FROM movies ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(into_record).collect()
    }

    /// Exact, case-sensitive title lookup; the earliest row wins on duplicates
    pub async fn find_by_title(&self, title: &str) -> AppResult<Option<ItemRecord>> {
        let row: Option<(i64, String, Vec<u8>)> = sqlx::query_as(
            "SELECT tmdb_id, title, vector FROM movies WHERE title = ? ORDER BY id ASC LIMIT 1",
        )
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_record).transpose()
    }

    pub async fn contains(&self, tmdb_id: i64) -> AppResult<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM movies WHERE tmdb_id = ?")
            .bind(tmdb_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// All titles, alphabetically
    pub async fn list_titles(&self) -> AppResult<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT title FROM movies ORDER BY title ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(title,)| title).collect())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM movies")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

async fn read_meta(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    key: &str,
) -> AppResult<String> {
    let (value,): (String,) = sqlx::query_as("SELECT value FROM store_meta WHERE key = ?")
        .bind(key)
        .fetch_one(&mut **tx)
        .await?;
    Ok(value)
}

fn into_record((tmdb_id, title, blob): (i64, String, Vec<u8>)) -> AppResult<ItemRecord> {
    Ok(ItemRecord {
        tmdb_id,
        title,
        vector: decode_vector(&blob)?,
    })
}

/// Little-endian f32 encoding used for the `vector` column
pub fn encode_vector(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub fn decode_vector(bytes: &[u8]) -> AppResult<FeatureVector> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Internal(format!(
            "Stored vector has {} bytes, not a multiple of 4",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}
