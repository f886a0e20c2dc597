//! `SQLite` implementation of the `DedupStore` trait.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{Connection, FromRow};
use tokio::sync::Mutex;
use tracing::{debug, info};

use dedup_core::clock::{Clock, SystemClock};
use dedup_core::error::DedupError;
use dedup_core::record::{ProcessedRecord, StoreStats, parse_processed_at};
use dedup_core::store::DedupStore;

use crate::schema;

/// How long a statement waits on a file lock held by another process.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(FromRow)]
struct ProcessedRow {
    topic: String,
    event_id: String,
    timestamp: String,
    processed_at: String,
}

impl TryFrom<ProcessedRow> for ProcessedRecord {
    type Error = DedupError;

    fn try_from(row: ProcessedRow) -> Result<Self, Self::Error> {
        Ok(Self {
            processed_at: parse_processed_at(&row.processed_at)?,
            topic: row.topic,
            event_id: row.event_id,
            timestamp: row.timestamp,
        })
    }
}

fn store_error(err: sqlx::Error) -> DedupError {
    DedupError::Store(err.to_string())
}

fn count_to_u64(count: i64) -> Result<u64, DedupError> {
    u64::try_from(count).map_err(|_| DedupError::Store(format!("negative row count {count}")))
}

/// SQLite-backed deduplication ledger.
///
/// The connection lives inside the mutex: holding the guard is the store's
/// single critical section, and [`SqliteDedupStore::close`] takes the
/// connection out so later calls fail with `DedupError::StoreClosed`.
pub struct SqliteDedupStore {
    path: PathBuf,
    conn: Mutex<Option<SqliteConnection>>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SqliteDedupStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteDedupStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteDedupStore {
    /// Opens or creates the ledger at `path`, stamping records with the
    /// system clock.
    ///
    /// # Errors
    ///
    /// Returns `DedupError::Store` if the file cannot be opened or the schema
    /// cannot be created.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, DedupError> {
        Self::open_with_clock(path, Arc::new(SystemClock)).await
    }

    /// Opens or creates the ledger at `path` with an injected clock.
    ///
    /// # Errors
    ///
    /// Returns `DedupError::Store` if the file cannot be opened or the schema
    /// cannot be created.
    pub async fn open_with_clock(
        path: impl AsRef<Path>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DedupError> {
        let path = path.as_ref().to_path_buf();
        info!(path = %path.display(), "opening dedup store");

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);
        let mut conn = SqliteConnection::connect_with(&options)
            .await
            .map_err(store_error)?;

        sqlx::query(schema::CREATE_PROCESSED_EVENTS_TABLE)
            .execute(&mut conn)
            .await
            .map_err(store_error)?;
        sqlx::query(schema::CREATE_TOPIC_INDEX)
            .execute(&mut conn)
            .await
            .map_err(store_error)?;

        Ok(Self {
            path,
            conn: Mutex::new(Some(conn)),
            clock,
        })
    }

    /// Path of the backing database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Closes the underlying connection and waits until the handle is
    /// released. Calling it again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `DedupError::Store` if `SQLite` reports an error while closing.
    pub async fn close(&self) -> Result<(), DedupError> {
        let conn = self.conn.lock().await.take();
        if let Some(conn) = conn {
            conn.close().await.map_err(store_error)?;
            info!(path = %self.path.display(), "dedup store closed");
        }
        Ok(())
    }
}

#[async_trait]
impl DedupStore for SqliteDedupStore {
    async fn is_duplicate(&self, topic: &str, event_id: &str) -> Result<bool, DedupError> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or(DedupError::StoreClosed)?;

        let found = sqlx::query_scalar::<_, i64>(schema::SELECT_EXISTS)
            .bind(topic)
            .bind(event_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(store_error)?;

        Ok(found.is_some())
    }

    async fn mark_processed(
        &self,
        topic: &str,
        event_id: &str,
        timestamp: &str,
    ) -> Result<bool, DedupError> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or(DedupError::StoreClosed)?;

        let result = sqlx::query(schema::INSERT_PROCESSED)
            .bind(topic)
            .bind(event_id)
            .bind(timestamp)
            .bind(self.clock.now_text())
            .execute(&mut *conn)
            .await
            .map_err(store_error)?;

        let inserted = result.rows_affected() == 1;
        if !inserted {
            debug!(topic, event_id, "key already present in ledger");
        }
        Ok(inserted)
    }

    async fn get_processed_events(
        &self,
        topic: Option<&str>,
    ) -> Result<Vec<ProcessedRecord>, DedupError> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or(DedupError::StoreClosed)?;

        let rows: Vec<ProcessedRow> = match topic {
            Some(topic) => {
                sqlx::query_as::<_, ProcessedRow>(schema::SELECT_BY_TOPIC)
                    .bind(topic)
                    .fetch_all(&mut *conn)
                    .await
            }
            None => {
                sqlx::query_as::<_, ProcessedRow>(schema::SELECT_ALL)
                    .fetch_all(&mut *conn)
                    .await
            }
        }
        .map_err(store_error)?;

        rows.into_iter().map(ProcessedRecord::try_from).collect()
    }

    async fn get_stats(&self) -> Result<StoreStats, DedupError> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or(DedupError::StoreClosed)?;

        let total = sqlx::query_scalar::<_, i64>(schema::COUNT_ALL)
            .fetch_one(&mut *conn)
            .await
            .map_err(store_error)?;
        let per_topic = sqlx::query_as::<_, (String, i64)>(schema::COUNT_BY_TOPIC)
            .fetch_all(&mut *conn)
            .await
            .map_err(store_error)?;

        let mut topics = BTreeMap::new();
        for (topic, count) in per_topic {
            topics.insert(topic, count_to_u64(count)?);
        }

        Ok(StoreStats {
            total_unique: count_to_u64(total)?,
            topics,
        })
    }

    async fn clear(&self) -> Result<(), DedupError> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or(DedupError::StoreClosed)?;

        let result = sqlx::query(schema::DELETE_ALL)
            .execute(&mut *conn)
            .await
            .map_err(store_error)?;
        info!(removed = result.rows_affected(), "dedup store cleared");
        Ok(())
    }
}
