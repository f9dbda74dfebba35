//! SQLite Offset Cache
//!
//! Implements OffsetCache using a single SQLite table keyed by device ID.

use crate::domain::entities::OffsetRecord;
use crate::domain::errors::ResolveError;
use crate::domain::ports::OffsetCache;
use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS db_offsets (
    device_id TEXT PRIMARY KEY,
    offset_ms INTEGER NOT NULL
)";

/// SQLite-backed durable offset cache.
///
/// Blocking SQLite calls run on the blocking thread pool; the connection
/// is shared behind a mutex, so writes for the same device serialize and
/// the last one wins.
#[derive(Clone)]
pub struct SqliteOffsetCache {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteOffsetCache {
    /// Open (or create) the offset table in the given database file.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> anyhow::Result<Self> {
        conn.execute(CREATE_TABLE, [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn select(conn: &Connection, device_id: &str) -> rusqlite::Result<Option<OffsetRecord>> {
        conn.query_row(
            "SELECT device_id, offset_ms FROM db_offsets WHERE device_id = ?1",
            params![device_id],
            |row| Ok(OffsetRecord::new(row.get::<_, String>(0)?, row.get(1)?)),
        )
        .optional()
    }

    fn upsert(conn: &Connection, device_id: &str, offset_millis: i64) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT INTO db_offsets (device_id, offset_ms) VALUES (?1, ?2)
             ON CONFLICT(device_id) DO UPDATE SET offset_ms = excluded.offset_ms",
            params![device_id, offset_millis],
        )
    }
}

#[async_trait]
impl OffsetCache for SqliteOffsetCache {
    async fn get(&self, device_id: &str) -> Result<Option<OffsetRecord>, ResolveError> {
        let conn = self.conn.clone();
        let device_id = device_id.to_string();

        tokio::task::spawn_blocking(move || Self::select(&conn.lock(), &device_id))
            .await
            .map_err(|e| ResolveError::Store(format!("spawn_blocking error: {}", e)))?
            .map_err(|e| ResolveError::Store(e.to_string()))
    }

    async fn put(&self, device_id: &str, offset_millis: i64) -> Result<(), ResolveError> {
        let conn = self.conn.clone();
        let key = device_id.to_string();

        let rows = tokio::task::spawn_blocking(move || Self::upsert(&conn.lock(), &key, offset_millis))
            .await
            .map_err(|e| ResolveError::Store(format!("spawn_blocking error: {}", e)))?
            .map_err(|e| ResolveError::Store(e.to_string()))?;

        tracing::info!(
            device_id = %device_id,
            offset_millis,
            "stored device offset, rows={}",
            rows
        );
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_device() {
        let cache = SqliteOffsetCache::open_in_memory().unwrap();
        assert_eq!(cache.get("unknown").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_then_get_round_trip() {
        let cache = SqliteOffsetCache::open_in_memory().unwrap();

        cache.put("D1", -25_200_000).await.unwrap();

        let record = cache.get("D1").await.unwrap().unwrap();
        assert_eq!(record, OffsetRecord::new("D1", -25_200_000));
    }

    #[tokio::test]
    async fn test_put_overwrites_existing() {
        let cache = SqliteOffsetCache::open_in_memory().unwrap();

        cache.put("D1", 3_600_000).await.unwrap();
        cache.put("D1", 7_200_000).await.unwrap();

        let record = cache.get("D1").await.unwrap().unwrap();
        assert_eq!(record.offset_millis, 7_200_000);
    }

    #[tokio::test]
    async fn test_devices_are_independent() {
        let cache = SqliteOffsetCache::open_in_memory().unwrap();

        cache.put("D1", 3_600_000).await.unwrap();
        cache.put("D2", -18_000_000).await.unwrap();

        assert_eq!(cache.get("D1").await.unwrap().unwrap().offset_millis, 3_600_000);
        assert_eq!(cache.get("D2").await.unwrap().unwrap().offset_millis, -18_000_000);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offsets.db");

        {
            let cache = SqliteOffsetCache::open(&path).unwrap();
            cache.put("D1", 19_800_000).await.unwrap();
        }

        let reopened = SqliteOffsetCache::open(&path).unwrap();
        let record = reopened.get("D1").await.unwrap().unwrap();
        assert_eq!(record.offset_millis, 19_800_000);
    }

    #[tokio::test]
    async fn test_concurrent_writers_last_write_wins() {
        let cache = SqliteOffsetCache::open_in_memory().unwrap();

        let writes = (0..10).map(|i| {
            let cache = cache.clone();
            async move { cache.put("D1", i * 1_000).await }
        });
        for result in futures::future::join_all(writes).await {
            assert!(result.is_ok());
        }

        let record = cache.get("D1").await.unwrap().unwrap();
        assert_eq!(record.offset_millis % 1_000, 0);
        assert!((0..10_000).contains(&record.offset_millis));
    }

    #[test]
    fn test_open_invalid_path_fails() {
        let result = SqliteOffsetCache::open("/nonexistent/dir/offsets.db");
        assert!(result.is_err());
    }

    #[test]
    fn test_cache_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqliteOffsetCache>();
    }
}
