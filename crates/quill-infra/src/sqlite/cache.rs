//! SQLite local cache.
//!
//! Implements `LocalCache` from `quill-core`. Each storage key maps to one
//! row holding the whole collection as JSON text; a write is a single
//! upsert, so a failed write leaves the previous snapshot in place.

use chrono::Utc;
use quill_core::storage::LocalCache;
use quill_types::error::RepositoryError;
use quill_types::storage::StorageKey;
use serde_json::Value;
use sqlx::Row;

use super::pool::DatabasePool;

pub struct SqliteLocalCache {
    pool: DatabasePool,
}

impl SqliteLocalCache {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Last write time per key, for status output.
    pub async fn updated_at(&self, key: StorageKey) -> Result<Option<String>, RepositoryError> {
        let row = sqlx::query("SELECT updated_at FROM local_cache WHERE key = ?")
            .bind(key.as_str())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.map(|row| row.try_get::<String, _>("updated_at"))
            .transpose()
            .map_err(|e| RepositoryError::Query(e.to_string()))
    }
}

impl LocalCache for SqliteLocalCache {
    async fn get(&self, key: StorageKey) -> Result<Option<Value>, RepositoryError> {
        let row = sqlx::query("SELECT value FROM local_cache WHERE key = ?")
            .bind(key.as_str())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let value_str: String = row
                    .try_get("value")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                let value: Value = serde_json::from_str(&value_str)
                    .map_err(|e| RepositoryError::Query(format!("invalid JSON value: {e}")))?;
                tracing::debug!(key = %key, "Read local cache");
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: StorageKey, value: &Value) -> Result<(), RepositoryError> {
        let now = Utc::now().to_rfc3339();
        let value_str = serde_json::to_string(value)
            .map_err(|e| RepositoryError::Query(format!("failed to serialize value: {e}")))?;

        sqlx::query(
            r#"INSERT INTO local_cache (key, value, updated_at)
               VALUES (?, ?, ?)
               ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(key.as_str())
        .bind(&value_str)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tracing::debug!(key = %key, bytes = value_str.len(), "Wrote local cache");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn test_cache() -> (SqliteLocalCache, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::open_in(dir.path()).await.unwrap();
        (SqliteLocalCache::new(pool), dir)
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let (cache, _dir) = test_cache().await;
        assert!(cache.get(StorageKey::JournalEntries).await.unwrap().is_none());
        assert!(cache.updated_at(StorageKey::JournalEntries).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let (cache, _dir) = test_cache().await;
        let snapshot = json!([{"id": "1", "title": "Hello"}]);

        cache.put(StorageKey::JournalEntries, &snapshot).await.unwrap();

        assert_eq!(cache.get(StorageKey::JournalEntries).await.unwrap(), Some(snapshot));
        assert!(cache.get(StorageKey::Conversations).await.unwrap().is_none());
        assert!(cache.updated_at(StorageKey::JournalEntries).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_put_replaces_whole_snapshot() {
        let (cache, _dir) = test_cache().await;
        cache
            .put(StorageKey::ChatConfig, &json!({"model": "qwen-turbo"}))
            .await
            .unwrap();
        cache
            .put(StorageKey::ChatConfig, &json!({"model": "qwen-max"}))
            .await
            .unwrap();

        assert_eq!(
            cache.get(StorageKey::ChatConfig).await.unwrap(),
            Some(json!({"model": "qwen-max"}))
        );
    }

    #[tokio::test]
    async fn test_snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let cache = SqliteLocalCache::new(DatabasePool::open_in(dir.path()).await.unwrap());
            cache.put(StorageKey::Conversations, &json!([])).await.unwrap();
        }
        let cache = SqliteLocalCache::new(DatabasePool::open_in(dir.path()).await.unwrap());
        assert_eq!(cache.get(StorageKey::Conversations).await.unwrap(), Some(json!([])));
    }
}
