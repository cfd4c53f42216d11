//! Per-collection storage adapter.
//!
//! Presents one `read`/`write` pair over the local cache and the remote
//! store. Reads prefer the remote while the collection is remote-backed and
//! fall back to the local cache on any remote failure. Writes always hit the
//! local cache first and then mirror to the remote, best effort.

use std::sync::Arc;

use quill_types::deployment::DeploymentMode;
use quill_types::error::{RemoteError, RepositoryError};
use quill_types::storage::{ReadSource, StorageKey, SyncState};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::storage::{LocalCache, RemoteStore};
use crate::sync::SyncCoordinator;

/// Result of a read: the snapshot (if any) and the backend that served it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadOutcome<T> {
    pub value: Option<T>,
    pub source: ReadSource,
}

impl<T> ReadOutcome<T> {
    fn absent() -> Self {
        Self {
            value: None,
            source: ReadSource::Absent,
        }
    }
}

/// What happened to the remote mirror of a write.
#[derive(Debug)]
pub enum RemoteWrite {
    Written,
    /// The collection is local-only; the remote was not contacted.
    Skipped,
    /// The remote write failed. The local write already succeeded.
    Failed(RemoteError),
}

/// Outcome of a write that reached the local cache.
///
/// A local write failure is returned as `Err` instead; this only describes
/// the remote half, which callers are free to ignore.
#[derive(Debug)]
pub struct WriteReport {
    pub remote: RemoteWrite,
}

impl WriteReport {
    pub fn remote_failed(&self) -> bool {
        matches!(self.remote, RemoteWrite::Failed(_))
    }
}

pub struct StorageAdapter<L, R> {
    local: Arc<L>,
    remote: Arc<R>,
    sync: SyncCoordinator,
}

impl<L: LocalCache, R: RemoteStore> StorageAdapter<L, R> {
    pub fn new(key: StorageKey, local: Arc<L>, remote: Arc<R>, mode: DeploymentMode) -> Self {
        Self {
            local,
            remote,
            sync: SyncCoordinator::new(key, mode),
        }
    }

    pub fn key(&self) -> StorageKey {
        self.sync.key()
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync.state()
    }

    /// Read the raw snapshot.
    pub async fn read(&mut self) -> Result<ReadOutcome<Value>, RepositoryError> {
        self.read_as::<Value>().await
    }

    /// Read and decode the snapshot.
    ///
    /// A remote body that does not decode as `T` counts as a remote failure
    /// and degrades the collection like any other. A local snapshot that
    /// does not decode is a storage error: the cache is not overwritten
    /// behind the caller's back.
    pub async fn read_as<T: DeserializeOwned>(
        &mut self,
    ) -> Result<ReadOutcome<T>, RepositoryError> {
        if let Some(route) = self.sync.remote_route() {
            let fetched = self.remote.fetch(route).await.and_then(|value| {
                serde_json::from_value::<T>(value)
                    .map_err(|e| RemoteError::Format(e.to_string()))
            });
            match fetched {
                Ok(value) => {
                    tracing::debug!(key = %self.key(), "Loaded snapshot from remote store");
                    return Ok(ReadOutcome {
                        value: Some(value),
                        source: ReadSource::Remote,
                    });
                }
                Err(e) => self.sync.record_read_failure(&e),
            }
        }

        let Some(raw) = self.local.get(self.key()).await? else {
            return Ok(ReadOutcome::absent());
        };
        let value = serde_json::from_value::<T>(raw)
            .map_err(|e| RepositoryError::Corrupt(format!("{}: {e}", self.key())))?;
        tracing::debug!(key = %self.key(), "Loaded snapshot from local cache");
        Ok(ReadOutcome {
            value: Some(value),
            source: ReadSource::Local,
        })
    }

    /// Write the raw snapshot.
    ///
    /// A stateless answer to the remote half degrades the collection just
    /// like it does on read; other remote failures leave it remote-backed.
    pub async fn write(&mut self, value: &Value) -> Result<WriteReport, RepositoryError> {
        self.local.put(self.key(), value).await?;

        let Some(route) = self.sync.remote_route() else {
            return Ok(WriteReport {
                remote: RemoteWrite::Skipped,
            });
        };
        let remote = match self.remote.push(route, value).await {
            Ok(()) => RemoteWrite::Written,
            Err(e @ RemoteError::UseLocalStorage(_)) => {
                self.sync.record_sentinel(&e);
                RemoteWrite::Skipped
            }
            Err(e) => {
                tracing::warn!(key = %self.key(), error = %e, "Remote write failed, kept local copy");
                RemoteWrite::Failed(e)
            }
        };
        Ok(WriteReport { remote })
    }

    /// Encode and write the snapshot.
    pub async fn write_as<T: Serialize + ?Sized>(
        &mut self,
        value: &T,
    ) -> Result<WriteReport, RepositoryError> {
        let value =
            serde_json::to_value(value).map_err(|e| RepositoryError::Query(e.to_string()))?;
        self.write(&value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeRemote, MemoryCache, RemoteBehavior};
    use serde_json::json;

    fn adapter(
        local: &Arc<MemoryCache>,
        remote: &Arc<FakeRemote>,
        mode: DeploymentMode,
    ) -> StorageAdapter<MemoryCache, FakeRemote> {
        StorageAdapter::new(StorageKey::JournalEntries, local.clone(), remote.clone(), mode)
    }

    #[tokio::test]
    async fn test_read_prefers_remote() {
        let local = Arc::new(MemoryCache::with(StorageKey::JournalEntries, json!(["local"])));
        let remote = Arc::new(FakeRemote::serving(json!(["remote"])));
        let mut adapter = adapter(&local, &remote, DeploymentMode::Local);

        let outcome = adapter.read().await.unwrap();
        assert_eq!(outcome.source, ReadSource::Remote);
        assert_eq!(outcome.value, Some(json!(["remote"])));
        assert_eq!(adapter.sync_state(), SyncState::RemoteBacked);
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_and_degrades() {
        let local = Arc::new(MemoryCache::with(StorageKey::JournalEntries, json!(["local"])));
        let remote = Arc::new(FakeRemote::new(RemoteBehavior::Unreachable));
        let mut adapter = adapter(&local, &remote, DeploymentMode::Local);

        let outcome = adapter.read().await.unwrap();
        assert_eq!(outcome.source, ReadSource::Local);
        assert_eq!(outcome.value, Some(json!(["local"])));
        assert_eq!(adapter.sync_state(), SyncState::LocalOnly);

        // Remote recovers, but the collection stays local-only.
        remote.set_behavior(RemoteBehavior::Serve);
        let report = adapter.write(&json!(["new"])).await.unwrap();
        assert!(matches!(report.remote, RemoteWrite::Skipped));
        assert_eq!(remote.push_count(), 0);
        assert_eq!(local.snapshot(StorageKey::JournalEntries), Some(json!(["new"])));
    }

    #[tokio::test]
    async fn test_sentinel_degrades_like_an_error() {
        let local = Arc::new(MemoryCache::default());
        let remote = Arc::new(FakeRemote::new(RemoteBehavior::Stateless));
        let mut adapter = adapter(&local, &remote, DeploymentMode::Local);

        let outcome = adapter.read().await.unwrap();
        assert_eq!(outcome.source, ReadSource::Absent);
        assert!(outcome.value.is_none());
        assert_eq!(adapter.sync_state(), SyncState::LocalOnly);
    }

    #[tokio::test]
    async fn test_undecodable_remote_body_degrades() {
        let local = Arc::new(MemoryCache::with(StorageKey::JournalEntries, json!([1, 2])));
        let remote = Arc::new(FakeRemote::new(RemoteBehavior::Malformed));
        let mut adapter = adapter(&local, &remote, DeploymentMode::Local);

        let outcome = adapter.read_as::<Vec<u32>>().await.unwrap();
        assert_eq!(outcome.source, ReadSource::Local);
        assert_eq!(outcome.value, Some(vec![1, 2]));
        assert_eq!(adapter.sync_state(), SyncState::LocalOnly);
    }

    #[tokio::test]
    async fn test_hosted_mode_never_contacts_remote() {
        let local = Arc::new(MemoryCache::default());
        let remote = Arc::new(FakeRemote::serving(json!(["remote"])));
        let mut adapter = adapter(&local, &remote, DeploymentMode::Hosted);

        let outcome = adapter.read().await.unwrap();
        assert_eq!(outcome.source, ReadSource::Absent);
        adapter.write(&json!(["x"])).await.unwrap();

        assert_eq!(remote.fetch_count(), 0);
        assert_eq!(remote.push_count(), 0);
    }

    #[tokio::test]
    async fn test_write_reaches_both_backends() {
        let local = Arc::new(MemoryCache::default());
        let remote = Arc::new(FakeRemote::new(RemoteBehavior::Serve));
        let mut adapter = adapter(&local, &remote, DeploymentMode::Local);

        let report = adapter.write(&json!(["a"])).await.unwrap();
        assert!(matches!(report.remote, RemoteWrite::Written));
        assert_eq!(remote.stored(), Some(json!(["a"])));
        assert_eq!(local.snapshot(StorageKey::JournalEntries), Some(json!(["a"])));
    }

    #[tokio::test]
    async fn test_remote_write_failure_keeps_local_write() {
        let local = Arc::new(MemoryCache::default());
        let remote = Arc::new(FakeRemote::new(RemoteBehavior::Unreachable));
        let mut adapter = adapter(&local, &remote, DeploymentMode::Local);

        let report = adapter.write(&json!(["a"])).await.unwrap();
        assert!(report.remote_failed());
        assert_eq!(local.snapshot(StorageKey::JournalEntries), Some(json!(["a"])));
        // Write failures do not degrade the collection.
        assert_eq!(adapter.sync_state(), SyncState::RemoteBacked);
    }

    #[tokio::test]
    async fn test_local_write_failure_is_an_error() {
        let local = Arc::new(MemoryCache::default());
        local.set_fail_writes(true);
        let remote = Arc::new(FakeRemote::new(RemoteBehavior::Serve));
        let mut adapter = adapter(&local, &remote, DeploymentMode::Local);

        assert!(adapter.write(&json!(["a"])).await.is_err());
        assert_eq!(remote.push_count(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_local_snapshot_is_an_error() {
        let local = Arc::new(MemoryCache::with(StorageKey::JournalEntries, json!({"x": 1})));
        let remote = Arc::new(FakeRemote::new(RemoteBehavior::Unreachable));
        let mut adapter = adapter(&local, &remote, DeploymentMode::Local);

        let result = adapter.read_as::<Vec<u32>>().await;
        assert!(matches!(result, Err(RepositoryError::Corrupt(_))));
    }

    #[tokio::test]
    async fn test_stateless_answer_to_write_degrades() {
        let local = Arc::new(MemoryCache::default());
        let remote = Arc::new(FakeRemote::new(RemoteBehavior::Serve));
        let mut adapter = adapter(&local, &remote, DeploymentMode::Local);
        adapter.read().await.unwrap();
        assert_eq!(adapter.sync_state(), SyncState::RemoteBacked);

        remote.set_behavior(RemoteBehavior::Stateless);
        let report = adapter.write(&json!(["a"])).await.unwrap();
        assert!(!report.remote_failed());
        assert!(matches!(report.remote, RemoteWrite::Skipped));
        assert_eq!(adapter.sync_state(), SyncState::LocalOnly);
        assert_eq!(local.snapshot(StorageKey::JournalEntries), Some(json!(["a"])));

        // Later writes no longer contact the remote.
        remote.set_behavior(RemoteBehavior::Serve);
        adapter.write(&json!(["b"])).await.unwrap();
        assert_eq!(remote.push_count(), 1);
    }
}
