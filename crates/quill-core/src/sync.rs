//! Per-collection sync state machine.
//!
//! Each remote-capable collection starts in the state its deployment mode
//! dictates and can only ever move `RemoteBacked -> LocalOnly`. There is no
//! transition back within a process; a restart re-evaluates from scratch.

use quill_types::deployment::DeploymentMode;
use quill_types::error::RemoteError;
use quill_types::storage::{RemoteRoute, StorageKey, SyncState};

#[derive(Debug, Clone)]
pub struct SyncCoordinator {
    key: StorageKey,
    state: SyncState,
}

impl SyncCoordinator {
    /// Collections without a remote route are local-only regardless of mode.
    pub fn new(key: StorageKey, mode: DeploymentMode) -> Self {
        let state = match key.remote_route() {
            Some(_) => mode.initial_sync_state(),
            None => SyncState::LocalOnly,
        };
        Self { key, state }
    }

    pub fn key(&self) -> StorageKey {
        self.key
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Route to contact, or `None` when the collection is local-only.
    pub fn remote_route(&self) -> Option<RemoteRoute> {
        match self.state {
            SyncState::RemoteBacked => self.key.remote_route(),
            SyncState::LocalOnly => None,
        }
    }

    /// Record a stateless answer seen on a write. Only the sentinel degrades
    /// here; an ordinary write failure leaves the collection remote-backed.
    pub fn record_sentinel(&mut self, error: &RemoteError) {
        if matches!(error, RemoteError::UseLocalStorage(_)) {
            self.record_read_failure(error);
        }
    }

    /// Record a failed startup read. Degrades to `LocalOnly` for the rest of
    /// the process.
    pub fn record_read_failure(&mut self, error: &RemoteError) {
        if self.state == SyncState::LocalOnly {
            return;
        }
        match error {
            RemoteError::UseLocalStorage(message) => {
                tracing::info!(
                    key = %self.key,
                    message = %message,
                    "Remote store is stateless, switching to local storage"
                );
            }
            other => {
                tracing::warn!(
                    key = %self.key,
                    error = %other,
                    "Remote read failed, switching to local storage"
                );
            }
        }
        self.state = SyncState::LocalOnly;
    }
}
