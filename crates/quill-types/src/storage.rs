//! Storage keys, backend routing, and sync state types.

use serde::{Deserialize, Serialize};

use std::fmt;

/// Stable key under which a whole collection snapshot is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKey {
    ChatConfig,
    Conversations,
    JournalEntries,
}

impl StorageKey {
    /// Key used in the local cache.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::ChatConfig => "chat_config",
            StorageKey::Conversations => "chat_history",
            StorageKey::JournalEntries => "journal_entries",
        }
    }

    /// Remote endpoint for this key, if it has one.
    ///
    /// Chat config is local-only by contract. Conversations have no remote
    /// endpoint on the proxy.
    pub fn remote_route(&self) -> Option<RemoteRoute> {
        match self {
            StorageKey::JournalEntries => Some(RemoteRoute {
                path: "/api/entries",
                field: "entries",
            }),
            StorageKey::ChatConfig | StorageKey::Conversations => None,
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP path and envelope field for a remotely persisted collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteRoute {
    pub path: &'static str,
    /// Name of the JSON field carrying the snapshot in both directions.
    pub field: &'static str,
}

/// Which backend satisfied a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadSource {
    Remote,
    Local,
    Absent,
}

impl fmt::Display for ReadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadSource::Remote => write!(f, "remote"),
            ReadSource::Local => write!(f, "local"),
            ReadSource::Absent => write!(f, "absent"),
        }
    }
}

/// Persistence state of one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// Writes go to the local cache and are mirrored to the remote store.
    RemoteBacked,
    /// Writes go to the local cache only; remote is never contacted.
    LocalOnly,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncState::RemoteBacked => write!(f, "remote_backed"),
            SyncState::LocalOnly => write!(f, "local_only"),
        }
    }
}
