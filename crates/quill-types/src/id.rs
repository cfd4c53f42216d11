//! Entity identity and timestamp helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

/// Opaque identifier for a conversation or journal entry.
///
/// Freshly created entities get a UUID v7 string, which is derived from the
/// creation time and monotonic within a process. Imported snapshots may carry
/// any string (older exports used millisecond stamps), so the id is kept as
/// text rather than parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Generate a new time-derived id.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Current time, never earlier than `previous`.
///
/// Keeps `updated_at` monotonic even if the wall clock steps backwards
/// between two mutations.
pub fn now_not_before(previous: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(previous)
}
