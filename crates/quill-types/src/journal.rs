//! Journal entry types and the export document format.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{EntityId, now_not_before};

/// Title stored when an entry is saved without one.
pub const UNTITLED_ENTRY: &str = "Untitled";

/// Version tag written into export documents.
pub const EXPORT_FORMAT_VERSION: &str = "1.0";

/// A single journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: EntityId,
    /// Calendar date the entry is about (not its creation time).
    pub date: NaiveDate,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JournalEntry {
    /// A blank entry dated `date`.
    pub fn new(date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            date,
            title: String::new(),
            content: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a patch and bump `updated_at`.
    ///
    /// An empty resulting title is replaced with [`UNTITLED_ENTRY`].
    pub fn apply(&mut self, patch: JournalPatch) {
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if self.title.trim().is_empty() {
            self.title = UNTITLED_ENTRY.to_string();
        }
        self.updated_at = now_not_before(self.updated_at);
    }

    /// Case-insensitive substring match over title and content.
    pub fn matches(&self, keyword: &str) -> bool {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&keyword)
            || self.content.to_lowercase().contains(&keyword)
    }
}

/// Fields to change on a journal entry. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalPatch {
    pub date: Option<NaiveDate>,
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Whether a save was requested explicitly or by the auto-save timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Explicit,
    Auto,
}

/// Backup document produced by export and accepted by import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalExport {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub entries: Vec<JournalEntry>,
}

impl JournalExport {
    pub fn new(entries: Vec<JournalEntry>) -> Self {
        Self {
            version: EXPORT_FORMAT_VERSION.to_string(),
            export_date: Utc::now(),
            entries,
        }
    }
}
