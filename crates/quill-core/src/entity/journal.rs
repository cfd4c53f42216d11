//! Journal entry store.

use chrono::{NaiveDate, Utc};
use quill_types::error::{EntityError, ImportError};
use quill_types::id::EntityId;
use quill_types::journal::{JournalEntry, JournalExport, JournalPatch, SaveKind};
use quill_types::storage::{ReadSource, SyncState};
use serde_json::Value;

use crate::merge::merge_by_id;
use crate::notice::Notice;
use crate::storage::{LocalCache, RemoteStore, StorageAdapter, WriteReport};

/// In-memory journal collection, persisted as one snapshot.
///
/// Entries are kept in insertion order with new entries at the head. The
/// active entry is the one open in the editor; it may be `None`.
pub struct JournalStore<L, R> {
    storage: StorageAdapter<L, R>,
    entries: Vec<JournalEntry>,
    active: Option<EntityId>,
    last_write: Option<WriteReport>,
}

impl<L: LocalCache, R: RemoteStore> JournalStore<L, R> {
    pub fn new(storage: StorageAdapter<L, R>) -> Self {
        Self {
            storage,
            entries: Vec::new(),
            active: None,
            last_write: None,
        }
    }

    /// Startup read. Duplicate ids in the stored snapshot are collapsed.
    pub async fn load(&mut self) -> Result<ReadSource, EntityError> {
        let outcome = self.storage.read_as::<Vec<JournalEntry>>().await?;
        let mut entries = Vec::new();
        merge_by_id(&mut entries, outcome.value.unwrap_or_default());
        tracing::debug!(count = entries.len(), source = %outcome.source, "Loaded journal entries");

        self.entries = entries;
        self.active = None;
        Ok(outcome.source)
    }

    pub fn sync_state(&self) -> SyncState {
        self.storage.sync_state()
    }

    /// Remote outcome of the most recent persist.
    pub fn last_write(&self) -> Option<&WriteReport> {
        self.last_write.as_ref()
    }

    /// Create a blank entry dated `date`, insert it at the head and make it
    /// active.
    pub async fn create(&mut self, date: NaiveDate) -> Result<JournalEntry, EntityError> {
        let entry = JournalEntry::new(date);
        self.entries.insert(0, entry.clone());
        self.active = Some(entry.id.clone());
        self.persist().await?;

        tracing::info!(id = %entry.id, date = %entry.date, "Created journal entry");
        Ok(entry)
    }

    /// Create a blank entry dated today (UTC).
    pub async fn create_today(&mut self) -> Result<JournalEntry, EntityError> {
        self.create(Utc::now().date_naive()).await
    }

    pub fn get(&self, id: &EntityId) -> Result<&JournalEntry, EntityError> {
        self.entries
            .iter()
            .find(|e| &e.id == id)
            .ok_or_else(|| EntityError::NotFound(id.clone()))
    }

    /// Entries in stored order.
    pub fn list(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// Entries sorted by `date` descending, for presentation.
    pub fn list_by_date(&self) -> Vec<&JournalEntry> {
        let mut sorted: Vec<&JournalEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        sorted
    }

    /// Entries whose title or content contains `keyword` (case-insensitive),
    /// sorted like [`list_by_date`](Self::list_by_date).
    pub fn search(&self, keyword: &str) -> Vec<&JournalEntry> {
        self.list_by_date()
            .into_iter()
            .filter(|e| e.matches(keyword))
            .collect()
    }

    pub fn active(&self) -> Option<&JournalEntry> {
        let id = self.active.as_ref()?;
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn set_active(&mut self, id: &EntityId) -> Result<(), EntityError> {
        self.get(id)?;
        self.active = Some(id.clone());
        Ok(())
    }

    /// Apply `patch` to an entry and persist.
    ///
    /// Auto-saves return `None`: they must not raise a visible notice.
    pub async fn update(
        &mut self,
        id: &EntityId,
        patch: JournalPatch,
        kind: SaveKind,
    ) -> Result<Option<Notice>, EntityError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| EntityError::NotFound(id.clone()))?;
        entry.apply(patch);
        self.persist().await?;

        match kind {
            SaveKind::Explicit => {
                tracing::debug!(id = %id, "Saved journal entry");
                Ok(Some(Notice::EntrySaved(id.clone())))
            }
            SaveKind::Auto => {
                tracing::debug!(id = %id, "Auto-saved journal entry");
                Ok(None)
            }
        }
    }

    /// Remove an entry. Deleting the active entry clears the selection.
    pub async fn delete(&mut self, id: &EntityId) -> Result<Notice, EntityError> {
        let index = self
            .entries
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| EntityError::NotFound(id.clone()))?;
        self.entries.remove(index);
        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
        self.persist().await?;

        tracing::info!(id = %id, "Deleted journal entry");
        Ok(Notice::EntryDeleted(id.clone()))
    }

    /// Backup document of every entry, in stored order.
    pub fn export(&self) -> JournalExport {
        JournalExport::new(self.entries.clone())
    }

    /// Merge entries from a backup document. Existing ids win.
    pub async fn import(&mut self, incoming: Vec<JournalEntry>) -> Result<Notice, EntityError> {
        let imported = merge_by_id(&mut self.entries, incoming);
        if imported > 0 {
            self.persist().await?;
        }
        tracing::info!(imported, total = self.entries.len(), "Imported journal entries");
        Ok(Notice::EntriesImported(imported))
    }

    async fn persist(&mut self) -> Result<(), EntityError> {
        let report = self.storage.write_as(&self.entries).await?;
        self.last_write = Some(report);
        Ok(())
    }
}

/// Validate and decode an import document.
///
/// Only the `entries` array is required. Anything else in the document
/// (version, export date) is informational.
pub fn parse_import(json: &str) -> Result<Vec<JournalEntry>, ImportError> {
    let document: Value = serde_json::from_str(json)
        .map_err(|e| ImportError::Format(format!("not valid JSON: {e}")))?;
    let Some(entries) = document.get("entries").filter(|v| v.is_array()) else {
        return Err(ImportError::Format("missing entries array".to_string()));
    };
    serde_json::from_value(entries.clone())
        .map_err(|e| ImportError::Format(format!("malformed entry: {e}")))
}
