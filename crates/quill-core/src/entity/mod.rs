//! Entity stores: in-memory collections with an active selection, persisted
//! as whole snapshots through a [`StorageAdapter`](crate::storage::StorageAdapter).

pub mod config;
pub mod conversation;
pub mod journal;

use chrono::{DateTime, Utc};
use quill_types::chat::Conversation;
use quill_types::id::EntityId;
use quill_types::journal::JournalEntry;

pub use config::ConfigStore;
pub use conversation::{ConversationPatch, ConversationStore, parse_conversation_import};
pub use journal::{JournalStore, parse_import};

/// Common surface of persisted entities.
pub trait Entity {
    fn id(&self) -> &EntityId;
    fn updated_at(&self) -> DateTime<Utc>;
}

impl Entity for Conversation {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Entity for JournalEntry {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Id of the most recently updated entity, if any.
pub(crate) fn most_recent<E: Entity>(items: &[E]) -> Option<EntityId> {
    items
        .iter()
        .max_by_key(|item| item.updated_at())
        .map(|item| item.id().clone())
}
