//! Conversation store.
//!
//! Invariant: after `load()` there is always an active conversation and it
//! refers to a live entity. Deleting the last conversation creates a fresh
//! empty one.

use quill_types::chat::{Conversation, ConversationExport, DEFAULT_MAX_STORED_MESSAGES, Message};
use quill_types::error::{EntityError, ImportError, RepositoryError};
use quill_types::id::EntityId;
use quill_types::storage::{ReadSource, SyncState};
use serde_json::Value;

use crate::entity::most_recent;
use crate::merge::merge_by_id;
use crate::storage::{LocalCache, RemoteStore, StorageAdapter, WriteReport};

/// Fields to change on a conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationPatch {
    pub title: Option<String>,
}

pub struct ConversationStore<L, R> {
    storage: StorageAdapter<L, R>,
    conversations: Vec<Conversation>,
    active: Option<EntityId>,
    last_write: Option<WriteReport>,
    max_stored_messages: usize,
}

impl<L: LocalCache, R: RemoteStore> ConversationStore<L, R> {
    pub fn new(storage: StorageAdapter<L, R>) -> Self {
        Self {
            storage,
            conversations: Vec::new(),
            active: None,
            last_write: None,
            max_stored_messages: DEFAULT_MAX_STORED_MESSAGES,
        }
    }

    /// Messages kept per conversation when saving. 0 disables the cap.
    pub fn with_max_stored_messages(mut self, max: usize) -> Self {
        self.max_stored_messages = max;
        self
    }

    /// Startup read. Activates the most recently updated conversation, or
    /// creates one when the history is empty.
    ///
    /// A stored history that no longer decodes is skipped: the session
    /// starts with one fresh conversation held in memory, and the stored
    /// copy stays as it is until the next write replaces it.
    pub async fn load(&mut self) -> Result<ReadSource, EntityError> {
        let outcome = match self.storage.read_as::<Vec<Conversation>>().await {
            Ok(outcome) => outcome,
            Err(RepositoryError::Corrupt(detail)) => {
                tracing::warn!(
                    detail = %detail,
                    "Stored conversations are unreadable, starting with an empty history"
                );
                self.conversations = Vec::new();
                self.insert_new();
                return Ok(ReadSource::Absent);
            }
            Err(e) => return Err(e.into()),
        };
        let mut conversations = Vec::new();
        merge_by_id(&mut conversations, outcome.value.unwrap_or_default());
        tracing::debug!(
            count = conversations.len(),
            source = %outcome.source,
            "Loaded conversations"
        );

        self.conversations = conversations;
        self.active = most_recent(&self.conversations);
        if self.active.is_none() {
            self.create().await?;
        }
        Ok(outcome.source)
    }

    pub fn sync_state(&self) -> SyncState {
        self.storage.sync_state()
    }

    pub fn last_write(&self) -> Option<&WriteReport> {
        self.last_write.as_ref()
    }

    /// Create an empty conversation with the default title and make it active.
    pub async fn create(&mut self) -> Result<Conversation, EntityError> {
        let conversation = self.insert_new();
        self.persist().await?;
        Ok(conversation)
    }

    pub fn get(&self, id: &EntityId) -> Result<&Conversation, EntityError> {
        self.conversations
            .iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| EntityError::NotFound(id.clone()))
    }

    /// Conversations in stored order.
    pub fn list(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Conversations sorted by `updated_at` descending.
    pub fn list_recent(&self) -> Vec<&Conversation> {
        let mut sorted: Vec<&Conversation> = self.conversations.iter().collect();
        sorted.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        sorted
    }

    pub fn active_id(&self) -> Option<&EntityId> {
        self.active.as_ref()
    }

    pub fn active(&self) -> Option<&Conversation> {
        let id = self.active.as_ref()?;
        self.conversations.iter().find(|c| &c.id == id)
    }

    pub fn set_active(&mut self, id: &EntityId) -> Result<(), EntityError> {
        self.get(id)?;
        self.active = Some(id.clone());
        Ok(())
    }

    pub async fn update(
        &mut self,
        id: &EntityId,
        patch: ConversationPatch,
    ) -> Result<Conversation, EntityError> {
        let conversation = self.find_mut(id)?;
        if let Some(title) = patch.title {
            conversation.title = title;
        }
        conversation.touch();
        let updated = conversation.clone();
        self.persist().await?;
        Ok(updated)
    }

    /// Set a user title. Title derivation never overwrites it afterwards,
    /// unless the user sets the placeholder title itself.
    pub async fn rename(&mut self, id: &EntityId, title: &str) -> Result<Conversation, EntityError> {
        self.update(
            id,
            ConversationPatch {
                title: Some(title.trim().to_string()),
            },
        )
        .await
    }

    /// Append a message to history and persist.
    pub async fn append_message(
        &mut self,
        id: &EntityId,
        message: Message,
    ) -> Result<(), EntityError> {
        self.find_mut(id)?.push(message);
        self.persist().await
    }

    /// Remove a conversation. If it was active, the most recently updated
    /// remaining one becomes active; if none remain, a new one is created.
    pub async fn delete(&mut self, id: &EntityId) -> Result<(), EntityError> {
        let index = self
            .conversations
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| EntityError::NotFound(id.clone()))?;
        self.conversations.remove(index);
        tracing::info!(id = %id, "Deleted conversation");

        if self.active.as_ref() == Some(id) {
            self.active = most_recent(&self.conversations);
        }
        if self.active.is_none() {
            self.insert_new();
        }
        self.persist().await
    }

    pub fn export(&self) -> ConversationExport {
        ConversationExport::new(self.conversations.clone())
    }

    /// Merge conversations from a backup. Existing ids win. Returns the
    /// number of conversations added.
    pub async fn import(&mut self, incoming: Vec<Conversation>) -> Result<usize, EntityError> {
        let imported = merge_by_id(&mut self.conversations, incoming);
        if imported > 0 {
            self.persist().await?;
        }
        tracing::info!(imported, total = self.conversations.len(), "Imported conversations");
        Ok(imported)
    }

    fn find_mut(&mut self, id: &EntityId) -> Result<&mut Conversation, EntityError> {
        self.conversations
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| EntityError::NotFound(id.clone()))
    }

    fn insert_new(&mut self) -> Conversation {
        let conversation = Conversation::new();
        tracing::info!(id = %conversation.id, "Created conversation");
        self.active = Some(conversation.id.clone());
        self.conversations.push(conversation.clone());
        conversation
    }

    /// Derive titles still at the placeholder, cap each history, then write
    /// the snapshot.
    async fn persist(&mut self) -> Result<(), EntityError> {
        for conversation in &mut self.conversations {
            conversation.derive_title();
            if self.max_stored_messages > 0 {
                let dropped = conversation.trim_history(self.max_stored_messages);
                if dropped > 0 {
                    tracing::debug!(id = %conversation.id, dropped, "Trimmed conversation history");
                }
            }
        }
        let report = self.storage.write_as(&self.conversations).await?;
        self.last_write = Some(report);
        Ok(())
    }
}

/// Validate and decode a conversation backup document.
pub fn parse_conversation_import(json: &str) -> Result<Vec<Conversation>, ImportError> {
    let document: Value = serde_json::from_str(json)
        .map_err(|e| ImportError::Format(format!("not valid JSON: {e}")))?;
    let Some(conversations) = document.get("conversations").filter(|v| v.is_array()) else {
        return Err(ImportError::Format("missing conversations array".to_string()));
    };
    serde_json::from_value(conversations.clone())
        .map_err(|e| ImportError::Format(format!("malformed conversation: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use quill_types::chat::DEFAULT_CONVERSATION_TITLE;
    use quill_types::deployment::DeploymentMode;
    use quill_types::storage::StorageKey;

    use crate::storage::RemoteWrite;
    use crate::test_support::{FakeRemote, MemoryCache, RemoteBehavior};

    type Store = ConversationStore<MemoryCache, FakeRemote>;

    fn store_over(local: Arc<MemoryCache>) -> (Store, Arc<FakeRemote>) {
        let remote = Arc::new(FakeRemote::new(RemoteBehavior::Serve));
        let adapter = StorageAdapter::new(
            StorageKey::Conversations,
            local,
            remote.clone(),
            DeploymentMode::Local,
        );
        (ConversationStore::new(adapter), remote)
    }

    async fn loaded() -> (Store, Arc<MemoryCache>) {
        let local = Arc::new(MemoryCache::default());
        let (mut store, _) = store_over(local.clone());
        store.load().await.unwrap();
        (store, local)
    }

    fn assert_active_is_live(store: &Store) {
        let id = store.active_id().expect("active conversation");
        assert!(store.get(id).is_ok());
    }

    #[tokio::test]
    async fn test_load_empty_creates_one_active_conversation() {
        let (store, local) = loaded().await;
        assert_eq!(store.list().len(), 1);
        assert_active_is_live(&store);
        assert_eq!(store.active().unwrap().title, DEFAULT_CONVERSATION_TITLE);
        assert!(local.snapshot(StorageKey::Conversations).is_some());
    }

    #[tokio::test]
    async fn test_load_activates_most_recently_updated() {
        let mut older = Conversation::new();
        older.updated_at = Utc::now() - Duration::hours(2);
        let newer = Conversation::new();
        let mut oldest = Conversation::new();
        oldest.updated_at = Utc::now() - Duration::days(1);
        let snapshot = serde_json::to_value(vec![older, newer.clone(), oldest]).unwrap();

        let local = Arc::new(MemoryCache::with(StorageKey::Conversations, snapshot));
        let (mut store, _) = store_over(local);
        assert_eq!(store.load().await.unwrap(), ReadSource::Local);
        assert_eq!(store.active_id(), Some(&newer.id));
    }

    #[tokio::test]
    async fn test_conversations_never_touch_remote() {
        let local = Arc::new(MemoryCache::default());
        let (mut store, remote) = store_over(local);
        store.load().await.unwrap();
        store.create().await.unwrap();

        assert_eq!(store.sync_state(), SyncState::LocalOnly);
        assert!(matches!(store.last_write().unwrap().remote, RemoteWrite::Skipped));
        assert_eq!(remote.fetch_count(), 0);
        assert_eq!(remote.push_count(), 0);
    }

    #[tokio::test]
    async fn test_create_sets_active() {
        let (mut store, _) = loaded().await;
        let created = store.create().await.unwrap();

        assert_eq!(store.active_id(), Some(&created.id));
        assert!(created.messages.is_empty());
        assert_eq!(created.title, DEFAULT_CONVERSATION_TITLE);
    }

    #[tokio::test]
    async fn test_deleting_only_conversation_creates_fresh_one() {
        let (mut store, _) = loaded().await;
        let only = store.active_id().unwrap().clone();

        store.delete(&only).await.unwrap();

        assert_eq!(store.list().len(), 1);
        let fresh = store.active().unwrap();
        assert_ne!(fresh.id, only);
        assert!(fresh.messages.is_empty());
    }

    #[tokio::test]
    async fn test_deleting_active_selects_most_recent_remaining() {
        let (mut store, _) = loaded().await;
        let first = store.active_id().unwrap().clone();
        let second = store.create().await.unwrap();
        let third = store.create().await.unwrap();
        store
            .append_message(&first, Message::user("bump"))
            .await
            .unwrap();

        store.delete(&third.id).await.unwrap();
        assert_eq!(store.active_id(), Some(&first));
        assert_eq!(store.list().len(), 2);
        assert!(store.get(&second.id).is_ok());
        assert_active_is_live(&store);
    }

    #[tokio::test]
    async fn test_deleting_inactive_keeps_selection() {
        let (mut store, _) = loaded().await;
        let first = store.active_id().unwrap().clone();
        let second = store.create().await.unwrap();

        store.delete(&first).await.unwrap();
        assert_eq!(store.active_id(), Some(&second.id));
    }

    #[tokio::test]
    async fn test_active_stays_live_across_mixed_operations() {
        let (mut store, _) = loaded().await;
        for round in 0..4 {
            let created = store.create().await.unwrap();
            assert_active_is_live(&store);
            store
                .rename(&created.id, &format!("round {round}"))
                .await
                .unwrap();
            assert_active_is_live(&store);
            if round % 2 == 0 {
                store.delete(&created.id).await.unwrap();
            } else {
                let oldest = store.list()[0].id.clone();
                store.delete(&oldest).await.unwrap();
            }
            assert_active_is_live(&store);
        }
        let ghost = EntityId::from("ghost");
        assert!(store.delete(&ghost).await.unwrap_err().is_not_found());
        assert_active_is_live(&store);
    }

    #[tokio::test]
    async fn test_append_message_derives_title_once() {
        let (mut store, local) = loaded().await;
        let id = store.active_id().unwrap().clone();

        store
            .append_message(&id, Message::user("What should I write about today?"))
            .await
            .unwrap();
        store
            .append_message(&id, Message::assistant("Your morning walk."))
            .await
            .unwrap();
        let title = store.get(&id).unwrap().title.clone();
        assert_eq!(title, "What should I write about toda…");

        store
            .append_message(&id, Message::user("Another topic entirely"))
            .await
            .unwrap();
        assert_eq!(store.get(&id).unwrap().title, title);

        let persisted: Vec<Conversation> =
            serde_json::from_value(local.snapshot(StorageKey::Conversations).unwrap()).unwrap();
        assert_eq!(persisted[0].title, title);
        assert_eq!(persisted[0].messages.len(), 3);
    }

    #[tokio::test]
    async fn test_rename_is_not_overwritten_by_derivation() {
        let (mut store, _) = loaded().await;
        let id = store.active_id().unwrap().clone();

        store.rename(&id, "Planning").await.unwrap();
        store.append_message(&id, Message::user("hello")).await.unwrap();
        assert_eq!(store.get(&id).unwrap().title, "Planning");
    }

    #[tokio::test]
    async fn test_append_to_unknown_conversation() {
        let (mut store, _) = loaded().await;
        let err = store
            .append_message(&EntityId::from("ghost"), Message::user("hi"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_import_merges_by_id() {
        let (mut store, _) = loaded().await;
        let existing = store.active().unwrap().clone();
        let mut clash = existing.clone();
        clash.title = "Imported copy".to_string();
        let novel = Conversation::new();

        let imported = store.import(vec![clash, novel.clone()]).await.unwrap();
        assert_eq!(imported, 1);
        assert_eq!(store.get(&existing.id).unwrap().title, existing.title);
        assert!(store.get(&novel.id).is_ok());

        let doc = serde_json::to_string(&store.export()).unwrap();
        let again = parse_conversation_import(&doc).unwrap();
        assert_eq!(store.import(again).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_persist_keeps_only_newest_messages() {
        let (mut store, local) = loaded().await;
        let id = store.active_id().unwrap().clone();

        for i in 0..120 {
            store
                .append_message(&id, Message::user(format!("message {i}")))
                .await
                .unwrap();
        }

        let persisted: Vec<Conversation> =
            serde_json::from_value(local.snapshot(StorageKey::Conversations).unwrap()).unwrap();
        let messages = &persisted[0].messages;
        assert_eq!(messages.len(), DEFAULT_MAX_STORED_MESSAGES);
        assert_eq!(messages[0].content, "message 70");
        assert_eq!(messages[49].content, "message 119");
        assert_eq!(persisted[0].title, "message 0");
        assert_eq!(store.get(&id).unwrap().messages.len(), DEFAULT_MAX_STORED_MESSAGES);
    }

    #[tokio::test]
    async fn test_zero_cap_keeps_every_message() {
        let local = Arc::new(MemoryCache::default());
        let (store, _) = store_over(local.clone());
        let mut store = store.with_max_stored_messages(0);
        store.load().await.unwrap();
        let id = store.active_id().unwrap().clone();

        for i in 0..60 {
            store
                .append_message(&id, Message::user(format!("message {i}")))
                .await
                .unwrap();
        }
        assert_eq!(store.get(&id).unwrap().messages.len(), 60);
    }

    #[tokio::test]
    async fn test_unreadable_history_starts_fresh_without_overwriting() {
        let corrupt = serde_json::json!({ "x": 1 });
        let local = Arc::new(MemoryCache::with(StorageKey::Conversations, corrupt.clone()));
        let (mut store, _) = store_over(local.clone());

        assert_eq!(store.load().await.unwrap(), ReadSource::Absent);
        assert_eq!(store.list().len(), 1);
        assert_active_is_live(&store);
        assert_eq!(local.snapshot(StorageKey::Conversations), Some(corrupt));
        assert_eq!(local.put_count(), 0);

        // The next explicit write replaces the unreadable copy.
        store.create().await.unwrap();
        let persisted: Vec<Conversation> =
            serde_json::from_value(local.snapshot(StorageKey::Conversations).unwrap()).unwrap();
        assert_eq!(persisted.len(), 2);
    }

    #[test]
    fn test_parse_conversation_import_requires_array() {
        assert!(matches!(
            parse_conversation_import(r#"{"entries":[]}"#),
            Err(ImportError::Format(_))
        ));
    }
}
