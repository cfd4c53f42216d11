//! Chat configuration store. Local cache only, never mirrored remotely.

use std::sync::Arc;

use quill_types::config::{ChatConfig, ModelId};
use quill_types::error::RepositoryError;
use quill_types::storage::StorageKey;

use crate::storage::LocalCache;

pub struct ConfigStore<L> {
    local: Arc<L>,
    config: ChatConfig,
}

impl<L: LocalCache> ConfigStore<L> {
    pub fn new(local: Arc<L>) -> Self {
        Self {
            local,
            config: ChatConfig::default(),
        }
    }

    /// Load the stored config, falling back to the default model on first
    /// run or when the stored value does not decode.
    pub async fn load(&mut self) -> Result<&ChatConfig, RepositoryError> {
        self.config = match self.local.get(StorageKey::ChatConfig).await? {
            Some(raw) => serde_json::from_value(raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Stored chat config is invalid, using defaults");
                ChatConfig::default()
            }),
            None => ChatConfig::default(),
        };
        Ok(&self.config)
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn model(&self) -> ModelId {
        self.config.model
    }

    pub async fn set_model(&mut self, model: ModelId) -> Result<(), RepositoryError> {
        let next = ChatConfig { model };
        let value =
            serde_json::to_value(&next).map_err(|e| RepositoryError::Query(e.to_string()))?;
        self.local.put(StorageKey::ChatConfig, &value).await?;
        self.config = next;
        tracing::info!(model = %model, "Chat model updated");
        Ok(())
    }
}
