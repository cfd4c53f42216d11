//! Application state wiring the stores and services together.
//!
//! The core stores are generic over the storage and provider ports;
//! AppState pins them to the SQLite cache, the HTTP remote store and the
//! proxy provider.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use quill_core::autosave::AutoSaver;
use quill_core::chat::ChatService;
use quill_core::context::ContextWindowBuilder;
use quill_core::entity::{ConfigStore, ConversationStore, JournalStore};
use quill_core::llm::SendGate;
use quill_core::storage::StorageAdapter;
use quill_infra::config::{load_app_config, resolve_deployment};
use quill_infra::filesystem::resolve_data_dir;
use quill_infra::http::{HttpRemoteStore, ProxyChatProvider};
use quill_infra::sqlite::{DatabasePool, SqliteLocalCache};
use quill_types::config::AppConfig;
use quill_types::deployment::{DeploymentMode, DeploymentSetting};
use quill_types::storage::{ReadSource, StorageKey};
use tokio::sync::Mutex;

pub type ConcreteJournalStore = JournalStore<SqliteLocalCache, HttpRemoteStore>;

pub type ConcreteChatService = ChatService<SqliteLocalCache, HttpRemoteStore, ProxyChatProvider>;

pub type ConcreteAutoSaver = AutoSaver<SqliteLocalCache, HttpRemoteStore>;

/// Command-line values that take precedence over `config.toml`.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub deployment: Option<DeploymentSetting>,
}

impl Overrides {
    fn apply(self, config: &mut AppConfig) {
        if let Some(base_url) = self.base_url {
            config.remote.base_url = base_url;
        }
        if let Some(deployment) = self.deployment {
            config.remote.deployment = deployment;
        }
    }
}

pub struct AppState {
    pub data_dir: PathBuf,
    pub config: AppConfig,
    pub mode: DeploymentMode,
    pub cache: Arc<SqliteLocalCache>,
    pub journal: Arc<Mutex<ConcreteJournalStore>>,
    /// Where the startup journal read came from.
    pub journal_source: ReadSource,
    pub chat: ConcreteChatService,
}

impl AppState {
    /// Resolve configuration, open the database and run the startup reads.
    pub async fn init(overrides: Overrides) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let mut config = load_app_config(&data_dir).await;
        overrides.apply(&mut config);
        let mode = resolve_deployment(&config);
        tracing::info!(
            mode = %mode,
            base_url = %config.remote.base_url,
            data_dir = %data_dir.display(),
            "Starting quill"
        );

        let pool = DatabasePool::open_in(&data_dir).await?;
        let cache = Arc::new(SqliteLocalCache::new(pool));
        let remote_timeout = Duration::from_secs(config.remote.timeout_secs);
        let remote = Arc::new(HttpRemoteStore::new(
            config.remote.base_url.clone(),
            remote_timeout,
        )?);

        let mut journal = JournalStore::new(StorageAdapter::new(
            StorageKey::JournalEntries,
            cache.clone(),
            remote.clone(),
            mode,
        ));
        let journal_source = journal.load().await?;

        let conversations = ConversationStore::new(StorageAdapter::new(
            StorageKey::Conversations,
            cache.clone(),
            remote,
            mode,
        ))
        .with_max_stored_messages(config.chat.max_stored_messages);
        let provider = ProxyChatProvider::new(
            config.remote.base_url.clone(),
            Duration::from_secs(config.chat.request_timeout_secs),
            remote_timeout,
        )?;
        let mut chat = ChatService::new(
            conversations,
            ConfigStore::new(cache.clone()),
            provider,
            SendGate::new(mode),
            ContextWindowBuilder::from_settings(&config.chat),
        );
        chat.load().await?;

        Ok(Self {
            data_dir,
            config,
            mode,
            cache,
            journal: Arc::new(Mutex::new(journal)),
            journal_source,
            chat,
        })
    }

    /// Auto-saver bound to the journal store with the configured quiet period.
    pub fn auto_saver(&self) -> ConcreteAutoSaver {
        AutoSaver::new(
            self.journal.clone(),
            Duration::from_millis(self.config.journal.autosave_debounce_ms),
        )
    }
}
