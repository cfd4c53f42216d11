//! Configuration types for Quill.
//!
//! Two distinct things live here:
//! - [`ChatConfig`]: the user's model choice, persisted to the local cache.
//! - [`AppConfig`]: the operator's `config.toml` (remote base URL, deployment
//!   mode, window sizes, timeouts). All fields have sensible defaults.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::deployment::DeploymentSetting;

/// Supported inference models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelId {
    #[serde(rename = "qwen-turbo")]
    QwenTurbo,
    #[serde(rename = "qwen-plus")]
    QwenPlus,
    #[serde(rename = "qwen-max")]
    QwenMax,
    #[serde(rename = "deepseek-chat")]
    DeepseekChat,
    #[serde(rename = "deepseek-reasoner")]
    DeepseekReasoner,
}

impl ModelId {
    pub const ALL: [ModelId; 5] = [
        ModelId::QwenTurbo,
        ModelId::QwenPlus,
        ModelId::QwenMax,
        ModelId::DeepseekChat,
        ModelId::DeepseekReasoner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::QwenTurbo => "qwen-turbo",
            ModelId::QwenPlus => "qwen-plus",
            ModelId::QwenMax => "qwen-max",
            ModelId::DeepseekChat => "deepseek-chat",
            ModelId::DeepseekReasoner => "deepseek-reasoner",
        }
    }

    /// Provider family, using the same prefix rule as the proxy's routing.
    pub fn family(&self) -> ModelFamily {
        if self.as_str().starts_with("deepseek") {
            ModelFamily::DeepSeek
        } else {
            ModelFamily::Qwen
        }
    }
}

impl Default for ModelId {
    fn default() -> Self {
        ModelId::QwenTurbo
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ModelId::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| format!("unsupported model: '{s}'"))
    }
}

/// Provider family a model belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelFamily {
    Qwen,
    DeepSeek,
}

/// Chat settings chosen by the user. Local cache only, never remote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub model: ModelId,
}

/// Top-level operator configuration, loaded from `{data_dir}/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub remote: RemoteSettings,
    #[serde(default)]
    pub chat: ChatSettings,
    #[serde(default)]
    pub journal: JournalSettings,
}

/// Where the remote store and provider proxy live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub deployment: DeploymentSetting,
    #[serde(default = "default_remote_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_remote_timeout_secs() -> u64 {
    10
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            deployment: DeploymentSetting::default(),
            timeout_secs: default_remote_timeout_secs(),
        }
    }
}

/// Context window and sampling parameters for chat requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSettings {
    /// Number of prior messages sent with each request.
    #[serde(default = "default_context_messages")]
    pub context_messages: usize,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Messages kept per conversation on disk. 0 keeps everything.
    #[serde(default = "default_max_stored_messages")]
    pub max_stored_messages: usize,
}

fn default_context_messages() -> usize {
    20
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    1500
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_max_stored_messages() -> usize {
    crate::chat::DEFAULT_MAX_STORED_MESSAGES
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            context_messages: default_context_messages(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
            max_stored_messages: default_max_stored_messages(),
        }
    }
}

/// Journal editor behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalSettings {
    /// Quiet period before an auto-save fires.
    #[serde(default = "default_autosave_debounce_ms")]
    pub autosave_debounce_ms: u64,
}

fn default_autosave_debounce_ms() -> u64 {
    1000
}

impl Default for JournalSettings {
    fn default() -> Self {
        Self {
            autosave_debounce_ms: default_autosave_debounce_ms(),
        }
    }
}
