use thiserror::Error;

use crate::id::EntityId;

/// Errors from the local cache (used by trait definitions in quill-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("query error: {0}")]
    Query(String),

    /// A stored snapshot no longer decodes as its collection.
    #[error("corrupt snapshot: {0}")]
    Corrupt(String),
}

/// Errors from the remote store.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Network unreachable, timeout, or non-2xx status.
    #[error("transport error: {0}")]
    Transport(String),

    /// Body did not have the expected shape.
    #[error("format error: {0}")]
    Format(String),

    /// The deployment is stateless and told us to keep data locally.
    #[error("remote store asked to use local storage: {0}")]
    UseLocalStorage(String),
}

/// Errors from the inference provider boundary.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network unreachable, timeout, or non-2xx status. Carries the proxy's
    /// error message verbatim when it sent one.
    #[error("{0}")]
    Transport(String),

    /// 2xx response without a `choices[0].message`.
    #[error("unexpected response format: {0}")]
    Format(String),

    /// Provider credential missing, as reported by the proxy.
    #[error("{0}")]
    Configuration(String),
}

/// Errors from entity store operations.
#[derive(Debug, Error)]
pub enum EntityError {
    /// Recoverable: callers ignore it and re-render from current state.
    #[error("entity '{0}' not found")]
    NotFound(EntityId),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

impl EntityError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, EntityError::NotFound(_))
    }
}

/// Errors from importing a snapshot document.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid import file: {0}")]
    Format(String),
}

/// Errors that stop a chat message from being sent at all.
///
/// Provider failures after the message was accepted are not errors here;
/// they come back as a failed send outcome.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("message is empty")]
    EmptyMessage,

    /// The send gate is closed. Carries the status message verbatim.
    #[error("{0}")]
    NotConfigured(String),

    #[error(transparent)]
    Entity(#[from] EntityError),
}
