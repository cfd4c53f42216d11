//! Local cache trait.
//!
//! Defines the interface for the durable key/value cache that holds one JSON
//! snapshot per storage key. Implementations live in quill-infra.

use quill_types::error::RepositoryError;
use quill_types::storage::StorageKey;
use serde_json::Value;

/// Durable, always-available snapshot store.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait LocalCache: Send + Sync {
    /// Fetch the snapshot stored under `key`, if any.
    fn get(
        &self,
        key: StorageKey,
    ) -> impl std::future::Future<Output = Result<Option<Value>, RepositoryError>> + Send;

    /// Replace the snapshot stored under `key`.
    fn put(
        &self,
        key: StorageKey,
        value: &Value,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}

