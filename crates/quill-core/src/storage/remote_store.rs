//! Remote store trait.
//!
//! The remote store may be unreachable, slow, or stateless. Implementations
//! translate its envelope into either a snapshot or a [`RemoteError`].

use quill_types::error::RemoteError;
use quill_types::storage::RemoteRoute;
use serde_json::Value;

pub trait RemoteStore: Send + Sync {
    /// Fetch the full snapshot behind `route`.
    ///
    /// Returns [`RemoteError::UseLocalStorage`] when the deployment answers
    /// with the "use local storage" sentinel instead of data.
    fn fetch(
        &self,
        route: RemoteRoute,
    ) -> impl std::future::Future<Output = Result<Value, RemoteError>> + Send;

    /// Replace the full snapshot behind `route`.
    fn push(
        &self,
        route: RemoteRoute,
        value: &Value,
    ) -> impl std::future::Future<Output = Result<(), RemoteError>> + Send;
}
