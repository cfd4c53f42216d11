//! ChatProvider trait definition.
//!
//! The provider is reached through a proxy that holds the credentials, so
//! the core never sees an API key. Implementations live in quill-infra.

use std::sync::Arc;

use quill_types::error::LlmError;
use quill_types::llm::{ChatRequest, ProviderStatus};

/// Trait for the chat completion backend.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ChatProvider: Send + Sync {
    /// Ask the proxy whether a provider credential is configured.
    fn check(&self) -> impl std::future::Future<Output = Result<ProviderStatus, LlmError>> + Send;

    /// Send one completion request and return the assistant reply text.
    ///
    /// Single attempt, no retry.
    fn complete(
        &self,
        request: &ChatRequest,
    ) -> impl std::future::Future<Output = Result<String, LlmError>> + Send;
}

impl<T: ChatProvider> ChatProvider for Arc<T> {
    async fn check(&self) -> Result<ProviderStatus, LlmError> {
        self.as_ref().check().await
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        self.as_ref().complete(request).await
    }
}
