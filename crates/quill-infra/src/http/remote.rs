//! HTTP remote store.
//!
//! Talks to the proxy's `/api/entries`-style endpoints. Every response is an
//! envelope `{ success, <field>, message?, useLocalStorage? }`; a stateless
//! deployment answers every call with the `useLocalStorage` sentinel.

use std::time::Duration;

use quill_core::storage::RemoteStore;
use quill_types::error::RemoteError;
use quill_types::storage::RemoteRoute;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::join_url;

/// Envelope shared by `GET` and `POST` answers.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    success: Option<bool>,
    #[serde(default)]
    use_local_storage: bool,
    message: Option<String>,
    error: Option<Value>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl Envelope {
    /// Sentinel or `success: false` as an error, else `Ok`.
    fn check(&self) -> Result<(), RemoteError> {
        if self.use_local_storage {
            return Err(RemoteError::UseLocalStorage(
                self.message.clone().unwrap_or_default(),
            ));
        }
        if self.success == Some(false) {
            let reason = self
                .message
                .clone()
                .or_else(|| self.error.as_ref().map(error_text))
                .unwrap_or_else(|| "request was not successful".to_string());
            return Err(RemoteError::Format(reason));
        }
        Ok(())
    }
}

/// Message text from either `"error": "..."` or `"error": { "message": ... }`.
fn error_text(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        other => other
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| other.to_string()),
    }
}

pub struct HttpRemoteStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRemoteStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read_envelope(response: reqwest::Response) -> Result<Envelope, RemoteError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("error").map(error_text))
                .unwrap_or(body);
            return Err(RemoteError::Transport(format!("HTTP {status}: {detail}")));
        }
        response
            .json::<Envelope>()
            .await
            .map_err(|e| RemoteError::Format(format!("failed to parse response: {e}")))
    }
}

impl RemoteStore for HttpRemoteStore {
    async fn fetch(&self, route: RemoteRoute) -> Result<Value, RemoteError> {
        let url = join_url(&self.base_url, route.path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(format!("HTTP request failed: {e}")))?;

        let mut envelope = Self::read_envelope(response).await?;
        envelope.check()?;
        let value = envelope
            .fields
            .remove(route.field)
            .ok_or_else(|| RemoteError::Format(format!("response has no '{}' field", route.field)))?;
        // A store with nothing saved yet answers with null.
        let value = match value {
            Value::Null => Value::Array(Vec::new()),
            other => other,
        };

        tracing::debug!(url = %url, "Fetched remote snapshot");
        Ok(value)
    }

    async fn push(&self, route: RemoteRoute, value: &Value) -> Result<(), RemoteError> {
        let url = join_url(&self.base_url, route.path);
        let mut body = Map::new();
        body.insert(route.field.to_string(), value.clone());

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(format!("HTTP request failed: {e}")))?;

        let envelope = Self::read_envelope(response).await?;
        envelope.check()?;

        tracing::debug!(url = %url, "Pushed remote snapshot");
        Ok(())
    }
}
