//! Wire shapes for the provider proxy (`/api/check`, `/api/chat`).
//!
//! The proxy is a pass-through to an OpenAI-compatible chat completions API,
//! so responses follow that shape and errors come wrapped in an
//! `{ "error": { "message": ... } }` envelope.

use serde::{Deserialize, Serialize};

use crate::chat::Message;
use crate::config::ModelId;

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: ModelId,
    pub messages: Vec<Message>,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Successful `POST /api/chat` body. Only the fields Quill reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletionBody {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoiceMessage {
    pub content: Option<String>,
}

impl ChatCompletionBody {
    /// Content of `choices[0].message`, if the response has that shape.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
    }
}

/// Error envelope returned by the proxy with a non-2xx status.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub code: Option<u16>,
}

/// Body of `GET /api/check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub configured: bool,
    #[serde(default)]
    pub message: String,
}
