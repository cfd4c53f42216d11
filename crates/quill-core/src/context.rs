//! Context window builder.
//!
//! Turns a conversation plus the user's new text into the bounded message
//! sequence sent to the provider: one system directive, the most recent
//! prior messages in order, then the new user message. Pure; it never
//! touches history.

use quill_types::chat::{Conversation, Message};
use quill_types::config::{ChatSettings, ModelFamily, ModelId};
use quill_types::llm::ChatRequest;

/// Number of prior messages carried into each request.
pub const DEFAULT_CONTEXT_MESSAGES: usize = 20;

const QWEN_DIRECTIVE: &str = "You are a friendly AI assistant. You help the user organize their \
    thoughts, answer questions, and offer suggestions. Answer concisely and clearly.";

const DEEPSEEK_DIRECTIVE: &str = "You are a friendly AI assistant inside a personal journal. \
    Help the user organize their thoughts, answer questions, and offer suggestions. \
    Keep answers concise and clear.";

/// System directive per model family.
const SYSTEM_DIRECTIVES: &[(ModelFamily, &str)] = &[
    (ModelFamily::Qwen, QWEN_DIRECTIVE),
    (ModelFamily::DeepSeek, DEEPSEEK_DIRECTIVE),
];

pub fn system_directive(family: ModelFamily) -> &'static str {
    SYSTEM_DIRECTIVES
        .iter()
        .find(|(f, _)| *f == family)
        .map(|(_, directive)| *directive)
        .unwrap_or(QWEN_DIRECTIVE)
}

#[derive(Debug, Clone)]
pub struct ContextWindowBuilder {
    max_messages: usize,
    temperature: f64,
    max_tokens: u32,
}

impl Default for ContextWindowBuilder {
    fn default() -> Self {
        Self::from_settings(&ChatSettings::default())
    }
}

impl ContextWindowBuilder {
    pub fn from_settings(settings: &ChatSettings) -> Self {
        Self {
            max_messages: settings.context_messages,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }

    pub fn with_max_messages(mut self, max_messages: usize) -> Self {
        self.max_messages = max_messages;
        self
    }

    /// Build the message window. Messages older than the most recent
    /// `max_messages` are dropped, not summarized.
    pub fn build(&self, conversation: &Conversation, user_text: &str, model: ModelId) -> Vec<Message> {
        let history = &conversation.messages;
        let start = history.len().saturating_sub(self.max_messages);

        let mut window = Vec::with_capacity(history.len() - start + 2);
        window.push(Message::system(system_directive(model.family())));
        window.extend(history[start..].iter().cloned());
        window.push(Message::user(user_text));
        window
    }

    /// Build the full provider request.
    pub fn build_request(
        &self,
        conversation: &Conversation,
        user_text: &str,
        model: ModelId,
    ) -> ChatRequest {
        ChatRequest {
            model,
            messages: self.build(conversation, user_text, model),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}
