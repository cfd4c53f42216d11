//! Chat service: gate check, context window, history, provider call.
//!
//! The user's message is appended to history before the provider is called,
//! so it survives a failed call. The window is built from the history as it
//! was before that append, so the new message appears in it exactly once.

use quill_types::chat::Message;
use quill_types::config::ModelId;
use quill_types::error::{EntityError, LlmError, SendError};
use quill_types::id::EntityId;

use crate::context::ContextWindowBuilder;
use crate::entity::{ConfigStore, ConversationStore};
use crate::llm::{ChatProvider, SendGate};
use crate::storage::{LocalCache, RemoteStore};

/// Result of a send whose user message was accepted.
#[derive(Debug)]
pub enum SendOutcome {
    /// The reply was appended to history.
    Replied {
        conversation_id: EntityId,
        reply: Message,
    },
    /// The provider call failed. `notice` is an assistant-role message to
    /// show the user; it is not part of history.
    Failed {
        conversation_id: EntityId,
        error: LlmError,
        notice: Message,
    },
}

impl SendOutcome {
    /// The assistant-role message to render.
    pub fn message(&self) -> &Message {
        match self {
            SendOutcome::Replied { reply, .. } => reply,
            SendOutcome::Failed { notice, .. } => notice,
        }
    }

    pub fn conversation_id(&self) -> &EntityId {
        match self {
            SendOutcome::Replied {
                conversation_id, ..
            }
            | SendOutcome::Failed {
                conversation_id, ..
            } => conversation_id,
        }
    }
}

/// Orchestrates sends against one conversation store and provider.
///
/// Generic over the storage ports and `ChatProvider` so quill-core never
/// depends on quill-infra.
pub struct ChatService<L, R, P> {
    conversations: ConversationStore<L, R>,
    config: ConfigStore<L>,
    provider: P,
    gate: SendGate,
    builder: ContextWindowBuilder,
}

impl<L, R, P> ChatService<L, R, P>
where
    L: LocalCache,
    R: RemoteStore,
    P: ChatProvider,
{
    pub fn new(
        conversations: ConversationStore<L, R>,
        config: ConfigStore<L>,
        provider: P,
        gate: SendGate,
        builder: ContextWindowBuilder,
    ) -> Self {
        Self {
            conversations,
            config,
            provider,
            gate,
            builder,
        }
    }

    /// Startup read of conversations and chat config.
    pub async fn load(&mut self) -> Result<(), EntityError> {
        self.conversations.load().await?;
        self.config.load().await?;
        Ok(())
    }

    pub fn conversations(&self) -> &ConversationStore<L, R> {
        &self.conversations
    }

    pub fn conversations_mut(&mut self) -> &mut ConversationStore<L, R> {
        &mut self.conversations
    }

    pub fn model(&self) -> ModelId {
        self.config.model()
    }

    pub async fn set_model(&mut self, model: ModelId) -> Result<(), EntityError> {
        self.config.set_model(model).await?;
        Ok(())
    }

    pub fn gate(&self) -> &SendGate {
        &self.gate
    }

    /// Re-check provider status. Returns whether sends are allowed.
    pub async fn refresh_status(&mut self) -> bool {
        self.gate.refresh(&self.provider).await
    }

    /// Send `text` in `conversation` (or the active conversation).
    pub async fn send(
        &mut self,
        conversation: Option<&EntityId>,
        text: &str,
    ) -> Result<SendOutcome, SendError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SendError::EmptyMessage);
        }
        if !self.gate.is_open() {
            return Err(SendError::NotConfigured(self.gate.message().to_string()));
        }

        let target = conversation.or(self.conversations.active_id()).cloned();
        let id = match target {
            Some(id) => id,
            None => self.conversations.create().await?.id,
        };
        let model = self.config.model();
        let request = {
            let snapshot = self.conversations.get(&id)?;
            self.builder.build_request(snapshot, text, model)
        };
        self.conversations
            .append_message(&id, Message::user(text))
            .await?;

        tracing::debug!(
            conversation_id = %id,
            model = %model,
            messages = request.messages.len(),
            "Sending chat request"
        );
        match self.provider.complete(&request).await {
            Ok(content) => {
                let reply = Message::assistant(content);
                self.conversations
                    .append_message(&id, reply.clone())
                    .await?;
                Ok(SendOutcome::Replied {
                    conversation_id: id,
                    reply,
                })
            }
            Err(error) => {
                tracing::warn!(conversation_id = %id, error = %error, "Chat request failed");
                let notice = Message::assistant(format!("Sorry, an error occurred: {error}"));
                Ok(SendOutcome::Failed {
                    conversation_id: id,
                    error,
                    notice,
                })
            }
        }
    }
}
