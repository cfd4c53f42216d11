//! Chat provider reached through the proxy's `/api/check` and `/api/chat`.
//!
//! The proxy forwards to an OpenAI-compatible chat completions endpoint and
//! holds the credentials. Errors come back as `{ "error": { "message" } }`
//! and are passed through verbatim.

use std::time::Duration;

use quill_core::llm::ChatProvider;
use quill_observe::genai_attrs;
use quill_types::config::ModelFamily;
use quill_types::error::LlmError;
use quill_types::llm::{ChatCompletionBody, ChatRequest, ErrorEnvelope, ProviderStatus};
use reqwest::StatusCode;
use tracing::Instrument;

use super::join_url;

pub struct ProxyChatProvider {
    client: reqwest::Client,
    base_url: String,
    check_timeout: Duration,
}

impl ProxyChatProvider {
    /// `request_timeout` bounds completions; `check_timeout` bounds the
    /// status check.
    pub fn new(
        base_url: impl Into<String>,
        request_timeout: Duration,
        check_timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| LlmError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            check_timeout,
        })
    }
}

fn provider_name(family: ModelFamily) -> &'static str {
    match family {
        ModelFamily::Qwen => genai_attrs::PROVIDER_DASHSCOPE,
        ModelFamily::DeepSeek => genai_attrs::PROVIDER_DEEPSEEK,
    }
}

/// Map a non-2xx answer to an error, keeping the proxy's message verbatim.
///
/// 401/403 and messages naming a missing API key are configuration errors;
/// everything else is transport.
fn classify_failure(status: StatusCode, body: &str) -> LlmError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|env| env.error.message)
        .unwrap_or_else(|| format!("HTTP {status}: {body}"));

    let missing_key = message.contains("API_KEY") || message.contains("API Key");
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Configuration(message),
        _ if missing_key => LlmError::Configuration(message),
        _ => LlmError::Transport(message),
    }
}

impl ChatProvider for ProxyChatProvider {
    async fn check(&self) -> Result<ProviderStatus, LlmError> {
        let url = join_url(&self.base_url, "/api/check");
        let response = self
            .client
            .get(&url)
            .timeout(self.check_timeout)
            .send()
            .await
            .map_err(|e| LlmError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }
        response
            .json::<ProviderStatus>()
            .await
            .map_err(|e| LlmError::Format(format!("failed to parse status: {e}")))
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let span = tracing::info_span!(
            "chat",
            { genai_attrs::GEN_AI_OPERATION_NAME } = genai_attrs::OP_CHAT,
            { genai_attrs::GEN_AI_PROVIDER_NAME } = provider_name(request.model.family()),
            { genai_attrs::GEN_AI_REQUEST_MODEL } = request.model.as_str(),
            { genai_attrs::GEN_AI_REQUEST_TEMPERATURE } = request.temperature,
            { genai_attrs::GEN_AI_REQUEST_MAX_TOKENS } = request.max_tokens,
            { genai_attrs::ERROR_TYPE } = tracing::field::Empty,
        );

        let result = async {
            let url = join_url(&self.base_url, "/api/chat");
            let response = self
                .client
                .post(&url)
                .json(request)
                .send()
                .await
                .map_err(|e| LlmError::Transport(format!("HTTP request failed: {e}")))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| LlmError::Transport(format!("failed to read response: {e}")))?;
            if !status.is_success() {
                return Err(classify_failure(status, &body));
            }

            // A 2xx can still carry an error envelope.
            if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
                let message = envelope
                    .error
                    .message
                    .unwrap_or_else(|| "request failed".to_string());
                return Err(LlmError::Transport(message));
            }

            let completion: ChatCompletionBody = serde_json::from_str(&body)
                .map_err(|e| LlmError::Format(format!("failed to parse response: {e}")))?;
            completion
                .first_content()
                .map(str::to_string)
                .ok_or_else(|| LlmError::Format("response has no choices[0].message".to_string()))
        }
        .instrument(span.clone())
        .await;

        if let Err(e) = &result {
            let kind = match e {
                LlmError::Transport(_) => "transport",
                LlmError::Format(_) => "format",
                LlmError::Configuration(_) => "configuration",
            };
            span.record(genai_attrs::ERROR_TYPE, kind);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use quill_types::chat::Message;
    use quill_types::config::ModelId;
    use serde_json::json;

    fn provider(server: &mockito::ServerGuard) -> ProxyChatProvider {
        ProxyChatProvider::new(server.url(), Duration::from_secs(5), Duration::from_secs(2)).unwrap()
    }

    fn request() -> ChatRequest {
        ChatRequest {
            model: ModelId::QwenTurbo,
            messages: vec![Message::system("be brief"), Message::user("hi")],
            temperature: 0.7,
            max_tokens: 1500,
        }
    }

    #[tokio::test]
    async fn test_check_parses_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/check")
            .with_status(200)
            .with_body(r#"{"configured":false,"message":"DASHSCOPE_API_KEY is not set"}"#)
            .create_async()
            .await;

        let status = provider(&server).check().await.unwrap();
        assert!(!status.configured);
        assert_eq!(status.message, "DASHSCOPE_API_KEY is not set");
    }

    #[tokio::test]
    async fn test_check_unreachable() {
        let provider = ProxyChatProvider::new(
            "http://127.0.0.1:9",
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(matches!(provider.check().await, Err(LlmError::Transport(_))));
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_body(Matcher::PartialJson(json!({
                "model": "qwen-turbo",
                "temperature": 0.7,
                "max_tokens": 1500,
                "messages": [{"role": "system", "content": "be brief"}, {"role": "user", "content": "hi"}],
            })))
            .with_status(200)
            .with_body(r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"hello!"}}]}"#)
            .create_async()
            .await;

        let reply = provider(&server).complete(&request()).await.unwrap();
        assert_eq!(reply, "hello!");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_missing_message_is_format_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let err = provider(&server).complete(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Format(_)));
    }

    #[tokio::test]
    async fn test_complete_error_envelope_is_passed_through() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/chat")
            .with_status(502)
            .with_body(r#"{"error":{"message":"upstream said no","code":502}}"#)
            .create_async()
            .await;

        let err = provider(&server).complete(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Transport(ref m) if m == "upstream said no"));
    }

    #[tokio::test]
    async fn test_complete_missing_key_is_configuration_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/chat")
            .with_status(500)
            .with_body(r#"{"error":{"message":"DASHSCOPE_API_KEY is not set","code":500}}"#)
            .create_async()
            .await;

        let err = provider(&server).complete(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Configuration(ref m) if m == "DASHSCOPE_API_KEY is not set"));
    }

    #[tokio::test]
    async fn test_complete_error_in_success_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_body(r#"{"error":{"message":"quota exceeded"}}"#)
            .create_async()
            .await;

        let err = provider(&server).complete(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Transport(ref m) if m == "quota exceeded"));
    }

    #[test]
    fn test_provider_name_follows_family() {
        assert_eq!(provider_name(ModelFamily::Qwen), "dashscope");
        assert_eq!(provider_name(ModelFamily::DeepSeek), "deepseek");
    }
}
