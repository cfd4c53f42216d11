//! OpenTelemetry GenAI semantic-convention attribute names.
//!
//! Used as constant field names in provider spans:
//! `tracing::info_span!("chat", { GEN_AI_REQUEST_MODEL } = model)`.

/// The name of the operation being performed.
pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";

/// The GenAI provider the request is routed to ("dashscope", "deepseek").
pub const GEN_AI_PROVIDER_NAME: &str = "gen_ai.provider.name";

pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";
pub const GEN_AI_REQUEST_TEMPERATURE: &str = "gen_ai.request.temperature";
pub const GEN_AI_REQUEST_MAX_TOKENS: &str = "gen_ai.request.max_tokens";

/// Error class recorded when the call fails.
pub const ERROR_TYPE: &str = "error.type";

// --- Operation name values ---

/// Chat completion operation.
pub const OP_CHAT: &str = "chat";

// --- Provider name values ---

/// Qwen models, served through DashScope's OpenAI-compatible endpoint.
pub const PROVIDER_DASHSCOPE: &str = "dashscope";

pub const PROVIDER_DEEPSEEK: &str = "deepseek";
