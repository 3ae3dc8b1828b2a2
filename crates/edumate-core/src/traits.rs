//! Provider trait definitions and the quiz generation prompt.
//!
//! The async trait is implemented by the `edumate-providers` crate. The
//! core itself never calls a model; it only consumes the text a provider
//! returns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LLM Provider trait
// ---------------------------------------------------------------------------

/// Trait for LLM backends that write quiz questions.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g. "gemini").
    fn name(&self) -> &str;

    /// The model this provider was initialized with.
    fn model(&self) -> &str;

    /// Send a prompt and return the raw reply text.
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse>;

    /// List models known to this provider.
    fn available_models(&self) -> Vec<ModelInfo>;
}

/// Request to generate text from an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "gemini-2.5-flash").
    pub model: String,
    /// The full prompt.
    pub prompt: String,
    /// Maximum tokens to generate.
    pub max_output_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

/// Response from an LLM generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The raw reply text, unmodified.
    pub content: String,
    /// Model that actually generated the response.
    pub model: String,
    /// Token usage.
    pub token_usage: TokenUsage,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Token accounting reported by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Information about an available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Human-readable model name.
    pub name: String,
    /// Provider name.
    pub provider: String,
    /// Maximum output tokens the model accepts.
    pub max_output_tokens: u32,
}

// ---------------------------------------------------------------------------
// Quiz prompt
// ---------------------------------------------------------------------------

/// Output budget for a quiz request; long quizzes need the room.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;

/// Build the prompt asking a model for `total` questions about `topic`.
pub fn quiz_prompt(topic: &str, total: usize) -> String {
    format!(
        "Write {total} multiple-choice questions about the topic '{topic}'.\n\
         Format them as a valid JSON array like this:\n\
         [\n  {{\"q\": \"Question...\", \"options\": [\"A\", \"B\", \"C\", \"D\"], \"answer\": \"A\"}}\n]\n\
         Do not include explanations, code fences, or markdown such as ```json. \
         Make sure the JSON is complete and properly closed."
    )
}
