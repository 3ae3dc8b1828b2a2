//! Quiz generation driver.
//!
//! Calls an injected [`LlmProvider`] with retries and hands whatever text
//! comes back to the [`QuizAssembler`]. Provider failures never fail a quiz;
//! they only mean more filler.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::assemble::QuizAssembler;
use crate::error::{ProviderError, QuizError};
use crate::model::NormalizedQuestion;
use crate::traits::{quiz_prompt, GenerateRequest, LlmProvider, DEFAULT_MAX_OUTPUT_TOKENS};

/// Upper bound on any single wait between provider attempts.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Configuration for the quiz engine.
#[derive(Debug, Clone)]
pub struct QuizEngineConfig {
    /// Max tokens for generation.
    pub max_output_tokens: u32,
    /// Temperature for generation.
    pub temperature: f64,
    /// Total provider attempts per quiz (at least one is always made).
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub retry_delay: Duration,
    /// Seed for filler answers, for reproducible output.
    pub seed: Option<u64>,
}

impl Default for QuizEngineConfig {
    fn default() -> Self {
        Self {
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            temperature: 0.7,
            max_attempts: 2,
            retry_delay: Duration::from_secs(1),
            seed: None,
        }
    }
}

/// A freshly generated quiz, ready to be persisted.
#[derive(Debug, Clone)]
pub struct GeneratedQuiz {
    pub topic: String,
    pub questions: Vec<NormalizedQuestion>,
    /// Model that wrote the questions, if any call succeeded.
    pub model: Option<String>,
    /// Number of questions authored by the model.
    pub authored: usize,
    /// Number of placeholder questions.
    pub filler: usize,
    /// Wall-clock time spent generating, in milliseconds.
    pub duration_ms: u64,
}

impl GeneratedQuiz {
    /// Wrap assembled questions, counting model-authored vs filler items.
    pub fn new(
        topic: &str,
        questions: Vec<NormalizedQuestion>,
        model: Option<String>,
        duration_ms: u64,
    ) -> Self {
        let filler = questions.iter().filter(|q| q.is_filler()).count();
        Self {
            topic: topic.to_string(),
            authored: questions.len() - filler,
            filler,
            questions,
            model,
            duration_ms,
        }
    }
}

/// The quiz generation driver.
pub struct QuizEngine {
    provider: Arc<dyn LlmProvider>,
    assembler: QuizAssembler,
    config: QuizEngineConfig,
}

impl QuizEngine {
    pub fn new(provider: Arc<dyn LlmProvider>, config: QuizEngineConfig) -> Self {
        let assembler = match config.seed {
            Some(seed) => QuizAssembler::with_seed(seed),
            None => QuizAssembler::new(),
        };
        Self {
            provider,
            assembler,
            config,
        }
    }

    /// Generate a quiz of exactly `total` questions about `topic`.
    ///
    /// Fails only on a blank topic or a negative count.
    pub async fn generate(&self, topic: &str, total: i64) -> Result<GeneratedQuiz> {
        let start = Instant::now();
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(QuizError::InvalidRequest("topic is required".into()).into());
        }
        let total = usize::try_from(total).map_err(|_| {
            QuizError::InvalidRequest(format!("total must not be negative, got {total}"))
        })?;

        if total == 0 {
            return Ok(GeneratedQuiz::new(topic, Vec::new(), None, 0));
        }

        let (raw, model) = match self.fetch_raw(topic, total).await {
            Ok((content, model)) => (content, Some(model)),
            Err(e) => {
                tracing::error!("quiz generation for '{topic}' failed: {e:#}");
                (String::new(), None)
            }
        };

        let questions = self.assembler.assemble_count(&raw, topic, total);
        let quiz = GeneratedQuiz::new(topic, questions, model, start.elapsed().as_millis() as u64);
        tracing::info!(
            authored = quiz.authored,
            filler = quiz.filler,
            "generated {total} questions for '{topic}'"
        );
        Ok(quiz)
    }

    /// Call the provider, retrying transient errors with exponential backoff.
    async fn fetch_raw(&self, topic: &str, total: usize) -> Result<(String, String)> {
        let request = GenerateRequest {
            model: self.provider.model().to_string(),
            prompt: quiz_prompt(topic, total),
            max_output_tokens: self.config.max_output_tokens,
            temperature: self.config.temperature,
        };

        let attempts = self.config.max_attempts.max(1);
        let mut retry_delay = self.config.retry_delay;
        let mut last_error = None;

        for attempt in 1..=attempts {
            if attempt > 1 {
                tokio::time::sleep(retry_delay).await;
                retry_delay = (retry_delay * 2).min(MAX_RETRY_DELAY);
            }

            match self.provider.generate(&request).await {
                Ok(response) if !response.content.trim().is_empty() => {
                    tracing::debug!(
                        latency_ms = response.latency_ms,
                        tokens = response.token_usage.total_tokens,
                        "model replied"
                    );
                    return Ok((response.content, response.model));
                }
                Ok(_) => {
                    tracing::warn!("empty reply from model (attempt {attempt}/{attempts})");
                    last_error = Some(ProviderError::EmptyResponse.into());
                }
                Err(e) => {
                    if let Some(provider_error) = e.downcast_ref::<ProviderError>() {
                        if provider_error.is_permanent() {
                            return Err(e);
                        }
                        if let Some(ms) = provider_error.retry_after_ms() {
                            retry_delay = Duration::from_millis(ms).min(MAX_RETRY_DELAY);
                        }
                    }
                    tracing::warn!("provider error (attempt {attempt}/{attempts}): {e}");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("unknown error")))
    }
}
