//! Provider configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use edumate_core::engine::QuizEngineConfig;
use edumate_core::model::{ScoreRounding, DEFAULT_TOTAL};
use edumate_core::traits::{LlmProvider, DEFAULT_MAX_OUTPUT_TOKENS};

use crate::gemini::{GeminiProvider, MODEL_PRIORITY};
use crate::mock::MockProvider;

/// Configuration for a single LLM provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        /// Fixed model; skips model discovery when set.
        #[serde(default)]
        model: Option<String>,
        /// Preferred models for discovery, best first.
        #[serde(default = "default_model_priority")]
        model_priority: Vec<String>,
    },
    Mock {
        /// Raw reply returned for every prompt.
        #[serde(default)]
        response: String,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
                model,
                model_priority,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("model", model)
                .field("model_priority", model_priority)
                .finish(),
            ProviderConfig::Mock { response } => f
                .debug_struct("Mock")
                .field("response_len", &response.len())
                .finish(),
        }
    }
}

fn default_model_priority() -> Vec<String> {
    MODEL_PRIORITY.iter().map(|m| m.to_string()).collect()
}

/// Top-level edumate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdumateConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider used for generation.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Question count when none is requested.
    #[serde(default = "default_total")]
    pub default_total: usize,
    /// Output budget per generation call.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Provider attempts per quiz.
    #[serde(default = "default_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// How grading turns a fraction into a percentage.
    #[serde(default)]
    pub score_rounding: ScoreRounding,
    /// Directory quiz records are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_total() -> usize {
    DEFAULT_TOTAL
}
fn default_max_output_tokens() -> u32 {
    DEFAULT_MAX_OUTPUT_TOKENS
}
fn default_temperature() -> f64 {
    0.7
}
fn default_attempts() -> u32 {
    2
}
fn default_retry_delay() -> u64 {
    1000
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./edumate-quizzes")
}

impl Default for EdumateConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_total: default_total(),
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
            max_attempts: default_attempts(),
            retry_delay_ms: default_retry_delay(),
            score_rounding: ScoreRounding::default(),
            output_dir: default_output_dir(),
        }
    }
}

impl EdumateConfig {
    /// Engine settings derived from this configuration.
    pub fn engine_config(&self, seed: Option<u64>) -> QuizEngineConfig {
        QuizEngineConfig {
            max_output_tokens: self.max_output_tokens,
            temperature: self.temperature,
            max_attempts: self.max_attempts,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            seed,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Gemini {
            api_key,
            base_url,
            model,
            model_priority,
        } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            model: model.as_ref().map(|m| resolve_env_vars(m)),
            model_priority: model_priority.clone(),
        },
        ProviderConfig::Mock { response } => ProviderConfig::Mock {
            response: response.clone(),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `edumate.toml` in the current directory
/// 2. `~/.config/edumate/config.toml`
///
/// Environment variable overrides: `EDUMATE_GEMINI_KEY`, then `GEMINI_API_KEY`.
pub fn load_config() -> Result<EdumateConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<EdumateConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("edumate.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => EdumateConfig::default(),
    };

    // Apply env var overrides
    let env_key = std::env::var("EDUMATE_GEMINI_KEY")
        .or_else(|_| std::env::var("GEMINI_API_KEY"))
        .ok()
        .filter(|k| !k.is_empty());
    if let Some(key) = env_key {
        let entry = config
            .providers
            .entry("gemini".into())
            .or_insert(ProviderConfig::Gemini {
                api_key: String::new(),
                base_url: None,
                model: None,
                model_priority: default_model_priority(),
            });
        if let ProviderConfig::Gemini { api_key, .. } = entry {
            *api_key = key;
        }
    }

    // Resolve env vars in all provider configs
    let resolved: HashMap<String, ProviderConfig> = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();
    config.providers = resolved;

    Ok(config)
}

/// Parse a TOML configuration string.
pub fn parse_config(content: &str) -> Result<EdumateConfig> {
    let config: EdumateConfig = toml::from_str(content)?;
    anyhow::ensure!(config.max_attempts >= 1, "max_attempts must be at least 1");
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("edumate"))
}

/// Create a provider instance from its configuration.
///
/// Gemini providers without a fixed model run model discovery here.
pub async fn create_provider(name: &str, config: &ProviderConfig) -> Result<Arc<dyn LlmProvider>> {
    match config {
        ProviderConfig::Gemini {
            api_key,
            base_url,
            model,
            model_priority,
        } => {
            anyhow::ensure!(
                !api_key.trim().is_empty(),
                "no API key configured for provider '{name}'"
            );
            let provider = match model {
                Some(model) => GeminiProvider::new(api_key, base_url.clone(), model),
                None => GeminiProvider::connect(api_key, base_url.clone(), model_priority).await,
            };
            Ok(Arc::new(provider))
        }
        ProviderConfig::Mock { response } => {
            Ok(Arc::new(MockProvider::with_fixed_response(response)))
        }
    }
}
