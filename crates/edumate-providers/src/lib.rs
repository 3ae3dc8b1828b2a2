//! edumate-providers: LLM provider integrations.
//!
//! Implements the `LlmProvider` trait for Google Gemini plus an offline mock,
//! and loads provider settings from `edumate.toml`.

pub mod config;
pub mod gemini;
pub mod mock;

pub use config::{create_provider, load_config, load_config_from, EdumateConfig, ProviderConfig};
pub use edumate_core::error::ProviderError;
