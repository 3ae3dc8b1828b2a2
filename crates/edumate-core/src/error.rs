//! Error types for the quiz core and the model API client.
//!
//! `ExtractError` never leaves the assembler; `QuizError` is the only failure
//! a caller of the assembler can observe. `ProviderError` lives here so the
//! generation driver can downcast and classify failures for retry decisions
//! without string matching.

use thiserror::Error;

/// Failures raised while locating structure in raw model output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The model returned nothing usable (empty or whitespace only).
    #[error("empty model output")]
    EmptyInput,

    /// No `[ ... ]` region could be located in the output.
    #[error("no JSON array found in model output")]
    NoStructureFound,
}

/// Contract violations on the assembler's own inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("invalid quiz request: {0}")]
    InvalidRequest(String),
}

/// Errors that can occur when interacting with an LLM provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The model answered with no text (usually a truncated or blocked reply).
    #[error("model returned an empty response")]
    EmptyResponse,
}

impl ProviderError {
    /// Returns `true` if this error is permanent and should not be retried.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ProviderError::AuthenticationFailed(_) | ProviderError::ModelNotFound(_)
        )
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            ProviderError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanent_errors() {
        assert!(ProviderError::AuthenticationFailed("bad key".into()).is_permanent());
        assert!(ProviderError::ModelNotFound("gemini-x".into()).is_permanent());
        assert!(!ProviderError::Timeout(30).is_permanent());
        assert!(!ProviderError::EmptyResponse.is_permanent());
    }

    #[test]
    fn retry_after_only_for_rate_limit() {
        let err = ProviderError::RateLimited {
            retry_after_ms: 5000,
        };
        assert_eq!(err.retry_after_ms(), Some(5000));
        assert_eq!(err.to_string(), "rate limited, retry after 5000ms");
        assert_eq!(ProviderError::NetworkError("reset".into()).retry_after_ms(), None);
    }
}
