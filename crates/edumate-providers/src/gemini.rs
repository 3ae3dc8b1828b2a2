//! Google Gemini API provider implementation.

use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use edumate_core::error::ProviderError;
use edumate_core::traits::{GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, TokenUsage};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Model used when none of the preferred models can be confirmed.
pub const FALLBACK_MODEL: &str = "gemini-1.5-flash";

/// Preferred models, best first.
pub const MODEL_PRIORITY: [&str; 6] = [
    "gemini-2.5-flash",
    "gemini-2.5-pro",
    "gemini-flash-latest",
    "gemini-pro-latest",
    "gemini-1.5-flash",
    "gemini-1.5-pro",
];

/// Gemini API provider bound to one model.
pub struct GeminiProvider {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a provider for a known model without contacting the API.
    pub fn new(api_key: &str, base_url: Option<String>, model: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.to_string(),
            client,
        }
    }

    /// Create a provider and pick its model from `priority`.
    ///
    /// The first priority entry that appears in any listed model name wins.
    /// If listing fails or nothing matches, [`FALLBACK_MODEL`] is used.
    pub async fn connect(api_key: &str, base_url: Option<String>, priority: &[String]) -> Self {
        let mut provider = Self::new(api_key, base_url, FALLBACK_MODEL);
        match provider.list_models().await {
            Ok(available) => {
                provider.model = select_model(priority, &available);
                tracing::info!("using model {}", provider.model);
            }
            Err(e) => {
                tracing::warn!("could not list models, using {FALLBACK_MODEL}: {e:#}");
            }
        }
        provider
    }

    /// Names of the models visible to this API key (e.g. `models/gemini-2.5-flash`).
    #[instrument(skip(self))]
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/v1beta/models", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let response = self.check_status(response).await?;
        let listing: GeminiModelList = response.json().await.map_err(|e| ProviderError::ApiError {
            status: 0,
            message: format!("failed to parse model list: {e}"),
        })?;

        Ok(listing.models.into_iter().map(|m| m.name).collect())
    }

    fn transport_error(&self, e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout(DEFAULT_TIMEOUT_SECS)
        } else {
            ProviderError::NetworkError(e.to_string())
        }
    }

    /// Map non-success statuses to provider errors.
    async fn check_status(
        &self,
        response: reqwest::Response,
    ) -> std::result::Result<reqwest::Response, ProviderError> {
        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return Err(ProviderError::RateLimited {
                retry_after_ms: retry_after,
            });
        }
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::AuthenticationFailed(error_message(body)));
        }
        if status == 404 {
            return Err(ProviderError::ModelNotFound(self.model.clone()));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status,
                message: error_message(body),
            });
        }
        Ok(response)
    }
}

/// Pick the first preferred model contained in any available model name.
pub fn select_model(priority: &[String], available: &[String]) -> String {
    priority
        .iter()
        .find(|preferred| available.iter().any(|name| name.contains(preferred.as_str())))
        .cloned()
        .unwrap_or_else(|| FALLBACK_MODEL.to_string())
}

fn error_message(body: String) -> String {
    serde_json::from_str::<GeminiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiRequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiRequestContent {
    role: String,
    parts: Vec<GeminiRequestPart>,
}

#[derive(Serialize)]
struct GeminiRequestPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: GeminiUsage,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Deserialize)]
struct GeminiModelList {
    #[serde(default)]
    models: Vec<GeminiModel>,
}

#[derive(Deserialize)]
struct GeminiModel {
    name: String,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    message: String,
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let start = Instant::now();
        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        let body = GeminiRequest {
            contents: vec![GeminiRequestContent {
                role: "user".to_string(),
                parts: vec![GeminiRequestPart {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: request.max_output_tokens,
                temperature: request.temperature,
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, model
            ))
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let response = match self.check_status(response).await {
            Err(ProviderError::ModelNotFound(_)) => {
                return Err(ProviderError::ModelNotFound(model).into());
            }
            other => other?,
        };

        let api_response: GeminiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status: 0,
                message: format!("failed to parse response: {e}"),
            })?;

        let latency_ms = start.elapsed().as_millis() as u64;
        let content: String = api_response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default();
        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(ProviderError::EmptyResponse.into());
        }

        let usage = &api_response.usage_metadata;
        Ok(GenerateResponse {
            content,
            model: api_response.model_version.unwrap_or(model),
            token_usage: TokenUsage {
                prompt_tokens: usage.prompt_token_count,
                completion_tokens: usage.candidates_token_count,
                total_tokens: usage.total_token_count,
            },
            latency_ms,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        MODEL_PRIORITY
            .iter()
            .map(|id| ModelInfo {
                id: id.to_string(),
                name: id.replace('-', " "),
                provider: "gemini".into(),
                max_output_tokens: 8192,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(model: &str) -> GenerateRequest {
        GenerateRequest {
            model: model.into(),
            prompt: "Write 2 questions".into(),
            max_output_tokens: 1024,
            temperature: 0.0,
        }
    }

    fn priority() -> Vec<String> {
        MODEL_PRIORITY.iter().map(|m| m.to_string()).collect()
    }

    #[tokio::test]
    async fn successful_generation() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "candidates": [{"content": {"parts": [
                {"text": "[{\"q\": \"1+1?\", "},
                {"text": "\"options\": [\"2\"], \"answer\": \"2\"}]\n"}
            ]}}],
            "usageMetadata": {"promptTokenCount": 40, "candidatesTokenCount": 25, "totalTokenCount": 65}
        });

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("test-key", Some(server.uri()), "gemini-2.5-flash");
        let response = provider.generate(&request("gemini-2.5-flash")).await.unwrap();
        assert!(response.content.starts_with("[{\"q\": \"1+1?\""));
        assert!(response.content.ends_with("}]"));
        assert_eq!(response.model, "gemini-2.5-flash");
        assert_eq!(response.token_usage.prompt_tokens, 40);
        assert_eq!(response.token_usage.total_tokens, 65);
    }

    #[tokio::test]
    async fn empty_request_model_uses_provider_model() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-pro:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "[]"}]}}]
            })))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("k", Some(server.uri()), "gemini-1.5-pro");
        let response = provider.generate(&request("")).await.unwrap();
        assert_eq!(response.content, "[]");
    }

    #[tokio::test]
    async fn authentication_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}
            })))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("bad-key", Some(server.uri()), "gemini-2.5-flash");
        let err = provider.generate(&request("gemini-2.5-flash")).await.unwrap_err();
        assert!(err.to_string().contains("authentication failed: API key not valid"));
        assert!(err.downcast_ref::<ProviderError>().unwrap().is_permanent());
    }

    #[tokio::test]
    async fn rate_limiting() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("test-key", Some(server.uri()), "gemini-2.5-flash");
        let err = provider.generate(&request("gemini-2.5-flash")).await.unwrap_err();
        let provider_err = err.downcast_ref::<ProviderError>().unwrap();
        assert_eq!(provider_err.retry_after_ms(), Some(7000));
    }

    #[tokio::test]
    async fn unknown_model() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("test-key", Some(server.uri()), "gemini-2.5-flash");
        let err = provider.generate(&request("gemini-0")).await.unwrap_err();
        assert!(err.to_string().contains("model not found: gemini-0"));
    }

    #[tokio::test]
    async fn blocked_reply_is_empty_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [],
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("test-key", Some(server.uri()), "gemini-2.5-flash");
        let err = provider.generate(&request("gemini-2.5-flash")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProviderError>(),
            Some(ProviderError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn connect_picks_highest_priority_listed_model() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1beta/models"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [
                    {"name": "models/gemini-1.5-flash"},
                    {"name": "models/gemini-2.5-pro"},
                    {"name": "models/embedding-001"}
                ]
            })))
            .mount(&server)
            .await;

        let provider = GeminiProvider::connect("test-key", Some(server.uri()), &priority()).await;
        assert_eq!(provider.model(), "gemini-2.5-pro");
    }

    #[tokio::test]
    async fn connect_falls_back_when_listing_fails() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1beta/models"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let provider = GeminiProvider::connect("test-key", Some(server.uri()), &priority()).await;
        assert_eq!(provider.model(), FALLBACK_MODEL);
    }

    #[test]
    fn select_model_without_match_uses_fallback() {
        let available = vec!["models/text-bison".to_string()];
        assert_eq!(select_model(&priority(), &available), FALLBACK_MODEL);
        assert_eq!(select_model(&[], &available), FALLBACK_MODEL);
    }
}
