use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::{ChatMessage, GenerationRequest, LanguageModel, LlmError, Role};

/// Gemini API configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Model to use (e.g. "gemini-pro")
    pub model: String,
    /// API base URL, without a trailing slash
    pub api_base: String,
    pub max_tokens: Option<u32>,
    /// Default temperature (0.0 to 1.0)
    pub temperature: Option<f32>,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key_set", &!self.api_key.is_empty())
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "gemini-pro".to_string(),
            api_base: "https://generativelanguage.googleapis.com/v1".to_string(),
            max_tokens: None,
            temperature: None,
            timeout_ms: 30_000,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature.clamp(0.0, 1.0));
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self::new("")
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

impl From<&ChatMessage> for Content {
    fn from(message: &ChatMessage) -> Self {
        let role = match message.role {
            Role::User => "user",
            Role::Model => "model",
        };
        Self {
            parts: vec![Part {
                text: message.text.clone(),
            }],
            role: Some(role.to_string()),
        }
    }
}

/// Gemini implementation of [`LanguageModel`]
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| LlmError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn api_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.config.api_base, self.config.model)
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, LlmError> {
        if self.config.api_key.is_empty() {
            return Err(LlmError::ConfigError("GEMINI_API_KEY is not set".to_string()));
        }

        let start_time = Instant::now();
        let body = ContentRequest {
            contents: request.messages.iter().map(Content::from).collect(),
            generation_config: Some(GenerationConfig {
                temperature: request.temperature.or(self.config.temperature),
                max_output_tokens: self.config.max_tokens,
            }),
        };

        debug!(
            "Calling Gemini model {} with {} message(s)",
            self.config.model,
            body.contents.len()
        );

        let response = self
            .client
            .post(self.api_url())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Gemini returned {}: {}", status, error_text);
            return Err(LlmError::ApiError(format!("Gemini API error {}: {}", status, error_text)));
        }

        let content: ContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ResponseParseError(format!("Failed to parse response: {}", e)))?;

        let text = content
            .candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| &c.parts)
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        if text.is_empty() {
            let reason = content
                .candidates
                .first()
                .and_then(|c| c.finish_reason.clone())
                .unwrap_or_else(|| "no candidates".to_string());
            return Err(LlmError::ResponseParseError(format!("No content in response ({})", reason)));
        }

        info!(
            "Gemini generation finished in {}ms",
            start_time.elapsed().as_millis()
        );
        Ok(text)
    }
}
