//! Language model access
//!
//! Services talk to a [`LanguageModel`]; [`GeminiClient`] is the production
//! implementation backed by the Gemini `generateContent` REST endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod gemini;

pub use gemini::{GeminiClient, GeminiConfig};

/// Errors from the language model
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    /// The API answered with a non-success status
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Response parse error: {0}")]
    ResponseParseError(String),
}

/// Who authored a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One turn of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// A generation call: the conversation so far plus sampling options
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub messages: Vec<ChatMessage>,
    /// Overrides the client's default temperature when set
    pub temperature: Option<f32>,
}

impl GenerationRequest {
    /// A single-prompt request
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::user(text)],
            temperature: None,
        }
    }

    pub fn conversation(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Text of the last message, usually the prompt being answered
    pub fn last_text(&self) -> &str {
        self.messages.last().map(|m| m.text.as_str()).unwrap_or("")
    }
}

/// Text generation backend
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate the next model message for `request`
    async fn generate(&self, request: GenerationRequest) -> Result<String, LlmError>;
}

/// Remove a surrounding markdown code fence, e.g. "```json ... ```"
pub fn strip_code_fences(text: &str) -> &str {
    text.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```JSON")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\nplain\n```"), "plain");
        assert_eq!(strip_code_fences("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_request_builders() {
        let request = GenerationRequest::prompt("hello").with_temperature(0.0);
        assert_eq!(request.messages, vec![ChatMessage::user("hello")]);
        assert_eq!(request.temperature, Some(0.0));
        assert_eq!(request.last_text(), "hello");
    }
}
