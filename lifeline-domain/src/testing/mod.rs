// Testing utilities and test doubles for the domain layer
// This module is only available when the "mock" feature is enabled

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::health::{ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth};
use crate::llm::{GenerationRequest, LanguageModel, LlmError};
use crate::ocr::{OcrError, TextExtractor};

pub use crate::llm::MockLanguageModel;
pub use crate::ocr::MockTextExtractor;

/// Language model that answers from a queue of canned replies
///
/// Every request is recorded so tests can inspect the prompts sent. Once the
/// queue is empty the model fails with an API error.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.push(Ok(reply.into()));
        self
    }

    /// Queue a failed call
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.push(Err(message.into()));
        self
    }

    pub fn push(&self, reply: Result<String, String>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, request: GenerationRequest) -> Result<String, LlmError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        let next = self.replies.lock().ok().and_then(|mut replies| replies.pop_front());
        match next {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(LlmError::ApiError(message)),
            None => Err(LlmError::ApiError("no scripted reply left".to_string())),
        }
    }
}

/// Text extractor that returns the same text for every image
///
/// Non-image uploads are rejected the way the real extractor rejects them.
#[derive(Debug, Clone)]
pub struct FixedTextExtractor {
    text: String,
}

impl FixedTextExtractor {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl TextExtractor for FixedTextExtractor {
    async fn extract_text(&self, bytes: Vec<u8>) -> Result<String, OcrError> {
        if !crate::ocr::is_image(&bytes) {
            return Err(OcrError::UnsupportedFormat);
        }
        Ok(self.text.clone())
    }
}

/// Health service with a configurable database status
#[derive(Debug, Default)]
pub struct MockHealthService {
    database_error: Option<String>,
    components: HashMap<String, HealthComponent>,
}

impl MockHealthService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unhealthy_database(mut self, reason: impl Into<String>) -> Self {
        self.database_error = Some(reason.into());
        self
    }

    /// Add a custom component with a specific status
    pub fn with_component(mut self, name: &str, status: ComponentStatus, details: Option<String>) -> Self {
        self.components
            .insert(name.to_string(), HealthComponent { status, details });
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = self.components.clone();
        let database = match &self.database_error {
            None => HealthComponent {
                status: ComponentStatus::Healthy,
                details: None,
            },
            Some(reason) => HealthComponent {
                status: ComponentStatus::Unhealthy,
                details: Some(reason.clone()),
            },
        };
        components.insert("database".to_string(), database);
        SystemHealth::from_components(components)
    }

    async fn check_database_status(&self) -> Result<(), String> {
        match &self.database_error {
            None => Ok(()),
            Some(reason) => Err(reason.clone()),
        }
    }
}
