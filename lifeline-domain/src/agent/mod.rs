//! Conversational health agent
//!
//! The agent answers questions about the caller's own records. Each chat turn
//! runs a small tool loop: the model replies with a JSON action, either a
//! tool to call or a final answer, and tool results are fed back to it until
//! it answers or the step limit is hit.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use lifeline_data::repository::RepositoryError;

use crate::llm::{strip_code_fences, ChatMessage, GenerationRequest, LanguageModel, LlmError};
use crate::services::ServiceError;

mod memory;
mod tools;

pub use memory::ConversationMemory;
pub use tools::{AgentTools, Tool};

const FINAL_ANSWER: &str = "Final Answer";

/// Errors raised inside a chat turn
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("no final answer after {0} steps")]
    StepLimit(usize),
}

/// One step decided by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentAction {
    pub action: String,
    #[serde(default)]
    pub action_input: Value,
}

impl AgentAction {
    /// `action_input` as plain text
    pub fn input_text(&self) -> String {
        match &self.action_input {
            Value::String(text) => text.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// Parse a model reply into an action, tolerating code fences and chatter
pub fn parse_action(reply: &str) -> Option<AgentAction> {
    let cleaned = strip_code_fences(reply);
    if let Ok(action) = serde_json::from_str::<AgentAction>(cleaned) {
        return Some(action);
    }
    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&cleaned[start..=end]).ok()
}

/// Parse a JSON reply, falling back to `{"raw": text}`
pub fn parse_json_reply(reply: &str) -> Value {
    let text = reply.trim();
    serde_json::from_str(strip_code_fences(text)).unwrap_or_else(|_| json!({ "raw": text }))
}

fn instructions() -> String {
    let tools: Vec<String> = Tool::ALL
        .iter()
        .map(|tool| format!("> {}: {}", tool.name(), tool.description()))
        .collect();
    let names: Vec<&str> = Tool::ALL.iter().map(|tool| tool.name()).collect();

    format!(
        "You are Lifeline's health assistant. You help one patient understand their own \
medical records. You are not a doctor and never give a diagnosis.\n\n\
TOOLS\n-----\nYou can look up the patient's records with these tools:\n\n{}\n\n\
RESPONSE FORMAT\n---------------\nAlways reply with a single JSON object and nothing else.\n\
To use a tool:\n{{\"action\": \"<one of {}>\", \"action_input\": \"<what you are looking for>\"}}\n\
To answer the patient:\n{{\"action\": \"{}\", \"action_input\": \"<your answer>\"}}",
        tools.join("\n"),
        names.join(", "),
        FINAL_ANSWER
    )
}

fn tool_response(tool: &str, observation: &str) -> String {
    format!(
        "TOOL RESPONSE ({})\n---------------\n{}\n\n\
Using this information, reply with the next JSON action. Do not mention the tool by name \
in your final answer.",
        tool, observation
    )
}

/// Result of a chat turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub answer: String,
    /// Messages held in the user's memory after this turn
    pub memory_items: usize,
}

/// Timeline analysis, doctor suggestions and tool-using chat
pub struct HealthAgent {
    tools: AgentTools,
    model: Arc<dyn LanguageModel>,
    memory: ConversationMemory,
    max_steps: usize,
}

impl HealthAgent {
    pub fn new(tools: AgentTools, model: Arc<dyn LanguageModel>, memory: ConversationMemory, max_steps: usize) -> Self {
        Self {
            tools,
            model,
            memory,
            max_steps: max_steps.max(1),
        }
    }

    /// Ask the model for insights over everything on file
    #[instrument(skip(self))]
    pub async fn analyze_timeline(&self, user_id: i64) -> Result<String, ServiceError> {
        let timeline = self.tools.timeline(user_id).await?;
        let prompt = format!(
            "Analyze this patient's complete medical timeline and give insights:\n{}\n",
            timeline
        );

        self.model
            .generate(GenerationRequest::prompt(prompt))
            .await
            .map_err(|e| ServiceError::Model(format!("Gemini request failed: {}", e)))
    }

    /// Suggest specialties, urgency, tests and next steps for the symptoms
    #[instrument(skip(self))]
    pub async fn suggest_doctor(&self, user_id: i64, symptoms: &str) -> Result<Value, ServiceError> {
        let (reports, medicines) =
            futures::try_join!(self.tools.fetch_reports(user_id), self.tools.fetch_medicines(user_id))?;

        let prompt = format!(
            "You are a helpful medical assistant (non-diagnostic; provide suggestions only).\n\
User symptoms: {symptoms}\n\n\
User recent reports (most relevant): {reports}\n\n\
User current/past medicines: {medicines}\n\n\
Tasks:\n\
1) Suggest 1-3 medical specialties the user should consult (e.g. \"Cardiologist\", \"Endocrinologist\").\n\
2) Give an urgency level: low / medium / high, and one sentence why.\n\
3) Recommend up to 3 tests commonly ordered to investigate these symptoms.\n\
4) Give 3 short next steps the user can take.\n\n\
Answer in JSON ONLY with keys: \"specialties\" (list), \"urgency\" (string), \"tests\" (list), \
\"next_steps\" (list), \"explanation\" (short string)."
        );

        let reply = self
            .model
            .generate(GenerationRequest::prompt(prompt))
            .await
            .map_err(|e| ServiceError::Model(format!("Gemini request failed: {}", e)))?;

        Ok(parse_json_reply(&reply))
    }

    /// Answer `query` using the user's memory and record tools
    #[instrument(skip(self, query))]
    pub async fn chat(&self, user_id: i64, query: &str) -> Result<ChatReply, ServiceError> {
        let answer = self
            .run_turn(user_id, query)
            .await
            .map_err(|e| ServiceError::Model(format!("Agent error: {}", e)))?;

        let memory_items = self
            .memory
            .append(user_id, vec![ChatMessage::user(query), ChatMessage::model(answer.clone())])
            .await;

        info!("Agent answered user {} ({} messages in memory)", user_id, memory_items);
        Ok(ChatReply { answer, memory_items })
    }

    /// Forget the user's conversation
    pub async fn clear_memory(&self, user_id: i64) -> bool {
        self.memory.clear(user_id).await
    }

    pub async fn memory_len(&self, user_id: i64) -> usize {
        self.memory.len(user_id).await
    }

    async fn run_turn(&self, user_id: i64, query: &str) -> Result<String, AgentError> {
        let mut messages = vec![
            ChatMessage::user(instructions()),
            ChatMessage::model(format!(
                "{{\"action\": \"{}\", \"action_input\": \"Understood.\"}}",
                FINAL_ANSWER
            )),
        ];
        messages.extend(self.memory.history(user_id).await);
        messages.push(ChatMessage::user(query));

        for step in 1..=self.max_steps {
            let request = GenerationRequest::conversation(messages.clone()).with_temperature(0.0);
            let reply = self.model.generate(request).await?;

            let action = match parse_action(&reply) {
                Some(action) => action,
                None => {
                    debug!("Step {}: reply is not a JSON action, using it as the answer", step);
                    return Ok(reply.trim().to_string());
                }
            };

            if action.action.trim().eq_ignore_ascii_case(FINAL_ANSWER) {
                return Ok(action.input_text());
            }

            let observation = match Tool::from_name(&action.action) {
                Some(tool) => {
                    debug!("Step {}: running {}", step, tool.name());
                    self.tools.run(tool, user_id).await?
                }
                None => {
                    warn!("Step {}: model asked for unknown tool {}", step, action.action);
                    let names: Vec<&str> = Tool::ALL.iter().map(|tool| tool.name()).collect();
                    format!(
                        "{} is not a valid tool, try one of [{}].",
                        action.action,
                        names.join(", ")
                    )
                }
            };

            messages.push(ChatMessage::model(reply));
            messages.push(ChatMessage::user(tool_response(&action.action, &observation)));
        }

        Err(AgentError::StepLimit(self.max_steps))
    }
}
