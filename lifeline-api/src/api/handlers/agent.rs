use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::IntoParams;

use lifeline_domain::agent::HealthAgent;

use crate::api::error::ApiError;
use crate::api::extract::{ApiQuery, CurrentUser};
use crate::entities::{
    AnalysisResponse, ChatResponse, ClearedResponse, ErrorResponse, SuggestionResponse, SUCCESS,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ChatParams {
    /// Question for the assistant
    pub query: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SymptomParams {
    /// Free-text description of the symptoms
    pub symptoms: String,
}

/// Analyse the caller's reports, medicines and appointments together
#[utoipa::path(
    post,
    path = "/agent/timeline",
    responses(
        (status = 200, description = "Timeline analysis", body = AnalysisResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Model request failed", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "agent"
)]
#[instrument(skip_all)]
pub async fn timeline(
    State(agent): State<Arc<HealthAgent>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let analysis = agent.analyze_timeline(user.id).await?;
    Ok(Json(AnalysisResponse {
        status: SUCCESS.to_string(),
        analysis,
    }))
}

/// Ask the assistant a question about the caller's records
#[utoipa::path(
    post,
    path = "/agent/chat",
    params(ChatParams),
    responses(
        (status = 200, description = "Assistant answer", body = ChatResponse),
        (status = 400, description = "Missing query", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Agent error", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "agent"
)]
#[instrument(skip_all)]
pub async fn chat(
    State(agent): State<Arc<HealthAgent>>,
    CurrentUser(user): CurrentUser,
    ApiQuery(params): ApiQuery<ChatParams>,
) -> Result<Json<ChatResponse>, ApiError> {
    let reply = agent.chat(user.id, &params.query).await?;
    Ok(Json(ChatResponse {
        status: SUCCESS.to_string(),
        answer: reply.answer,
        memory_items: reply.memory_items,
    }))
}

/// Forget the caller's conversation
#[utoipa::path(
    post,
    path = "/agent/chat/clear",
    responses(
        (status = 200, description = "Memory cleared", body = ClearedResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "agent"
)]
pub async fn clear_chat(State(agent): State<Arc<HealthAgent>>, CurrentUser(user): CurrentUser) -> Json<ClearedResponse> {
    if agent.clear_memory(user.id).await {
        info!("Cleared conversation memory of user {}", user.id);
    }
    Json(ClearedResponse {
        status: SUCCESS.to_string(),
        cleared: true,
    })
}

/// Suggest which doctor to see for a set of symptoms
#[utoipa::path(
    post,
    path = "/agent/suggest-doctor",
    params(SymptomParams),
    responses(
        (status = 200, description = "Suggestion", body = SuggestionResponse),
        (status = 400, description = "Missing symptoms", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Model request failed", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "agent"
)]
#[instrument(skip_all)]
pub async fn suggest_doctor(
    State(agent): State<Arc<HealthAgent>>,
    CurrentUser(user): CurrentUser,
    ApiQuery(params): ApiQuery<SymptomParams>,
) -> Result<Json<SuggestionResponse>, ApiError> {
    let suggestion = agent.suggest_doctor(user.id, &params.symptoms).await?;
    Ok(Json(SuggestionResponse {
        status: SUCCESS.to_string(),
        suggestion,
    }))
}
