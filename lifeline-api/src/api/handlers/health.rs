use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::ToSchema;

use lifeline_domain::health::{ComponentStatus, HealthComponent, HealthServiceTrait, SystemStatus};

use crate::entities::{RootResponse, ROOT_MESSAGE};

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// "ok", "degraded" or "error"
    pub status: String,
    /// Crate version
    pub version: String,
    /// Unix time the response was generated
    pub timestamp: u64,
    /// Seconds since the server started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    pub components: Components,
    pub environment: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Components {
    pub database: ComponentHealth,
    /// Anything beyond the database, keyed by component name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&HealthComponent> for ComponentHealth {
    fn from(component: &HealthComponent) -> Self {
        Self {
            status: component_status(component.status).to_string(),
            message: component.details.clone(),
        }
    }
}

static SERVER_START_TIME: OnceCell<u64> = OnceCell::new();

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Record the server start time; later calls keep the first value
pub fn initialize_server_start_time() {
    let _ = SERVER_START_TIME.set(unix_now());
}

fn component_status(status: ComponentStatus) -> &'static str {
    match status {
        ComponentStatus::Healthy => "ok",
        ComponentStatus::Degraded => "degraded",
        ComponentStatus::Unhealthy => "error",
    }
}

/// Liveness message
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Server is up", body = RootResponse)),
    tag = "health"
)]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        msg: ROOT_MESSAGE.to_string(),
    })
}

/// Health check with database status and uptime
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API is healthy", body = HealthResponse),
        (status = 503, description = "API is degraded", body = HealthResponse),
        (status = 500, description = "API is not healthy", body = HealthResponse)
    ),
    tag = "health"
)]
#[instrument(skip_all)]
pub async fn health_check(State(health): State<Arc<dyn HealthServiceTrait>>) -> impl IntoResponse {
    let now = unix_now();
    let system = health.get_system_health().await;

    let database = system
        .components
        .get("database")
        .map(ComponentHealth::from)
        .unwrap_or(ComponentHealth {
            status: "ok".to_string(),
            message: None,
        });

    let additional: serde_json::Map<String, serde_json::Value> = system
        .components
        .iter()
        .filter(|(name, _)| name.as_str() != "database")
        .map(|(name, component)| {
            let value = serde_json::to_value(ComponentHealth::from(component)).unwrap_or_default();
            (name.clone(), value)
        })
        .collect();

    let (status, code) = match system.status {
        SystemStatus::Healthy => ("ok", StatusCode::OK),
        SystemStatus::Degraded => ("degraded", StatusCode::SERVICE_UNAVAILABLE),
        SystemStatus::Unhealthy => ("error", StatusCode::INTERNAL_SERVER_ERROR),
    };
    debug!("Health check: {}", status);

    let response = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now,
        uptime: SERVER_START_TIME.get().map(|start| now.saturating_sub(*start)),
        components: Components {
            database,
            additional: (!additional.is_empty()).then(|| additional.into()),
        },
        environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
    };

    (code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifeline_domain::testing::MockHealthService;

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_healthy_service_reports_ok() {
        initialize_server_start_time();
        let service: Arc<dyn HealthServiceTrait> = Arc::new(MockHealthService::new());

        let response = health_check(State(service)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["components"]["database"]["status"], "ok");
        assert!(body["uptime"].is_u64());
    }

    #[tokio::test]
    async fn test_unhealthy_database_reports_error() {
        let service: Arc<dyn HealthServiceTrait> =
            Arc::new(MockHealthService::new().with_unhealthy_database("Database connection failed"));

        let response = health_check(State(service)).await.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["components"]["database"]["message"], "Database connection failed");
    }

    #[tokio::test]
    async fn test_degraded_component_is_listed() {
        let service: Arc<dyn HealthServiceTrait> = Arc::new(MockHealthService::new().with_component(
            "ocr",
            ComponentStatus::Degraded,
            Some("tesseract missing".to_string()),
        ));

        let response = health_check(State(service)).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body_json(response).await;
        assert_eq!(body["components"]["additional"]["ocr"]["status"], "degraded");
    }
}
