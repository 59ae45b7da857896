//! Health checks for the running service
//!
//! The only component checked today is the database pool; the status model
//! leaves room for more.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;

use lifeline_data::database::{self, DatabasePool};

/// Overall system status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemStatus {
    Healthy,
    /// Some components are degraded but requests still succeed
    Degraded,
    Unhealthy,
}

/// Status of one component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthComponent {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemHealth {
    pub status: SystemStatus,
    /// Component name to its status
    pub components: HashMap<String, HealthComponent>,
}

impl SystemHealth {
    /// Derive the overall status from the worst component
    pub fn from_components(components: HashMap<String, HealthComponent>) -> Self {
        let status = if components.values().any(|c| c.status == ComponentStatus::Unhealthy) {
            SystemStatus::Unhealthy
        } else if components.values().any(|c| c.status == ComponentStatus::Degraded) {
            SystemStatus::Degraded
        } else {
            SystemStatus::Healthy
        };
        Self { status, components }
    }
}

#[async_trait]
pub trait HealthServiceTrait: Send + Sync {
    async fn get_system_health(&self) -> SystemHealth;

    /// `Err` carries the reason the database cannot be used
    async fn check_database_status(&self) -> Result<(), String>;
}

/// Health checks backed by the application's database pool
#[derive(Clone)]
pub struct HealthService {
    pool: DatabasePool,
}

impl HealthService {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let database = match self.check_database_status().await {
            Ok(()) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: None,
            },
            Err(e) => {
                warn!("Database health check failed: {}", e);
                HealthComponent {
                    status: ComponentStatus::Unhealthy,
                    details: Some(e),
                }
            }
        };

        SystemHealth::from_components(HashMap::from([("database".to_string(), database)]))
    }

    async fn check_database_status(&self) -> Result<(), String> {
        let pool = self.pool.clone();
        match tokio::task::spawn_blocking(move || database::ping(&pool)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(format!("Database connection error: {}", e)),
            Err(e) => Err(format!("Health check task failed: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifeline_data::database::{create_pool, DatabaseConfig};

    #[tokio::test]
    async fn test_in_memory_database_is_healthy() {
        let pool = create_pool(&DatabaseConfig::in_memory()).unwrap();
        let health = HealthService::new(pool).get_system_health().await;

        assert_eq!(health.status, SystemStatus::Healthy);
        assert_eq!(health.components["database"].status, ComponentStatus::Healthy);
    }

    #[test]
    fn test_worst_component_wins() {
        let components = HashMap::from([
            (
                "database".to_string(),
                HealthComponent {
                    status: ComponentStatus::Healthy,
                    details: None,
                },
            ),
            (
                "storage".to_string(),
                HealthComponent {
                    status: ComponentStatus::Degraded,
                    details: Some("slow disk".to_string()),
                },
            ),
        ]);
        assert_eq!(SystemHealth::from_components(components).status, SystemStatus::Degraded);
    }
}
