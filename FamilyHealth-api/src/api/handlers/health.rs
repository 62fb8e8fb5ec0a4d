use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use axum::{http::StatusCode, response::IntoResponse, Extension, Json};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use family_health_domain::health::{
    self, ComponentStatus as DomainComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth,
    SystemStatus,
};

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// "ok", "degraded" or "error"
    pub status: String,
    /// Application version from the Cargo manifest
    pub version: String,
    /// Unix timestamp of the response
    pub timestamp: u64,
    /// Uptime of the service in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    /// Status per component, keyed by component name
    pub components: BTreeMap<String, ComponentHealthStatus>,
    pub environment: String,
}

/// Health status for an individual component
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealthStatus {
    /// "ok", "degraded" or "error"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

static SERVER_START_TIME: OnceCell<u64> = OnceCell::new();

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Record the server start time used for uptime reporting; later calls keep the first value
pub fn initialize_server_start_time() {
    SERVER_START_TIME.get_or_init(unix_now);
}

impl From<&HealthComponent> for ComponentHealthStatus {
    fn from(component: &HealthComponent) -> Self {
        let status = match component.status {
            DomainComponentStatus::Healthy => "ok",
            DomainComponentStatus::Degraded => "degraded",
            DomainComponentStatus::Unhealthy => "error",
        };

        Self {
            status: status.to_string(),
            message: component.details.clone(),
        }
    }
}

/// Report overall and per-component health; 200 healthy, 503 degraded, 500 unhealthy
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "All components healthy", body = HealthResponse),
        (status = 500, description = "A component is down", body = HealthResponse),
        (status = 503, description = "Running with reduced capability", body = HealthResponse)
    ),
    tag = "health"
)]
#[instrument(skip(health_service))]
pub async fn health_check(
    Extension(health_service): Extension<Arc<dyn HealthServiceTrait>>,
) -> impl IntoResponse {
    let SystemHealth { status, components } = health_service.get_system_health().await;

    let (status_code, label) = match status {
        SystemStatus::Healthy => (StatusCode::OK, "ok"),
        SystemStatus::Degraded => (StatusCode::SERVICE_UNAVAILABLE, "degraded"),
        SystemStatus::Unhealthy => (StatusCode::INTERNAL_SERVER_ERROR, "error"),
    };
    info!("Health check: {}", label);

    let now = unix_now();
    let response = HealthResponse {
        status: label.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now,
        uptime: SERVER_START_TIME.get().map(|start| now.saturating_sub(*start)),
        components: components
            .iter()
            .map(|(name, component)| (name.clone(), ComponentHealthStatus::from(component)))
            .collect(),
        environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
    };

    (status_code, Json(response))
}

/// Health of the API and its database
#[derive(Debug, Default)]
pub struct HealthService;

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let database = health::database_component(self.check_database_status().await);

        let components = vec![
            ("database".to_string(), database),
            ("api".to_string(), HealthComponent {
                status: DomainComponentStatus::Healthy,
                details: None,
            }),
        ]
        .into_iter()
        .collect();

        SystemHealth::from_components(components)
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        health::check_database_status().await
    }
}

/// Health service used by the running application
pub fn create_health_service() -> Arc<dyn HealthServiceTrait> {
    Arc::new(HealthService)
}
