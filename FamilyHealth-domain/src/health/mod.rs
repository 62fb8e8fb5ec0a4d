//! Domain layer health check functionality
//! This module provides health check services for the application

use std::collections::HashMap;

use async_trait::async_trait;
use family_health_data::database;
use tracing::warn;

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    Healthy,
    /// Working with reduced guarantees, such as the in-memory store
    Degraded,
    Unhealthy,
}

/// A health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    pub status: ComponentStatus,
    pub details: Option<String>,
}

/// Overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub status: SystemStatus,
    /// Component name to health
    pub components: HashMap<String, HealthComponent>,
}

impl SystemHealth {
    /// Combine components; the worst component decides the overall status
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

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Check the status of the database.
    ///
    /// `Ok(true)` when the database is usable, `Ok(false)` when records fall
    /// back to the in-memory store, `Err` when the database fails.
    async fn check_database_status(&self) -> Result<bool, String>;
}

/// Check whether the database pool is configured and answering
pub async fn check_database_status() -> Result<bool, String> {
    if database::get_db_pool().is_err() {
        return Ok(false);
    }

    match database::get_connection_info() {
        Some(info) if info.contains("healthy") => Ok(true),
        Some(info) => {
            warn!("Database check failed: {}", info);
            Err(info)
        },
        None => Ok(false),
    }
}

/// Health component for a database check result
pub fn database_component(status: Result<bool, String>) -> HealthComponent {
    match status {
        Ok(true) => HealthComponent {
            status: ComponentStatus::Healthy,
            details: database::get_connection_info(),
        },
        Ok(false) => HealthComponent {
            status: ComponentStatus::Degraded,
            details: Some("Database not initialized; records are kept in memory".to_string()),
        },
        Err(e) => HealthComponent {
            status: ComponentStatus::Unhealthy,
            details: Some(e),
        },
    }
}

/// Get overall system health
pub async fn get_system_health() -> SystemHealth {
    let components = vec![("database".to_string(), database_component(check_database_status().await))]
        .into_iter()
        .collect();

    SystemHealth::from_components(components)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_system_health() {
        let health = get_system_health().await;
        // Status depends on whether another test initialized the pool
        assert!(health.components.contains_key("database"));
    }

    #[test]
    fn test_database_component_mapping() {
        assert_eq!(database_component(Ok(false)).status, ComponentStatus::Degraded);

        let failed = database_component(Err("disk I/O error".to_string()));
        assert_eq!(failed.status, ComponentStatus::Unhealthy);
        assert_eq!(failed.details.as_deref(), Some("disk I/O error"));
    }

    #[test]
    fn test_worst_component_wins() {
        let mut components = HashMap::new();
        components.insert("api".to_string(), HealthComponent { status: ComponentStatus::Healthy, details: None });
        components.insert("database".to_string(), HealthComponent { status: ComponentStatus::Degraded, details: None });
        assert_eq!(SystemHealth::from_components(components.clone()).status, SystemStatus::Degraded);

        components.insert("cache".to_string(), HealthComponent { status: ComponentStatus::Unhealthy, details: None });
        assert_eq!(SystemHealth::from_components(components).status, SystemStatus::Unhealthy);
    }
}
