// Testing utilities and mock implementations for the domain layer
// This module is only available in tests or with the "mock" feature

// Re-export the failing store client from the data layer
pub use family_health_data::repository::tests::FailingTableClient;

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::entities::{Activity, ActivityOutcome, GamificationProfile};
use crate::health::{ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth};
use crate::services::gamification::{level_for, points_for, points_to_next_level, GamificationServiceTrait};
use crate::services::ServiceError;

/// Gamification service that remembers the activities it was asked to record
#[derive(Debug, Default)]
pub struct MockGamificationService {
    recorded: Mutex<Vec<Activity>>,
    should_fail: bool,
}

impl MockGamificationService {
    /// Create a mock that accepts every activity
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock to fail every call
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Activities recorded so far, in order
    pub fn recorded(&self) -> Vec<Activity> {
        self.recorded.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn total_points(recorded: &[Activity]) -> u32 {
        recorded.iter().map(|a| points_for(*a)).sum()
    }
}

#[async_trait]
impl GamificationServiceTrait for MockGamificationService {
    async fn record_activity(&self, _user_id: &str, activity: Activity, _date: NaiveDate) -> Result<ActivityOutcome, ServiceError> {
        if self.should_fail {
            return Err(ServiceError::Repository(
                "Repository error - mock is configured to fail".to_string(),
            ));
        }

        let mut recorded = self.recorded
            .lock()
            .map_err(|e| ServiceError::Repository(e.to_string()))?;
        recorded.push(activity);
        let total = Self::total_points(&recorded);

        Ok(ActivityOutcome {
            activity,
            points_awarded: points_for(activity),
            total_points: total,
            level: level_for(total),
            leveled_up: level_for(total) > level_for(total - points_for(activity)),
            current_streak: 1,
            longest_streak: 1,
            new_badges: vec![],
        })
    }

    async fn profile(&self, user_id: &str) -> Result<GamificationProfile, ServiceError> {
        if self.should_fail {
            return Err(ServiceError::Repository(
                "Repository error - mock is configured to fail".to_string(),
            ));
        }

        let recorded = self.recorded();
        let total = Self::total_points(&recorded);
        let mut activity_counts = BTreeMap::new();
        for activity in &recorded {
            *activity_counts.entry(activity.as_str().to_string()).or_insert(0) += 1;
        }

        Ok(GamificationProfile {
            user_id: user_id.to_string(),
            total_points: total,
            level: level_for(total),
            points_to_next_level: points_to_next_level(total),
            activity_counts,
            streaks: vec![],
            badges: vec![],
        })
    }
}

/// Mock implementation of health services for testing system health
#[derive(Debug)]
pub struct MockHealthService {
    database_status: ComponentStatus,
    components: HashMap<String, HealthComponent>,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthService {
    /// Create a mock health service with all components healthy
    pub fn new() -> Self {
        Self {
            database_status: ComponentStatus::Healthy,
            components: HashMap::new(),
        }
    }

    /// Report the database as running on the in-memory fallback
    pub fn with_degraded_database(mut self) -> Self {
        self.database_status = ComponentStatus::Degraded;
        self
    }

    /// Report the database as failing
    pub fn with_unhealthy_database(mut self) -> Self {
        self.database_status = ComponentStatus::Unhealthy;
        self
    }

    /// Add a custom component with a specific status
    pub fn with_component(mut self, name: &str, status: ComponentStatus, details: Option<String>) -> Self {
        self.components.insert(name.to_string(), HealthComponent { status, details });
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = self.components.clone();
        components.insert(
            "database".to_string(),
            HealthComponent {
                status: self.database_status.clone(),
                details: match self.database_status {
                    ComponentStatus::Healthy => None,
                    ComponentStatus::Degraded => Some("Database not initialized; records are kept in memory".to_string()),
                    ComponentStatus::Unhealthy => Some("Database connection failed".to_string()),
                },
            },
        );

        SystemHealth::from_components(components)
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        match self.database_status {
            ComponentStatus::Healthy => Ok(true),
            ComponentStatus::Degraded => Ok(false),
            ComponentStatus::Unhealthy => Err("Database connection failed".to_string()),
        }
    }
}

/// Factory function to create a mock health service
pub fn create_mock_health_service() -> MockHealthService {
    MockHealthService::new()
}

/// Factory function to create a mock gamification service
pub fn create_mock_gamification_service() -> MockGamificationService {
    MockGamificationService::new()
}
