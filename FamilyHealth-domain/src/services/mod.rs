// Domain services
// This module contains business logic implementations.

pub mod errors;
pub mod records;
pub mod family;
pub mod medical;
pub mod pregnancy;
pub mod cycle;
pub mod baby_care;
pub mod wellness;
pub mod gamification;

use std::sync::Arc;

use family_health_data::store::{default_table_client, TableClient};

// Re-export service types and factory functions
pub use errors::ServiceError;
pub use records::{DomainRecord, RecordService};
pub use family::FamilyService;
pub use medical::MedicalRecordsService;
pub use pregnancy::PregnancyService;
pub use cycle::CycleService;
pub use baby_care::BabyCareService;
pub use wellness::WellnessService;
pub use gamification::{
    create_default_gamification_service, GamificationService, GamificationServiceTrait,
};

/// Every feature service, sharing one table client and one gamification service
#[derive(Clone)]
pub struct DomainServices {
    pub family: FamilyService,
    pub medical: MedicalRecordsService,
    pub pregnancy: PregnancyService,
    pub cycles: CycleService,
    pub baby_care: BabyCareService,
    pub wellness: WellnessService,
    pub gamification: Arc<dyn GamificationServiceTrait>,
}

impl std::fmt::Debug for DomainServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainServices").finish_non_exhaustive()
    }
}

impl DomainServices {
    /// Build every service over a table client
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        let gamification: Arc<dyn GamificationServiceTrait> = Arc::new(GamificationService::new(client.clone()));
        Self::with_gamification(client, gamification)
    }

    /// Build every service with a specific gamification service
    pub fn with_gamification(client: Arc<dyn TableClient>, gamification: Arc<dyn GamificationServiceTrait>) -> Self {
        Self {
            family: RecordService::new(client.clone()).with_gamification(gamification.clone()),
            medical: MedicalRecordsService::new(client.clone(), gamification.clone()),
            pregnancy: PregnancyService::new(client.clone(), gamification.clone()),
            cycles: CycleService::new(client.clone(), gamification.clone()),
            baby_care: BabyCareService::new(client.clone(), gamification.clone()),
            wellness: WellnessService::new(client, gamification.clone()),
            gamification,
        }
    }
}

/// Create the services over the process default table client
pub fn create_default_services() -> DomainServices {
    DomainServices::new(default_table_client())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use family_health_data::store::InMemoryTableClient;

    use crate::entities::{CreateVitalLogRequest, VitalType};

    #[tokio::test]
    async fn test_services_share_gamification() {
        let services = DomainServices::new(Arc::new(InMemoryTableClient::new()));

        services
            .wellness
            .vitals
            .create("u1", CreateVitalLogRequest {
                family_member_id: None,
                vital_type: VitalType::Steps,
                value: 8000.0,
                secondary_value: None,
                unit: None,
                recorded_at: Some(Utc::now()),
                notes: None,
            })
            .await
            .unwrap();

        let profile = services.gamification.profile("u1").await.unwrap();
        assert_eq!(profile.total_points, 5);
        assert_eq!(profile.activity_counts.get("vital_logged"), Some(&1));
    }
}
