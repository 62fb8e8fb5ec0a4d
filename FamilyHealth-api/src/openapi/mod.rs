use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
}

// API Documentation
//
// Collection CRUD routes share generic handlers and are described through
// their entity and request schemas.
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Medical records
        crate::api::handlers::medical::get_active_prescriptions,
        crate::api::handlers::medical::get_expiring_policies,
        crate::api::handlers::medical::get_bill_summary,

        // Women's health
        crate::api::handlers::womens_health::get_current_pregnancy_status,
        crate::api::handlers::womens_health::get_cycle_prediction,

        // Baby care
        crate::api::handlers::baby_care::get_vaccination_statuses,
        crate::api::handlers::baby_care::administer_vaccination,
        crate::api::handlers::baby_care::get_baby_summary,

        // Wellness
        crate::api::handlers::wellness::get_vital_summary,

        // Gamification
        crate::api::handlers::gamification::get_profile,
        crate::api::handlers::gamification::list_badges,

        // Calculators
        crate::api::handlers::calculators::pregnancy_calculator,
        crate::api::handlers::calculators::fertility_calculator,
    ),
    components(
        schemas(
            crate::entities::common::ErrorResponse,
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentHealthStatus,

            // Family
            family_health_domain::entities::FamilyMember,
            family_health_domain::entities::CreateFamilyMemberRequest,
            family_health_domain::entities::Relationship,

            // Medical records
            family_health_domain::entities::Prescription,
            family_health_domain::entities::CreatePrescriptionRequest,
            family_health_domain::entities::InsurancePolicy,
            family_health_domain::entities::CreateInsurancePolicyRequest,
            family_health_domain::entities::MedicalBill,
            family_health_domain::entities::CreateMedicalBillRequest,
            family_health_domain::entities::BillStatus,
            family_health_domain::entities::BillSummary,
            family_health_domain::entities::MedicalDocument,
            family_health_domain::entities::CreateMedicalDocumentRequest,
            family_health_domain::entities::DocumentType,

            // Women's health
            family_health_domain::entities::PregnancyProfile,
            family_health_domain::entities::CreatePregnancyProfileRequest,
            family_health_domain::entities::PregnancyStatus,
            family_health_domain::entities::GestationalAge,
            family_health_domain::entities::Trimester,
            family_health_domain::entities::MenstrualCycle,
            family_health_domain::entities::CreateMenstrualCycleRequest,
            family_health_domain::entities::FlowIntensity,
            family_health_domain::entities::CyclePhase,
            family_health_domain::entities::CyclePrediction,
            family_health_domain::entities::CycleFertilityEstimate,

            // Baby care
            family_health_domain::entities::FeedingLog,
            family_health_domain::entities::CreateFeedingLogRequest,
            family_health_domain::entities::FeedingType,
            family_health_domain::entities::BreastSide,
            family_health_domain::entities::SleepLog,
            family_health_domain::entities::CreateSleepLogRequest,
            family_health_domain::entities::VaccinationSchedule,
            family_health_domain::entities::CreateVaccinationRequest,
            family_health_domain::entities::AdministerVaccinationRequest,
            family_health_domain::entities::VaccinationStatus,
            family_health_domain::entities::VaccinationStatusEntry,
            family_health_domain::entities::DailyBabySummary,

            // Wellness
            family_health_domain::entities::VitalLog,
            family_health_domain::entities::CreateVitalLogRequest,
            family_health_domain::entities::VitalType,
            family_health_domain::entities::VitalSummary,
            family_health_domain::entities::BloodPressureCategory,

            // Gamification
            family_health_domain::entities::Activity,
            family_health_domain::entities::ActivityStreak,
            family_health_domain::entities::ActivityOutcome,
            family_health_domain::entities::Badge,
            family_health_domain::entities::BadgeCriterion,
            family_health_domain::entities::EarnedBadgeView,
            family_health_domain::entities::GamificationProfile,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "medical", description = "Prescriptions, insurance, bills and documents"),
        (name = "womens_health", description = "Pregnancy and menstrual cycle tracking"),
        (name = "baby_care", description = "Feeding, sleep and vaccinations"),
        (name = "wellness", description = "Vital sign tracking"),
        (name = "gamification", description = "Points, streaks and badges"),
        (name = "calculators", description = "Date calculators without stored data")
    ),
    info(
        title = "FamilyHealth API",
        version = "0.1.0",
        description = "Family health records and wellness tracking",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_generation() {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "FamilyHealth API");
        assert_eq!(openapi.info.version, "0.1.0");

        let tags = openapi.tags.as_ref().expect("tags are declared");
        assert!(tags.iter().any(|tag| tag.name == "health"));
        assert!(tags.iter().any(|tag| tag.name == "calculators"));

        for path in [
            "/health",
            "/api/v1/prescriptions/active",
            "/api/v1/vaccinations/{id}/administer",
            "/api/v1/babies/{member_id}/summary",
            "/api/v1/calculators/fertility",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing path {}", path);
        }

        let schemas = &openapi.components.as_ref().expect("components are declared").schemas;
        assert!(schemas.contains_key("FamilyMember"));
        assert!(schemas.contains_key("GamificationProfile"));
    }
}
