use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tracing::debug;

use family_health_data::store::{default_table_client, TableClient};
use family_health_domain::health::HealthServiceTrait;
use family_health_domain::services::DomainServices;

use crate::api::handlers::{
    baby_care, calculators, gamification, health, medical, record_routes, wellness, womens_health,
};
use crate::api::layers::configure_layers;
use crate::openapi::configure_swagger_routes;

/// CRUD routes for every record collection
fn collection_routes(services: &DomainServices) -> Router {
    Router::new()
        .merge(record_routes("/family-members", services.family.clone()))
        .merge(record_routes("/prescriptions", services.medical.prescriptions.clone()))
        .merge(record_routes("/insurance-policies", services.medical.insurance_policies.clone()))
        .merge(record_routes("/medical-bills", services.medical.bills.clone()))
        .merge(record_routes("/medical-documents", services.medical.documents.clone()))
        .merge(record_routes("/pregnancy-profiles", services.pregnancy.profiles.clone()))
        .merge(record_routes("/menstrual-cycles", services.cycles.cycles.clone()))
        .merge(record_routes("/vaccinations", services.baby_care.vaccinations.clone()))
        .merge(record_routes("/feeding-logs", services.baby_care.feedings.clone()))
        .merge(record_routes("/sleep-logs", services.baby_care.sleeps.clone()))
        .merge(record_routes("/vitals", services.wellness.vitals.clone()))
}

/// Summaries and actions beyond plain CRUD
fn feature_routes(services: DomainServices) -> Router {
    Router::new()
        // Static segments take priority over the `:id` routes of the same collection
        .route("/prescriptions/active", get(medical::get_active_prescriptions))
        .route("/insurance-policies/expiring", get(medical::get_expiring_policies))
        .route("/medical-bills/summary", get(medical::get_bill_summary))
        .route("/pregnancy-profiles/current/status", get(womens_health::get_current_pregnancy_status))
        .route("/menstrual-cycles/prediction", get(womens_health::get_cycle_prediction))
        .route("/vaccinations/status", get(baby_care::get_vaccination_statuses))
        .route("/vaccinations/:id/administer", post(baby_care::administer_vaccination))
        .route("/babies/:member_id/summary", get(baby_care::get_baby_summary))
        .route("/vitals/summary", get(wellness::get_vital_summary))
        .route("/gamification/profile", get(gamification::get_profile))
        .route("/gamification/badges", get(gamification::list_badges))
        .route("/calculators/pregnancy", get(calculators::pregnancy_calculator))
        .route("/calculators/fertility", get(calculators::fertility_calculator))
        .with_state(Arc::new(services))
}

/// Build the application over prepared services
pub fn create_app_with_services(services: DomainServices, health_service: Arc<dyn HealthServiceTrait>) -> Router {
    let api_routes = collection_routes(&services).merge(feature_routes(services));
    debug!("API routes configured");

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .layer(Extension(health_service));

    let app = Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .merge(configure_swagger_routes());
    debug!("Swagger UI merged");

    health::initialize_server_start_time();
    configure_layers(app)
}

/// Build the application over a specific table client
pub fn create_app_with_client(client: Arc<dyn TableClient>) -> Router {
    create_app_with_services(DomainServices::new(client), health::create_health_service())
}

/// Create the application router over the process default store
pub async fn create_app() -> Router {
    debug!("Creating application router");
    create_app_with_client(default_table_client())
}
