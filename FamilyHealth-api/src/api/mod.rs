pub mod extract;
pub mod handlers;
pub mod layers;
pub mod routes;

use std::sync::Arc;

use family_health_domain::services::DomainServices;

/// State shared by the feature handlers
pub type AppState = Arc<DomainServices>;

// Re-export the application builders
pub use routes::{create_app, create_app_with_client, create_app_with_services};

/// Create the application router
pub async fn create_application() -> axum::Router {
    create_app().await
}
