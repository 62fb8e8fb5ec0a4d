// FamilyHealth Domain
// This crate contains the business logic for the FamilyHealth application

// Services that implement business logic
pub mod services;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;

// Log sanitization helpers
pub mod logging;

// Re-export the database and store modules from the data crate for convenience
pub use family_health_data::{database, store};

// Testing utilities - only available with mock feature
#[cfg(any(test, feature = "mock"))]
pub mod testing;
