// Public entities for the FamilyHealth API
// Domain entities are served as-is; this module holds the shapes that only
// exist at the HTTP boundary.

// Common entities for error handling
pub mod common;

pub use common::ErrorResponse;
