// FamilyHealth-api lib.rs
//
// HTTP surface of the FamilyHealth application: routes, handlers and the
// OpenAPI document.

// Public modules
pub mod api;
pub mod entities;
pub mod openapi;

pub use api::create_application;
