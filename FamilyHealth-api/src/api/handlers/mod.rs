pub mod health;
pub mod records;
pub mod medical;
pub mod womens_health;
pub mod baby_care;
pub mod wellness;
pub mod gamification;
pub mod calculators;

// Tests module
#[cfg(test)]
mod tests;

// Re-export handlers for easier imports
pub use health::health_check;
pub use records::record_routes;
