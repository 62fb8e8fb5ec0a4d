// FamilyHealth Data
// This crate handles data access: the database pool, the generic table
// client every feature module talks to, and the row models stored in it.

// Database connection management
pub mod database;

// Generic table query client (select/insert/update/delete with equality filters)
pub mod store;

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
