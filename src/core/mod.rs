//! Core RBAC implementation

pub mod cache;
pub mod config;
pub mod executor;
pub mod loader;
pub mod log;
pub mod schema;
pub mod sqlite;
pub mod store;
pub mod types;
pub mod validation;
