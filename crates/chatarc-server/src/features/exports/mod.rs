//! Export job feature slice
//!
//! Creation (admission-gated, asynchronously executed) and read-only status
//! queries for export jobs.

pub mod commands;
pub mod queries;
pub mod routes;
pub mod types;

pub use routes::exports_routes;
