//! Feature modules implementing the chatarc API
//!
//! Each feature is a vertical slice with its own commands, queries, and
//! routes, following the CQRS (Command Query Responsibility Segregation)
//! pattern:
//!
//! - `commands/` - write operations (create an export job)
//! - `queries/` - read operations (get a job, list recent jobs)
//! - `routes.rs` - HTTP route definitions
//! - `types.rs` - request/response DTOs and validation
//!
//! Commands and queries implement the mediator pattern using the `mediator`
//! crate, enabling clean separation of concerns and easy testing.

pub mod exports;

use std::sync::Arc;

use axum::Router;

use crate::archive::{ExportRateLimiter, MessageExporter};
use crate::config::ExporterConfig;
use crate::db::ExportStore;
use crate::metrics::Metrics;

/// Shared state for all feature routes
///
/// Every collaborator sits behind a trait object or an explicitly constructed
/// component, so tests can assemble the same state from in-memory fakes.
#[derive(Clone)]
pub struct FeatureState {
    /// Job and message persistence
    pub store: Arc<dyn ExportStore>,
    /// External export tool
    pub exporter: Arc<dyn MessageExporter>,
    /// Admission gate for job creation
    pub limiter: Arc<ExportRateLimiter>,
    /// Process counters
    pub metrics: Arc<Metrics>,
    /// Export tool configuration (credentials, default target)
    pub exporter_config: Arc<ExporterConfig>,
}

/// Creates the API router with all feature routes mounted
pub fn router(state: FeatureState) -> Router<()> {
    exports::exports_routes().with_state(state)
}
