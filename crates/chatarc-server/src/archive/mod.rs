//! Export job orchestration engine.
//!
//! The pieces with real invariants live here:
//!
//! - [`admission`]: fixed-window rate limiting of job creation
//! - [`reconcile`]: post-execution integrity reconciliation
//! - [`exporter`]: the external export tool collaborator
//! - [`runner`]: the job lifecycle state machine

pub mod admission;
pub mod exporter;
pub mod reconcile;
pub mod runner;

pub use admission::ExportRateLimiter;
pub use exporter::{CliExporter, ExportError, ExportRequest, MessageExporter};
pub use reconcile::{reconcile, EffectiveResult};
pub use runner::{ExportParams, JobRunner};
