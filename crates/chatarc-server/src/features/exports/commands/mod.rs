//! Write operations for export jobs.

pub mod create;

pub use create::{handle as handle_create_export, CreateExportCommand, CreateExportError};
