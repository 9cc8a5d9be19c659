//! Read operations for export jobs.

pub mod get_export;
pub mod list_exports;

pub use get_export::{handle as handle_get_export, GetExportError, GetExportQuery};
pub use list_exports::{handle as handle_list_exports, ListExportsQuery, ListExportsResponse};
