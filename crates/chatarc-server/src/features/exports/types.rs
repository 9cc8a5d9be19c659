//! Request validation for the exports API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Output formats the export tool knows about. Only `Json` runs through the
/// full archive pipeline; the rest are rejected at creation time.
pub const ALLOWED_FORMATS: &[&str] = &["Json", "PlainText", "HtmlDark", "HtmlLight", "Csv"];

/// Body of `POST /exports`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExportRequest {
    pub start_at: String,
    pub end_at: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub media: Option<bool>,
    #[serde(default)]
    pub filter: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must be an ISO8601 timestamp with timezone")]
    InvalidTimestamp { field: &'static str },

    #[error("invalid format")]
    InvalidFormat,

    #[error("Only Json format is supported")]
    UnsupportedFormat,

    #[error("start_at must be before end_at")]
    EmptyRange,
}

/// Validated, UTC-normalized time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportWindow {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl CreateExportRequest {
    /// Validate the request: RFC 3339 timestamps with explicit offsets,
    /// normalized to UTC, non-empty range, and an executable format.
    pub fn validate(&self) -> Result<ExportWindow, ValidationError> {
        if let Some(format) = self.format.as_deref() {
            if !ALLOWED_FORMATS.contains(&format) {
                return Err(ValidationError::InvalidFormat);
            }
            if format != "Json" {
                return Err(ValidationError::UnsupportedFormat);
            }
        }

        let start_at = parse_utc(&self.start_at, "start_at")?;
        let end_at = parse_utc(&self.end_at, "end_at")?;

        if start_at >= end_at {
            return Err(ValidationError::EmptyRange);
        }

        Ok(ExportWindow { start_at, end_at })
    }
}

fn parse_utc(value: &str, field: &'static str) -> Result<DateTime<Utc>, ValidationError> {
    // parse_from_rfc3339 rejects offset-less timestamps, which is exactly the
    // "timezone required" rule.
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ValidationError::InvalidTimestamp { field })
}
