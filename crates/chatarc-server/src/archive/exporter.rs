//! External export tool collaborator.
//!
//! Production exports run the DiscordChatExporter CLI as a subprocess: given a
//! token, a channel id, and a time range it writes a JSON payload to a
//! temporary file, which is parsed into raw message values. The engine treats
//! the tool as a black box; everything it returns is opaque payload.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use chatarc_common::text::{mask_secret, truncate_to};

use crate::config::ExporterConfig;

/// Bound on captured stderr/stdout folded into diagnostics.
const DIAGNOSTIC_TAIL_LEN: usize = 500;

/// Parameters for one export invocation.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub channel_id: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub media: bool,
    pub filter: Option<String>,
}

/// Export tool failures, each carrying a bounded diagnostic.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export tool not found at {0}")]
    MissingBinary(String),

    #[error("export tool not configured: {0}")]
    NotConfigured(String),

    #[error("export tool failed rc={code} stderr={stderr} stdout={stdout}")]
    NonZeroExit {
        code: i32,
        stderr: String,
        stdout: String,
    },

    #[error("export tool timed out after {0}s")]
    Timeout(u64),

    #[error("export tool did not produce an output file")]
    MissingOutput,

    #[error("failed to parse export output: {0}")]
    MalformedOutput(#[from] serde_json::Error),

    #[error("unexpected export payload shape")]
    UnexpectedShape,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The export collaborator seam.
///
/// Returns the raw message payloads the tool produced, or fails with a
/// bounded-length diagnostic. Implementations must never log credentials.
#[async_trait]
pub trait MessageExporter: Send + Sync {
    async fn export(&self, req: &ExportRequest) -> Result<Vec<serde_json::Value>, ExportError>;
}

/// DiscordChatExporter CLI invocation.
pub struct CliExporter {
    config: ExporterConfig,
}

impl CliExporter {
    pub fn new(config: ExporterConfig) -> Self {
        Self { config }
    }

    fn token_value(&self) -> Result<String, ExportError> {
        let token = self
            .config
            .token
            .as_deref()
            .ok_or_else(|| ExportError::NotConfigured("missing export token".to_string()))?;

        // Bot tokens need the "Bot " prefix the CLI expects.
        if self.config.token_is_bot && !token.starts_with("Bot ") {
            Ok(format!("Bot {token}"))
        } else {
            Ok(token.to_string())
        }
    }
}

/// Build the CLI argument vector for one export run.
fn build_args(token: &str, req: &ExportRequest, out_path: &Path) -> Vec<String> {
    let mut args = vec![
        "export".to_string(),
        "-t".to_string(),
        token.to_string(),
        "-c".to_string(),
        req.channel_id.clone(),
        "--after".to_string(),
        format_timestamp(req.start_at),
        "--before".to_string(),
        format_timestamp(req.end_at),
        "-f".to_string(),
        "Json".to_string(),
        "-o".to_string(),
        out_path.display().to_string(),
    ];
    if req.media {
        args.push("--media".to_string());
    }
    if let Some(filter) = &req.filter {
        args.push("--filter".to_string());
        args.push(filter.clone());
    }
    args
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Pull the message list out of the tool's payload. The CLI writes either
/// `{ "messages": [...] }` or a bare array depending on version.
fn extract_messages(payload: serde_json::Value) -> Result<Vec<serde_json::Value>, ExportError> {
    match payload {
        serde_json::Value::Object(mut obj) => match obj.remove("messages") {
            Some(serde_json::Value::Array(messages)) => Ok(messages),
            _ => Err(ExportError::UnexpectedShape),
        },
        serde_json::Value::Array(messages) => Ok(messages),
        _ => Err(ExportError::UnexpectedShape),
    }
}

#[async_trait]
impl MessageExporter for CliExporter {
    async fn export(&self, req: &ExportRequest) -> Result<Vec<serde_json::Value>, ExportError> {
        if !Path::new(&self.config.bin_path).exists() {
            return Err(ExportError::MissingBinary(self.config.bin_path.clone()));
        }

        let token = self.token_value()?;
        let tmpdir = tempfile::tempdir()?;
        let out_path = tmpdir.path().join("out.json");
        let args = build_args(&token, req, &out_path);

        info!(
            channel_id = %req.channel_id,
            after = %format_timestamp(req.start_at),
            before = %format_timestamp(req.end_at),
            token = %mask_secret(&token),
            "running export tool"
        );

        let child = Command::new(&self.config.bin_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| ExportError::Timeout(self.config.timeout_secs))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            return Err(ExportError::NonZeroExit {
                code: output.status.code().unwrap_or(-1),
                stderr: truncate_to(stderr.trim(), DIAGNOSTIC_TAIL_LEN),
                stdout: truncate_to(stdout.trim(), DIAGNOSTIC_TAIL_LEN),
            });
        }

        if !out_path.exists() {
            return Err(ExportError::MissingOutput);
        }

        let raw = tokio::fs::read_to_string(&out_path).await?;
        let payload: serde_json::Value = serde_json::from_str(&raw)?;
        let messages = extract_messages(payload)?;

        debug!(message_count = messages.len(), "export tool finished");
        Ok(messages)
    }
}
