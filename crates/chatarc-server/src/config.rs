//! Configuration management

use serde::{Deserialize, Serialize};

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/chatarc";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum database connections in the pool.
pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 2;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Default location of the DiscordChatExporter CLI.
pub const DEFAULT_EXPORTER_BIN: &str = "/opt/dce/DiscordChatExporter.Cli";

/// Default export tool timeout in seconds.
pub const DEFAULT_EXPORTER_TIMEOUT_SECS: u64 = 180;

/// Default export jobs admitted per rate window.
pub const DEFAULT_EXPORTS_PER_WINDOW: u32 = 10;

/// Default rate window duration in seconds.
pub const DEFAULT_RATE_WINDOW_SECS: u64 = 60;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub exporter: ExporterConfig,
    pub rate_limit: RateLimitConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// External export tool configuration
///
/// The token may be absent at startup; creation requests are rejected with a
/// configuration error until it is provided.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfig {
    pub bin_path: String,
    #[serde(skip_serializing, default)]
    pub token: Option<String>,
    pub token_is_bot: bool,
    pub default_channel_id: Option<String>,
    pub timeout_secs: u64,
}

/// Admission control configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub exports_per_window: u32,
    pub window_secs: u64,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            server: ServerConfig {
                host: std::env::var("CHATARC_HOST")
                    .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: std::env::var("CHATARC_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SERVER_PORT),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
                min_connections: std::env::var("DATABASE_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_MIN_CONNECTIONS),
                connect_timeout_secs: std::env::var("DATABASE_CONNECT_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS),
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
                allow_credentials: std::env::var("CORS_ALLOW_CREDENTIALS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(true),
            },
            exporter: ExporterConfig {
                bin_path: std::env::var("EXPORTER_BIN")
                    .unwrap_or_else(|_| DEFAULT_EXPORTER_BIN.to_string()),
                token: std::env::var("DISCORD_TOKEN").ok().filter(|s| !s.is_empty()),
                token_is_bot: std::env::var("DISCORD_IS_BOT")
                    .map(|s| matches!(s.to_lowercase().as_str(), "1" | "true" | "yes"))
                    .unwrap_or(false),
                default_channel_id: std::env::var("DEFAULT_CHANNEL_ID")
                    .ok()
                    .filter(|s| !s.is_empty()),
                timeout_secs: std::env::var("EXPORTER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_EXPORTER_TIMEOUT_SECS),
            },
            rate_limit: RateLimitConfig {
                exports_per_window: std::env::var("EXPORT_RATE_LIMIT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_EXPORTS_PER_WINDOW),
                window_secs: std::env::var("EXPORT_RATE_WINDOW_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_RATE_WINDOW_SECS),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!(
                "Database min_connections ({}) cannot be greater than max_connections ({})",
                self.database.min_connections,
                self.database.max_connections
            );
        }

        if self.exporter.timeout_secs == 0 {
            anyhow::bail!("Exporter timeout must be greater than 0");
        }

        if self.rate_limit.window_secs == 0 {
            anyhow::bail!("Rate window must be greater than 0");
        }

        if self.exporter.token.is_none() {
            tracing::warn!(
                "DISCORD_TOKEN not configured - export creation will be rejected until it is set"
            );
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                min_connections: DEFAULT_DATABASE_MIN_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: true,
            },
            exporter: ExporterConfig::default(),
            rate_limit: RateLimitConfig {
                exports_per_window: DEFAULT_EXPORTS_PER_WINDOW,
                window_secs: DEFAULT_RATE_WINDOW_SECS,
            },
        }
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            bin_path: DEFAULT_EXPORTER_BIN.to_string(),
            token: None,
            token_is_bot: false,
            default_channel_id: None,
            timeout_secs: DEFAULT_EXPORTER_TIMEOUT_SECS,
        }
    }
}
