/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `PLUGIN_CONNECT_TIMEOUT_SECS`: Plugin connect timeout (default: 10)
/// - `PLUGIN_REQUEST_TIMEOUT_SECS`: Plugin request timeout (required)
/// - `RUST_LOG`: Log level (default: info)
///
/// # Example
///
/// ```no_run
/// use trigger_fanout_api::config::Config;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}:{}", config.api.host, config.api.port);
/// # Ok(())
/// # }
/// ```
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Plugin dispatch configuration
    pub plugin: PluginConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Whether the server is running in production (enables HSTS, locks
    /// CORS down to same-origin instead of permissive)
    pub production: bool,
}

/// Plugin HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Connect timeout, in seconds
    pub connect_timeout_secs: u64,

    /// Request timeout, in seconds
    ///
    /// This has no sensible default: a timeout too long defeats the point
    /// of bounding fan-out latency, so it must be set explicitly.
    pub request_timeout_secs: u64,
}

impl PluginConfig {
    pub fn to_client_config(&self) -> trigger_fanout_core::PluginClientConfig {
        trigger_fanout_core::PluginClientConfig {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let production = env::var("PRODUCTION")
            .map(|v| v == "true")
            .unwrap_or(false);

        let connect_timeout_secs = env::var("PLUGIN_CONNECT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()?;

        let request_timeout_secs = env::var("PLUGIN_REQUEST_TIMEOUT_SECS")
            .map_err(|_| anyhow::anyhow!("PLUGIN_REQUEST_TIMEOUT_SECS environment variable is required"))?
            .parse::<u64>()?;

        if request_timeout_secs == 0 {
            anyhow::bail!("PLUGIN_REQUEST_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                production,
            },
            plugin: PluginConfig {
                connect_timeout_secs,
                request_timeout_secs,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
