//! Configuration file loading and endpoint resolution.
//!
//! The endpoint and network label come from, in order of precedence:
//!
//! 1. Positional CLI arguments (or the `RPC_URL` / `CHAIN_NAME` environment
//!    variables, handled by clap)
//! 2. The configuration file
//! 3. Built-in defaults ([`DEFAULT_RPC_URL`], [`DEFAULT_CHAIN_NAME`])
//!
//! # Configuration File Locations
//!
//! 1. Path specified via `--config` CLI flag (must exist)
//! 2. Default location (optional):
//!    - **Linux/macOS:** `~/.evm-rpc-mcp/config.json`
//!    - **Windows:** `%USERPROFILE%\.evm-rpc-mcp\config.json`

mod settings;

pub use settings::{Config, LoggingConfig, RpcSettings};

use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

/// Endpoint used when none is configured anywhere.
pub const DEFAULT_RPC_URL: &str = "https://eth.llamarpc.com";

/// Network label used when none is configured anywhere.
pub const DEFAULT_CHAIN_NAME: &str = "Ethereum";

/// Returns the default configuration directory.
///
/// - **Linux/macOS:** `~/.evm-rpc-mcp/`
/// - **Windows:** `%USERPROFILE%\.evm-rpc-mcp\`
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".evm-rpc-mcp"))
}

/// Returns the platform-specific default configuration file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join("config.json"))
}

/// Loads and parses the configuration file.
///
/// If `path` is `None`, uses the platform-specific default location and
/// falls back to an empty configuration when no file exists there.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given configuration file cannot be found
/// - The file cannot be read
/// - The JSON is malformed
/// - Fields are invalid
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::NotFound {
                    path: p.to_path_buf(),
                });
            }
            p.to_path_buf()
        }
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => return Ok(Config::default()),
        },
    };

    let contents = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;

    let config: Config = serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: config_path.clone(),
        source: e,
    })?;

    config.validate()?;

    Ok(config)
}

/// The resolved, immutable server configuration.
///
/// Built once at startup and shared read-only for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// JSON-RPC endpoint.
    pub rpc_url: Url,
    /// The endpoint as it was given, before URL normalisation.
    pub configured_url: String,
    /// Human-readable network label.
    pub chain_name: String,
    /// Upper bound on a single RPC round trip.
    pub request_timeout: Duration,
}

impl ServerConfig {
    /// Resolves the final configuration from CLI values and the config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEndpoint`] if the chosen endpoint is
    /// blank, or a validation error if it is not a valid URL.
    pub fn resolve(
        cli_rpc_url: Option<&str>,
        cli_chain_name: Option<&str>,
        file: &Config,
    ) -> Result<Self, ConfigError> {
        let raw_url = cli_rpc_url
            .or(file.rpc_url.as_deref())
            .unwrap_or(DEFAULT_RPC_URL)
            .trim();

        if raw_url.is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }

        let rpc_url = Url::parse(raw_url).map_err(|e| ConfigError::ValidationError {
            message: format!("Invalid RPC URL '{raw_url}': {e}"),
        })?;

        let chain_name = cli_chain_name
            .or(file.chain_name.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_CHAIN_NAME)
            .to_string();

        Ok(Self {
            rpc_url,
            configured_url: raw_url.to_string(),
            chain_name,
            request_timeout: Duration::from_secs(file.rpc.request_timeout_secs),
        })
    }
}
