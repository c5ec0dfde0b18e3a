//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use serde::Deserialize;

use crate::error::ConfigError;

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// JSON-RPC endpoint URL.
    #[serde(default)]
    pub rpc_url: Option<String>,

    /// Human-readable network label (e.g. "Ethereum", "Zircuit").
    #[serde(default)]
    pub chain_name: Option<String>,

    /// RPC client settings.
    #[serde(default)]
    pub rpc: RpcSettings,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rpc.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError {
                message: "rpc.request_timeout_secs must be greater than zero".to_string(),
            });
        }

        if let Some(ref url) = self.rpc_url {
            if !url.trim().is_empty() {
                url::Url::parse(url.trim()).map_err(|e| ConfigError::ValidationError {
                    message: format!("Invalid rpc_url '{url}': {e}"),
                })?;
            }
        }
        Ok(())
    }
}

/// RPC client configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RpcSettings {
    /// Upper bound on a single JSON-RPC round trip, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
        }
    }
}

const fn default_request_timeout() -> u64 {
    30
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
