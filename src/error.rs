//! Error types for evm-rpc-mcp.
//!
//! Errors are split by phase:
//!
//! - [`ConfigError`] while resolving configuration
//! - [`StartupError`] while probing the endpoint
//! - [`RegistryError`] while registering tools
//! - [`RpcCallError`] for a single JSON-RPC round trip
//! - [`DispatchError`] when a tool call is rejected before its handler runs
//!
//! Startup-phase errors are fatal. Dispatch-phase errors are rendered as
//! tool result text and never reach the transport.

use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },

    /// No RPC endpoint was configured.
    #[error("no RPC endpoint configured (pass RPC_URL as an argument, environment variable or config entry)")]
    MissingEndpoint,
}

/// The classified cause of a failed RPC call.
#[derive(Error, Debug)]
pub enum RpcErrorKind {
    /// The call was malformed before any network I/O happened.
    #[error("RPC method is required")]
    InvalidRequest,

    /// The endpoint could not be reached or returned an unusable body.
    #[error("transport error: {message}: {}", cause_chain(.source.as_ref()))]
    Transport {
        /// Short description of the failure.
        message: String,
        /// The underlying HTTP or decoding error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The endpoint answered with a JSON-RPC error object.
    #[error("RPC Error: {message}")]
    Rpc {
        /// Message supplied by the endpoint.
        message: String,
        /// Error code supplied by the endpoint, if any.
        code: Option<i64>,
    },
}

/// Renders an error followed by each distinct cause in its source chain.
fn cause_chain(err: &(dyn std::error::Error + Send + Sync + 'static)) -> String {
    let mut text = err.to_string();
    let mut next = err.source();
    while let Some(cause) = next {
        let part = cause.to_string();
        if !text.contains(&part) {
            text.push_str(": ");
            text.push_str(&part);
        }
        next = cause.source();
    }
    text
}

/// A failed JSON-RPC call, annotated with the call that produced it.
#[derive(Error, Debug)]
#[error("{kind}")]
pub struct RpcCallError {
    /// The JSON-RPC method that was called.
    pub method: String,
    /// The parameters that were sent.
    pub params: Vec<Value>,
    /// What went wrong.
    #[source]
    pub kind: RpcErrorKind,
}

impl RpcCallError {
    /// Creates a new error for the given call.
    #[must_use]
    pub fn new(method: impl Into<String>, params: Vec<Value>, kind: RpcErrorKind) -> Self {
        Self {
            method: method.into(),
            params,
            kind,
        }
    }

    /// Returns `true` if the endpoint could not be reached or decoded.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self.kind, RpcErrorKind::Transport { .. })
    }

    /// Returns the endpoint-supplied message for structured RPC errors.
    #[must_use]
    pub fn rpc_message(&self) -> Option<&str> {
        match &self.kind {
            RpcErrorKind::Rpc { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Errors raised while probing the endpoint at startup.
#[derive(Error, Debug)]
pub enum StartupError {
    /// The connectivity canary failed.
    #[error("RPC endpoint is unreachable: {0}")]
    Unreachable(#[source] RpcCallError),

    /// A startup query failed.
    #[error(transparent)]
    Rpc(#[from] RpcCallError),

    /// The chain id returned by the endpoint is not a hex quantity.
    #[error("invalid chain id returned by endpoint: {value}")]
    InvalidChainId {
        /// The raw value returned.
        value: String,
    },
}

/// Errors raised while populating the tool registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A tool with the same name is already registered.
    #[error("tool already registered: {name}")]
    DuplicateTool {
        /// Name of the duplicate tool.
        name: String,
    },
}

/// Reasons a tool call is rejected before its handler runs.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// No tool with this name is registered.
    #[error("Unknown tool: {name}")]
    UnknownTool {
        /// Requested tool name.
        name: String,
    },

    /// The arguments do not match the tool's input schema.
    #[error("Invalid input for tool '{tool}': {}", .violations.join("; "))]
    InvalidInput {
        /// Tool name.
        tool: String,
        /// Each violated constraint.
        violations: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let error = ConfigError::NotFound {
            path: PathBuf::from("/path/to/config.json"),
        };
        let msg = error.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("config.json"));
    }

    #[test]
    fn validation_error_display() {
        let error = ConfigError::ValidationError {
            message: "invalid setting".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("invalid setting"));
    }

    #[test]
    fn rpc_error_display_carries_endpoint_message() {
        let error = RpcCallError::new(
            "eth_call",
            vec![],
            RpcErrorKind::Rpc {
                message: "execution reverted".to_string(),
                code: Some(3),
            },
        );
        assert_eq!(error.to_string(), "RPC Error: execution reverted");
        assert_eq!(error.rpc_message(), Some("execution reverted"));
        assert!(!error.is_transport());
    }

    #[test]
    fn transport_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let error = RpcCallError::new(
            "eth_blockNumber",
            vec![],
            RpcErrorKind::Transport {
                message: "request failed".to_string(),
                source: Box::new(io),
            },
        );
        assert!(error.is_transport());
        assert_eq!(error.to_string(), "transport error: request failed: refused");
        let source = std::error::Error::source(&error).expect("kind is the source");
        assert!(std::error::Error::source(source).is_some());
    }

    #[test]
    fn transport_display_walks_source_chain() {
        #[derive(Debug)]
        struct Outer(std::io::Error);

        impl std::fmt::Display for Outer {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("error sending request")
            }
        }

        impl std::error::Error for Outer {
            fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
                Some(&self.0)
            }
        }

        let inner = std::io::Error::new(std::io::ErrorKind::TimedOut, "operation timed out");
        let kind = RpcErrorKind::Transport {
            message: "request timed out".to_string(),
            source: Box::new(Outer(inner)),
        };
        assert_eq!(
            kind.to_string(),
            "transport error: request timed out: error sending request: operation timed out"
        );
    }

    #[test]
    fn invalid_input_lists_violations() {
        let error = DispatchError::InvalidInput {
            tool: "eth_getBalance".to_string(),
            violations: vec![
                "missing required field 'address'".to_string(),
                "field 'x' must be a string".to_string(),
            ],
        };
        let msg = error.to_string();
        assert!(msg.starts_with("Invalid input for tool 'eth_getBalance'"));
        assert!(msg.contains("missing required field 'address'; field 'x'"));
    }
}
