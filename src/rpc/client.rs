//! HTTP JSON-RPC client for the configured node endpoint.
//!
//! Each [`RpcClient::call`] is exactly one HTTP POST. There are no retries,
//! no batching and no caching. Failures are classified into
//! [`RpcErrorKind`] and annotated with the method and parameters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::config::ServerConfig;
use crate::error::{RpcCallError, RpcErrorKind};
use crate::rpc::message::{RpcRequest, RpcResponse};

/// A JSON-RPC 2.0 client bound to a single endpoint.
#[derive(Debug)]
pub struct RpcClient {
    /// Underlying HTTP client (connection pool, timeout).
    http: reqwest::Client,
    /// Endpoint all calls are posted to.
    endpoint: Url,
    /// Source of request ids.
    next_id: AtomicU64,
}

impl RpcClient {
    /// Creates a client for `endpoint` with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed (for
    /// example, if the TLS backend fails to initialise).
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("evm-rpc-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            next_id: AtomicU64::new(1),
        })
    }

    /// Creates a client from the resolved server configuration.
    ///
    /// # Errors
    ///
    /// See [`RpcClient::new`].
    pub fn from_config(config: &ServerConfig) -> Result<Self, reqwest::Error> {
        Self::new(config.rpc_url.clone(), config.request_timeout)
    }

    /// Returns the endpoint this client posts to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Allocates the next request id.
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Calls `method` with positional `params` and returns the raw result.
    ///
    /// # Errors
    ///
    /// - [`RpcErrorKind::InvalidRequest`] if `method` is empty
    /// - [`RpcErrorKind::Transport`] if the request fails, times out, or the
    ///   body is not a JSON-RPC response
    /// - [`RpcErrorKind::Rpc`] if the endpoint returns an error object
    pub async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcCallError> {
        match self.send(method, &params).await {
            Ok(result) => Ok(result),
            Err(kind) => {
                tracing::error!(method, error = %kind, "Failed RPC call");
                Err(RpcCallError::new(method, params, kind))
            }
        }
    }

    async fn send(&self, method: &str, params: &[Value]) -> Result<Value, RpcErrorKind> {
        if method.trim().is_empty() {
            return Err(RpcErrorKind::InvalidRequest);
        }

        let request = RpcRequest::new(self.next_id(), method, params);
        tracing::debug!(method, id = request.id, "Sending RPC request");

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| http_failure("request failed", e))?;

        // Nodes often report JSON-RPC errors with a non-2xx status, so the
        // body is decoded before the status is considered.
        let status_error = response.error_for_status_ref().err();
        let body = response
            .bytes()
            .await
            .map_err(|e| http_failure("failed to read response body", e))?;

        let decoded = serde_json::from_slice::<Value>(&body)
            .map_err(|e| e.to_string())
            .and_then(RpcResponse::from_value);

        match (decoded, status_error) {
            (Ok(RpcResponse::Success(result)), None) => Ok(result),
            (Ok(RpcResponse::Failure(error)), _) => Err(RpcErrorKind::Rpc {
                message: error.message,
                code: error.code,
            }),
            (_, Some(status)) => Err(transport("endpoint returned an HTTP error", status)),
            (Err(reason), None) => Err(transport("malformed response body", reason)),
        }
    }
}

/// Classifies a reqwest failure, falling back to `context` when it is
/// neither a timeout nor a connection failure.
fn http_failure(context: &str, error: reqwest::Error) -> RpcErrorKind {
    let message = if error.is_timeout() {
        "request timed out"
    } else if error.is_connect() {
        "connection failed"
    } else {
        context
    };
    transport(message, error)
}

fn transport(
    message: &str,
    source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> RpcErrorKind {
    RpcErrorKind::Transport {
        message: message.to_string(),
        source: source.into(),
    }
}
