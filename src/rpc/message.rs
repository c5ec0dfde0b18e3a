//! JSON-RPC 2.0 envelopes sent to and received from the node.
//!
//! These are the *outbound* counterparts of [`crate::mcp::protocol`]: the
//! server acts as a JSON-RPC client towards the blockchain endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC protocol version carried by every request.
pub const JSONRPC_VERSION: &str = "2.0";

/// A JSON-RPC 2.0 request to the node.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<'a> {
    /// Always "2.0".
    pub jsonrpc: &'static str,
    /// Client-assigned request id.
    pub id: u64,
    /// The RPC method to invoke.
    pub method: &'a str,
    /// Positional parameters.
    pub params: &'a [Value],
}

impl<'a> RpcRequest<'a> {
    /// Creates a new request envelope.
    #[must_use]
    pub const fn new(id: u64, method: &'a str, params: &'a [Value]) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method,
            params,
        }
    }
}

/// The error object of a failed JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcErrorObject {
    /// Error message supplied by the endpoint.
    #[serde(default = "unknown_rpc_error")]
    pub message: String,
    /// Error code, if supplied.
    #[serde(default)]
    pub code: Option<i64>,
    /// Additional error data, if supplied.
    #[serde(default)]
    pub data: Option<Value>,
}

fn unknown_rpc_error() -> String {
    "Unknown RPC error".to_string()
}

/// A decoded JSON-RPC response: exactly one of result or error.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcResponse {
    /// The call succeeded with this result (which may be `null`).
    Success(Value),
    /// The endpoint reported an error.
    Failure(RpcErrorObject),
}

impl RpcResponse {
    /// Classifies a decoded response body.
    ///
    /// A non-null `error` member takes precedence. Otherwise the `result`
    /// member must be present, even if it is `null`.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the body is neither a
    /// success nor an error response.
    pub fn from_value(body: Value) -> Result<Self, String> {
        let Value::Object(mut obj) = body else {
            return Err("response body is not a JSON object".to_string());
        };

        match obj.remove("error") {
            Some(Value::Null) | None => {}
            Some(error) => {
                let error = match error {
                    Value::String(message) => RpcErrorObject {
                        message,
                        code: None,
                        data: None,
                    },
                    other => serde_json::from_value(other)
                        .map_err(|e| format!("malformed error object: {e}"))?,
                };
                return Ok(Self::Failure(error));
            }
        }

        obj.remove("result")
            .map(Self::Success)
            .ok_or_else(|| "response has neither result nor error".to_string())
    }
}
