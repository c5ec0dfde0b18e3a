//! JSON-RPC 2.0 message types for the MCP host session.
//!
//! These are the *inbound* messages from the AI host and the replies we
//! send back. The node-facing envelopes live in [`crate::rpc::message`].
//!
//! - Requests carry an `id` and always get exactly one reply
//! - Notifications carry no `id` and never get a reply
//! - Request IDs are strings or integers, never `null`

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// The MCP protocol version this implementation supports.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name for capability negotiation.
pub const SERVER_NAME: &str = "evm-rpc-mcp";

/// A JSON-RPC 2.0 request ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric request ID.
    Number(i64),
    /// String request ID.
    String(String),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

/// A request from the host.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    /// Unique request identifier.
    pub id: RequestId,
    /// The method to invoke.
    pub method: String,
    /// Optional parameters for the method.
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Deserialises the request parameters into `T`.
    ///
    /// # Errors
    ///
    /// Returns an invalid-params error if the parameters are missing or do
    /// not match `T`.
    pub fn parse_params<T: serde::de::DeserializeOwned>(
        &self,
        what: &str,
    ) -> Result<T, JsonRpcError> {
        let params = self.params.clone().ok_or_else(|| {
            JsonRpcError::invalid_params(self.id.clone(), format!("Missing {what} params"))
        })?;
        serde_json::from_value(params).map_err(|e| {
            JsonRpcError::invalid_params(self.id.clone(), format!("Invalid {what} params: {e}"))
        })
    }
}

/// A notification from the host.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcNotification {
    /// The notification method.
    pub method: String,
    /// Optional parameters for the notification.
    #[serde(default)]
    pub params: Option<Value>,
}

/// An incoming message that could be either a request or notification.
#[derive(Debug, Clone)]
pub enum IncomingMessage {
    /// A request expecting a response.
    Request(JsonRpcRequest),
    /// A notification (no response expected).
    Notification(JsonRpcNotification),
}

/// A successful reply.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    /// Always "2.0".
    pub jsonrpc: &'static str,
    /// The request ID this response corresponds to.
    pub id: RequestId,
    /// The result of the method call.
    pub result: Value,
}

impl JsonRpcResponse {
    /// Creates a new success response.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Value is not const-compatible
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result,
        }
    }
}

/// Standard JSON-RPC 2.0 and MCP error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid JSON was received.
    ParseError,
    /// The JSON is not a valid request object.
    InvalidRequest,
    /// The method does not exist or is not available.
    MethodNotFound,
    /// Invalid method parameters.
    InvalidParams,
    /// Internal error.
    InternalError,
    /// The requested resource URI is unknown (MCP-specific).
    ResourceNotFound,
}

impl ErrorCode {
    /// Returns the numeric code for this error.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::ResourceNotFound => -32002,
        }
    }
}

/// The `error` member of an error reply.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcErrorData {
    /// The error code.
    pub code: i32,
    /// A short description of the error.
    pub message: String,
    /// Additional information about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// An error reply.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    /// Always "2.0".
    pub jsonrpc: &'static str,
    /// The request ID this error corresponds to (`null` if unknown).
    pub id: Option<RequestId>,
    /// The error details.
    pub error: JsonRpcErrorData,
}

impl JsonRpcError {
    /// Creates a new error reply.
    #[must_use]
    pub fn new(id: Option<RequestId>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            error: JsonRpcErrorData {
                code: code.code(),
                message: message.into(),
                data: None,
            },
        }
    }

    /// Attaches additional data.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.error.data = Some(data);
        self
    }

    /// Creates a parse error reply (ID cannot be determined).
    #[must_use]
    pub fn parse_error() -> Self {
        Self::new(None, ErrorCode::ParseError, "Parse error")
    }

    /// Creates an invalid request error reply.
    #[must_use]
    pub fn invalid_request(id: Option<RequestId>, message: impl Into<String>) -> Self {
        Self::new(id, ErrorCode::InvalidRequest, message)
    }

    /// Creates a method not found error reply.
    #[must_use]
    pub fn method_not_found(id: RequestId, method: &str) -> Self {
        Self::new(
            Some(id),
            ErrorCode::MethodNotFound,
            format!("Method not found: {method}"),
        )
    }

    /// Creates an invalid params error reply.
    #[must_use]
    pub fn invalid_params(id: RequestId, message: impl Into<String>) -> Self {
        Self::new(Some(id), ErrorCode::InvalidParams, message)
    }

    /// Creates a resource not found error reply.
    #[must_use]
    pub fn resource_not_found(id: RequestId, uri: &str) -> Self {
        Self::new(
            Some(id),
            ErrorCode::ResourceNotFound,
            format!("Resource not found: {uri}"),
        )
        .with_data(json!({ "uri": uri }))
    }

    /// Creates an internal error reply.
    #[must_use]
    pub fn internal_error(id: RequestId, message: impl Into<String>) -> Self {
        Self::new(Some(id), ErrorCode::InternalError, message)
    }
}

/// Any message the server writes to the host.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OutgoingMessage {
    /// A success reply.
    Response(JsonRpcResponse),
    /// An error reply.
    Error(JsonRpcError),
}

impl From<JsonRpcResponse> for OutgoingMessage {
    fn from(response: JsonRpcResponse) -> Self {
        Self::Response(response)
    }
}

impl From<JsonRpcError> for OutgoingMessage {
    fn from(error: JsonRpcError) -> Self {
        Self::Error(error)
    }
}

impl From<Result<JsonRpcResponse, JsonRpcError>> for OutgoingMessage {
    fn from(result: Result<JsonRpcResponse, JsonRpcError>) -> Self {
        result.map_or_else(Self::Error, Self::Response)
    }
}

/// Parses one line from the host into an incoming message.
///
/// # Errors
///
/// Returns a parse error for invalid JSON or non-objects, and an invalid
/// request error for anything that is not a JSON-RPC 2.0 message.
pub fn parse_message(json: &str) -> Result<IncomingMessage, JsonRpcError> {
    let value: Value = serde_json::from_str(json).map_err(|_| JsonRpcError::parse_error())?;
    let obj = value.as_object().ok_or_else(JsonRpcError::parse_error)?;

    // Recover the id early so that later errors can reference it.
    let id = obj
        .get("id")
        .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok());

    if obj.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
        return Err(JsonRpcError::invalid_request(
            id,
            "jsonrpc field must be \"2.0\"",
        ));
    }

    if !obj.contains_key("id") {
        return serde_json::from_value(value)
            .map(IncomingMessage::Notification)
            .map_err(|e| JsonRpcError::invalid_request(None, e.to_string()));
    }

    let request: JsonRpcRequest = serde_json::from_value(value)
        .map_err(|e| JsonRpcError::invalid_request(id.clone(), e.to_string()))?;

    if request.method.is_empty() {
        return Err(JsonRpcError::invalid_request(
            id,
            "method field cannot be empty",
        ));
    }

    Ok(IncomingMessage::Request(request))
}
