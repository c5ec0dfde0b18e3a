//! MCP server exposing the JSON-RPC tools to an AI host.
//!
//! This module implements the MCP server lifecycle:
//!
//! 1. **Initialisation**: Capability negotiation and version agreement
//! 2. **Operation**: Tool calls and resource reads
//! 3. **Shutdown**: Graceful termination once in-flight calls finish
//!
//! Tool calls run on their own tasks so that a slow node does not hold up
//! the rest of the session. Everything they touch lives in an immutable
//! [`ServerContext`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::task::JoinSet;

use crate::config::ServerConfig;
use crate::mcp::protocol::{
    parse_message, IncomingMessage, JsonRpcError, JsonRpcNotification, JsonRpcRequest,
    JsonRpcResponse, OutgoingMessage, RequestId, MCP_PROTOCOL_VERSION, SERVER_NAME,
};
use crate::mcp::transport::{MessageWriter, StdioReader};
use crate::rpc::RpcClient;
use crate::tools::ToolRegistry;

/// URI of the endpoint information resource.
pub const RPC_INFO_URI: &str = "text://rpc_info";

/// Server state in the MCP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting for initialize request.
    AwaitingInit,
    /// Initialize received, waiting for initialized notification.
    Initialising,
    /// Ready for normal operation.
    Running,
    /// Shutdown in progress.
    ShuttingDown,
}

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    pub tools: ListCapability,
    /// Resource-related capabilities.
    pub resources: ListCapability,
}

/// Capabilities of a listable feature.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListCapability {
    /// Whether the list can change during the session.
    #[serde(rename = "listChanged")]
    pub list_changed: bool,
}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Client information received during initialisation.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Parameters for the initialize request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by client.
    pub protocol_version: String,
    /// Client information.
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// Parameters for tools/call request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments for the tool.
    #[serde(default)]
    pub arguments: Value,
}

/// Parameters for resources/read request.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceReadParams {
    /// URI of the resource to read.
    pub uri: String,
}

/// Everything a request handler may need, shared read-only across tasks.
#[derive(Debug)]
pub struct ServerContext {
    /// Resolved configuration.
    pub config: ServerConfig,
    /// Client for the configured endpoint.
    pub client: RpcClient,
    /// Registered tools.
    pub registry: ToolRegistry,
}

impl ServerContext {
    /// Bundles the startup products into a context.
    #[must_use]
    pub const fn new(config: ServerConfig, client: RpcClient, registry: ToolRegistry) -> Self {
        Self {
            config,
            client,
            registry,
        }
    }

    /// Renders the `rpc_info` resource text.
    #[must_use]
    pub fn rpc_info(&self) -> String {
        format!(
            "Current RPC URL: {} for {}",
            self.config.configured_url, self.config.chain_name
        )
    }
}

/// The MCP server for EVM JSON-RPC tools.
pub struct McpServer {
    /// Current server state.
    state: ServerState,
    /// Incoming messages.
    reader: StdioReader,
    /// Outgoing messages, shared with tool call tasks.
    writer: MessageWriter,
    /// Negotiated protocol version (set after initialisation).
    protocol_version: Option<String>,
    /// Configuration, client and tools.
    context: Arc<ServerContext>,
    /// Tool calls that have not replied yet.
    in_flight: JoinSet<()>,
}

impl McpServer {
    /// Creates a server speaking MCP over stdio.
    #[must_use]
    pub fn new(context: ServerContext) -> Self {
        Self::with_writer(context, MessageWriter::stdout())
    }

    /// Creates a server that reads stdin and writes to `writer`.
    #[must_use]
    pub fn with_writer(context: ServerContext, writer: MessageWriter) -> Self {
        Self {
            state: ServerState::AwaitingInit,
            reader: StdioReader::new(),
            writer,
            protocol_version: None,
            context: Arc::new(context),
            in_flight: JoinSet::new(),
        }
    }

    /// Returns the current server state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Returns the negotiated protocol version, once initialised.
    #[must_use]
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    /// Runs the MCP server main loop with graceful shutdown handling.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(&mut self) -> std::io::Result<()> {
        let result = self.run_with_shutdown().await;
        self.state = ServerState::ShuttingDown;
        self.drain().await;
        result
    }

    /// Runs the main loop until EOF or a shutdown signal.
    #[cfg(unix)]
    async fn run_with_shutdown(&mut self) -> std::io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt()).map_err(std::io::Error::other)?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(std::io::Error::other)?;

        loop {
            tokio::select! {
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT, initiating graceful shutdown");
                    return Ok(());
                }

                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating graceful shutdown");
                    return Ok(());
                }

                Some(joined) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {
                    Self::log_join(joined);
                }

                line_result = self.reader.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Runs the main loop until EOF or a shutdown signal.
    #[cfg(windows)]
    async fn run_with_shutdown(&mut self) -> std::io::Result<()> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    tracing::info!("Received Ctrl+C, initiating graceful shutdown");
                    return Ok(());
                }

                Some(joined) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {
                    Self::log_join(joined);
                }

                line_result = self.reader.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Waits for every in-flight tool call to reply.
    async fn drain(&mut self) {
        if !self.in_flight.is_empty() {
            tracing::debug!(pending = self.in_flight.len(), "Waiting for in-flight tool calls");
        }
        while let Some(joined) = self.in_flight.join_next().await {
            Self::log_join(joined);
        }
    }

    fn log_join(joined: Result<(), tokio::task::JoinError>) {
        if let Err(e) = joined {
            tracing::error!(error = %e, "Tool call task failed");
        }
    }

    /// Handles the result from transport read.
    ///
    /// Returns `true` if the server should shut down.
    async fn handle_transport_result(
        &mut self,
        line_result: std::io::Result<Option<String>>,
    ) -> std::io::Result<bool> {
        let Some(line) = line_result? else {
            tracing::info!("stdin closed");
            self.state = ServerState::ShuttingDown;
            return Ok(true);
        };

        if !line.trim().is_empty() {
            self.handle_line(&line).await?;
        }

        Ok(false)
    }

    /// Handles a single line of input.
    async fn handle_line(&mut self, line: &str) -> std::io::Result<()> {
        match parse_message(line) {
            Ok(IncomingMessage::Request(req)) => self.handle_request(req).await,
            Ok(IncomingMessage::Notification(notif)) => {
                self.handle_notification(&notif);
                Ok(())
            }
            Err(error) => self.writer.send(&error.into()).await,
        }
    }

    /// Handles an incoming request.
    async fn handle_request(&mut self, req: JsonRpcRequest) -> std::io::Result<()> {
        let response = match req.method.as_str() {
            "initialize" => self.handle_initialize(&req),
            "ping" => Ok(JsonRpcResponse::success(req.id.clone(), json!({}))),
            "tools/list" => self.handle_tools_list(&req),
            "tools/call" => match self.spawn_tool_call(&req) {
                // The spawned task writes the reply.
                Ok(()) => return Ok(()),
                Err(error) => Err(error),
            },
            "resources/list" => self.handle_resources_list(&req),
            "resources/read" => self.handle_resources_read(&req),
            _ => Err(JsonRpcError::method_not_found(req.id.clone(), &req.method)),
        };

        self.writer.send(&OutgoingMessage::from(response)).await
    }

    /// Handles an incoming notification.
    fn handle_notification(&mut self, notif: &JsonRpcNotification) {
        match notif.method.as_str() {
            "notifications/initialized" if self.state == ServerState::Initialising => {
                tracing::info!("Client initialised, server running");
                self.state = ServerState::Running;
            }
            other => tracing::debug!(method = other, "Ignoring notification"),
        }
    }

    /// Handles the initialize request.
    fn handle_initialize(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        if self.state != ServerState::AwaitingInit {
            return Err(JsonRpcError::invalid_request(
                Some(req.id.clone()),
                "Server already initialised",
            ));
        }

        let params: InitializeParams = req.parse_params("initialize")?;
        if let Some(ref client) = params.client_info {
            tracing::info!(
                client = %client.name,
                client_version = client.version.as_deref().unwrap_or("unknown"),
                requested_version = %params.protocol_version,
                "Initialising session"
            );
        }

        let negotiated_version = MCP_PROTOCOL_VERSION.to_string();
        self.protocol_version = Some(negotiated_version.clone());
        self.state = ServerState::Initialising;

        let result = json!({
            "protocolVersion": negotiated_version,
            "capabilities": ServerCapabilities::default(),
            "serverInfo": ServerInfo::default(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the tools/list request.
    fn handle_tools_list(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let result = json!({
            "tools": self.context.registry.listings(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Validates a tools/call request and starts it on its own task.
    fn spawn_tool_call(&mut self, req: &JsonRpcRequest) -> Result<(), JsonRpcError> {
        self.require_running(&req.id)?;
        let params: ToolCallParams = req.parse_params("tool call")?;

        tracing::debug!(tool = %params.name, id = %req.id, "Dispatching tool call");

        let context = Arc::clone(&self.context);
        let writer = self.writer.clone();
        let id = req.id.clone();

        self.in_flight.spawn(async move {
            let result = context
                .registry
                .dispatch(&context.client, &params.name, &params.arguments)
                .await;

            let message: OutgoingMessage = match serde_json::to_value(&result) {
                Ok(value) => JsonRpcResponse::success(id, value).into(),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialise tool call result");
                    JsonRpcError::internal_error(id, "Internal error: failed to serialise result")
                        .into()
                }
            };

            if let Err(e) = writer.send(&message).await {
                tracing::error!(error = %e, tool = %params.name, "Failed to write tool call response");
            }
        });

        Ok(())
    }

    /// Handles the resources/list request.
    fn handle_resources_list(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let result = json!({
            "resources": [{
                "uri": RPC_INFO_URI,
                "name": "rpc_info",
                "description": "The configured JSON-RPC endpoint and network name",
                "mimeType": "text/plain",
            }],
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the resources/read request.
    fn handle_resources_read(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;
        let params: ResourceReadParams = req.parse_params("resource read")?;

        if params.uri != RPC_INFO_URI {
            return Err(JsonRpcError::resource_not_found(req.id.clone(), &params.uri));
        }

        let result = json!({
            "contents": [{
                "uri": RPC_INFO_URI,
                "mimeType": "text/plain",
                "text": self.context.rpc_info(),
            }],
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Ensures the server is in the Running state.
    fn require_running(&self, id: &RequestId) -> Result<(), JsonRpcError> {
        if self.state != ServerState::Running {
            return Err(JsonRpcError::invalid_request(
                Some(id.clone()),
                "Server not initialised",
            ));
        }
        Ok(())
    }
}
