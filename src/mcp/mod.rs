//! Model Context Protocol (MCP) server implementation.
//!
//! This module exposes the registered JSON-RPC tools to AI assistants. The
//! server communicates over stdio transport using JSON-RPC 2.0 messages.
//!
//! # Architecture
//!
//! ```text
//!   stdin ──▶ Transport ──▶ Server ──▶ Tool Registry ──▶ RPC Client ──▶ node
//!                          (lifecycle)   (dispatch)
//!   stdout ◀── MessageWriter ◀── per-call task
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod protocol;
pub mod server;
pub mod transport;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};
pub use server::{McpServer, ServerContext};
pub use transport::{MessageWriter, StdioReader};
