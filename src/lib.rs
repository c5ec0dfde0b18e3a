//! evm-rpc-mcp: MCP server exposing EVM JSON-RPC endpoints as AI tools
//!
//! Every tool maps onto a single JSON-RPC 2.0 call against one configured
//! node endpoint. Calls are independent round trips with no caching,
//! retries or batching.
//!
//! # Startup
//!
//! 1. Resolve the endpoint and network label ([`config`])
//! 2. Check the endpoint is live with `eth_blockNumber` ([`rpc::startup`])
//! 3. Read the chain id with `eth_chainId`
//! 4. Register the base tools plus any chain extensions ([`tools`])
//! 5. Serve MCP over stdio ([`mcp`])
//!
//! # Modules
//!
//! - [`config`] — Configuration loading and resolution
//! - [`error`] — Error types
//! - [`rpc`] — JSON-RPC client towards the node
//! - [`tools`] — Tool registry, base tools and chain extensions
//! - [`mcp`] — MCP protocol implementation

pub mod config;
pub mod error;
pub mod mcp;
pub mod rpc;
pub mod tools;
