//! JSON-RPC client side: talking to the blockchain node.
//!
//! - [`message`] — outbound request and inbound response envelopes
//! - [`client`] — the HTTP client and failure classification
//! - [`startup`] — connectivity check and chain identification

pub mod client;
pub mod message;
pub mod startup;

pub use client::RpcClient;
pub use message::{RpcErrorObject, RpcRequest, RpcResponse};
pub use startup::{identify_chain, parse_chain_id, validate_connectivity, DEFAULT_CHAIN_ID};
