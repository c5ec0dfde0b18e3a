//! Startup probes: connectivity check and chain identification.
//!
//! Both run once, in order, before the MCP server starts serving.

use serde_json::Value;

use crate::error::StartupError;
use crate::rpc::RpcClient;

/// Chain id assumed when the endpoint does not report one.
pub const DEFAULT_CHAIN_ID: u64 = 1;

/// Confirms the endpoint is live by fetching the current block number.
///
/// Returns the raw block number reported by the endpoint.
///
/// # Errors
///
/// Returns [`StartupError::Unreachable`] if the canary call fails for any
/// reason. The caller is expected to treat this as fatal.
pub async fn validate_connectivity(client: &RpcClient) -> Result<Value, StartupError> {
    match client.call("eth_blockNumber", Vec::new()).await {
        Ok(block) => {
            tracing::info!(
                endpoint = %client.endpoint(),
                block_number = %block,
                "RPC endpoint is reachable"
            );
            Ok(block)
        }
        Err(e) => {
            tracing::error!(
                endpoint = %client.endpoint(),
                error = %e,
                "Could not reach RPC endpoint; check the URL and that the node is running"
            );
            Err(StartupError::Unreachable(e))
        }
    }
}

/// Queries `eth_chainId` and decodes it.
///
/// # Errors
///
/// Propagates RPC failures as [`StartupError::Rpc`], and returns
/// [`StartupError::InvalidChainId`] if the result is not a hex string.
pub async fn identify_chain(client: &RpcClient) -> Result<u64, StartupError> {
    let result = client.call("eth_chainId", Vec::new()).await?;

    let Value::String(hex) = result else {
        return Err(StartupError::InvalidChainId {
            value: result.to_string(),
        });
    };

    parse_chain_id(&hex).ok_or(StartupError::InvalidChainId { value: hex })
}

/// Decodes a hex quantity such as `"0x1"` or `"BEDC"` into an integer.
///
/// The `0x` prefix is optional and digits are case-insensitive.
#[must_use]
pub fn parse_chain_id(hex: &str) -> Option<u64> {
    let digits = hex
        .trim()
        .strip_prefix("0x")
        .or_else(|| hex.trim().strip_prefix("0X"))
        .unwrap_or_else(|| hex.trim());

    if digits.is_empty() {
        return None;
    }

    u64::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_prefixed_hex() {
        assert_eq!(parse_chain_id("0x1"), Some(1));
        assert_eq!(parse_chain_id("0xBEDC"), Some(48860));
        assert_eq!(parse_chain_id("0xbf04"), Some(48900));
        assert_eq!(parse_chain_id("0XBF04"), Some(48900));
    }

    #[test]
    fn parse_unprefixed_hex() {
        assert_eq!(parse_chain_id("bedc"), Some(48860));
        assert_eq!(parse_chain_id("1"), Some(1));
    }

    #[test]
    fn reject_invalid_hex() {
        assert_eq!(parse_chain_id(""), None);
        assert_eq!(parse_chain_id("0x"), None);
        assert_eq!(parse_chain_id("0xzz"), None);
        assert_eq!(parse_chain_id("-0x1"), None);
    }
}
