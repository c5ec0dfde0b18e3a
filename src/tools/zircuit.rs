//! Zircuit sequencer-level security (SLS) tools.
//!
//! Zircuit nodes expose `zirc_*` methods for inspecting transactions held
//! in quarantine by the sequencer. These tools are only registered when the
//! endpoint reports the Zircuit chain id.

use futures::FutureExt;
use serde_json::Value;

use crate::rpc::RpcClient;
use crate::tools::{
    plain_text, pretty_json, InputSchema, ParamKind, ToolArguments, ToolDefinition, ToolFuture,
};

/// Chain id of Zircuit mainnet.
pub const ZIRCUIT_CHAIN_ID: u64 = 48900;

/// Returns `true` only for the Zircuit chain id.
#[must_use]
pub const fn is_zircuit_chain(chain_id: u64) -> bool {
    chain_id == ZIRCUIT_CHAIN_ID
}

/// Returns the Zircuit tool set.
#[must_use]
pub fn tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "zirc_isQuarantined",
            description: "Check whether a transaction is currently quarantined by the \
                          Zircuit sequencer.",
            input_schema: InputSchema::new().required(
                "transactionHash",
                ParamKind::String,
                "Hash of the transaction to check (0x-prefixed)",
            ),
            handler: is_quarantined,
        },
        ToolDefinition {
            name: "zirc_getQuarantined",
            description: "List transactions currently quarantined by the Zircuit sequencer, \
                          optionally filtered by sender address.",
            input_schema: InputSchema::new().optional(
                "address",
                ParamKind::String,
                "Only return quarantined transactions from this address",
            ),
            handler: get_quarantined,
        },
    ]
}

fn is_quarantined<'a>(client: &'a RpcClient, args: &'a ToolArguments) -> ToolFuture<'a> {
    async move {
        let params = vec![Value::from(args.str("transactionHash"))];
        client
            .call("zirc_isQuarantined", params)
            .await
            .map(plain_text)
    }
    .boxed()
}

fn get_quarantined<'a>(client: &'a RpcClient, args: &'a ToolArguments) -> ToolFuture<'a> {
    async move {
        let params: Vec<Value> = args.get_str("address").map(Value::from).into_iter().collect();
        client
            .call("zirc_getQuarantined", params)
            .await
            .map(|result| pretty_json(&result))
    }
    .boxed()
}
