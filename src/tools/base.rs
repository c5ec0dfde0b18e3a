//! Tools available on every network.

use futures::FutureExt;
use serde_json::Value;

use crate::rpc::RpcClient;
use crate::tools::{
    plain_text, pretty_json, InputSchema, ParamKind, ToolArguments, ToolDefinition, ToolFuture,
};

/// Returns the base tool set.
#[must_use]
pub fn tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "generic_eth_json_rpc",
            description: "Execute any Ethereum JSON-RPC method against the configured endpoint \
                          and return the result as JSON.\n\
                          Parameters:\n\
                          - method (string, REQUIRED): The JSON-RPC method to execute.\n\
                          - params (array, REQUIRED): The parameters for the JSON-RPC method.",
            input_schema: InputSchema::new()
                .required(
                    "method",
                    ParamKind::String,
                    "The JSON-RPC method to execute (e.g. eth_getBlockByNumber)",
                )
                .required(
                    "params",
                    ParamKind::StringArray,
                    "Positional parameters for the method, passed verbatim",
                ),
            handler: generic_eth_json_rpc,
        },
        ToolDefinition {
            name: "eth_getBalance",
            description: "Get the balance (in wei, hex encoded) of an account at the latest block.",
            input_schema: InputSchema::new().required(
                "address",
                ParamKind::String,
                "The account address (0x-prefixed)",
            ),
            handler: eth_get_balance,
        },
    ]
}

fn generic_eth_json_rpc<'a>(client: &'a RpcClient, args: &'a ToolArguments) -> ToolFuture<'a> {
    async move {
        client
            .call(args.str("method"), args.string_array("params"))
            .await
            .map(|result| pretty_json(&result))
    }
    .boxed()
}

fn eth_get_balance<'a>(client: &'a RpcClient, args: &'a ToolArguments) -> ToolFuture<'a> {
    async move {
        let params: Vec<Value> = vec![args.str("address").into(), "latest".into()];
        client
            .call("eth_getBalance", params)
            .await
            .map(plain_text)
    }
    .boxed()
}
