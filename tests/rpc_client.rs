//! Integration tests for the JSON-RPC client.
//!
//! A mockito server stands in for the blockchain node.

use std::time::Duration;

use evm_rpc_mcp::error::RpcErrorKind;
use evm_rpc_mcp::rpc::RpcClient;
use mockito::Matcher;
use serde_json::{json, Value};
use url::Url;

fn client_for(url: &str) -> RpcClient {
    RpcClient::new(Url::parse(url).unwrap(), Duration::from_secs(5)).unwrap()
}

// =============================================================================
// Request Shape
// =============================================================================

#[tokio::test]
async fn test_request_carries_version_and_id() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_header("content-type", "application/json")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({
                "jsonrpc": "2.0",
                "method": "eth_blockNumber",
                "params": [],
            })),
            Matcher::Regex(r#""id":[1-9][0-9]*"#.to_string()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x10"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let result = client.call("eth_blockNumber", vec![]).await.unwrap();

    assert_eq!(result, json!("0x10"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_params_are_sent_in_order() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({
            "method": "eth_getStorageAt",
            "params": ["0xabc", "0x0", "latest"],
        })))
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x00"}"#)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let params = vec![json!("0xabc"), json!("0x0"), json!("latest")];
    client.call("eth_getStorageAt", params).await.unwrap();

    mock.assert_async().await;
}

// =============================================================================
// Result Handling
// =============================================================================

#[tokio::test]
async fn test_object_result_is_returned_unchanged() {
    let block = json!({
        "number": "0x1b4",
        "hash": "0xdc0818cf78f21a8e70579cb46a43643f78291264dda342ae31049421c82d21ae",
        "transactions": [],
        "uncles": [],
    });

    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .with_body(json!({"jsonrpc": "2.0", "id": 1, "result": block}).to_string())
        .create_async()
        .await;

    let client = client_for(&server.url());
    let result = client
        .call("eth_getBlockByNumber", vec![json!("0x1b4"), json!(false)])
        .await
        .unwrap();

    assert_eq!(result, block);
}

#[tokio::test]
async fn test_null_result_is_success() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":null}"#)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let result = client
        .call("eth_getTransactionReceipt", vec![json!("0xdead")])
        .await
        .unwrap();

    assert_eq!(result, Value::Null);
}

// =============================================================================
// Error Classification
// =============================================================================

#[tokio::test]
async fn test_rpc_error_message_is_preserved() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"error":{"message":"boom"}}"#)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let err = client
        .call("eth_call", vec![json!("0x1")])
        .await
        .unwrap_err();

    assert_eq!(err.rpc_message(), Some("boom"));
    assert!(matches!(err.kind, RpcErrorKind::Rpc { code: None, .. }));
    assert_eq!(err.method, "eth_call");
    assert_eq!(err.params, vec![json!("0x1")]);
}

#[tokio::test]
async fn test_rpc_error_code_on_http_error_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(400)
        .with_body(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"the method eth_foo does not exist"}}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server.url());
    let err = client.call("eth_foo", vec![]).await.unwrap_err();

    match err.kind {
        RpcErrorKind::Rpc { message, code } => {
            assert_eq!(message, "the method eth_foo does not exist");
            assert_eq!(code, Some(-32601));
        }
        other => panic!("Expected Rpc error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_error_without_json_is_transport() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(502)
        .with_body("<html>Bad Gateway</html>")
        .create_async()
        .await;

    let client = client_for(&server.url());
    let err = client.call("eth_blockNumber", vec![]).await.unwrap_err();

    assert!(err.is_transport());
    assert!(err.to_string().contains("502"));
}

#[tokio::test]
async fn test_malformed_body_is_transport() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .with_body("definitely not json")
        .create_async()
        .await;

    let client = client_for(&server.url());
    let err = client.call("eth_blockNumber", vec![]).await.unwrap_err();

    assert!(err.is_transport());
    let text = err.to_string();
    assert!(text.starts_with("transport error: malformed response body: "));
    assert!(text.contains("expected value"), "decoder reason missing: {text}");
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport() {
    let client = client_for("http://127.0.0.1:1");
    let err = client.call("eth_blockNumber", vec![]).await.unwrap_err();

    assert!(err.is_transport());
    assert!(err.to_string().starts_with("transport error: connection failed: "));
    assert_eq!(err.method, "eth_blockNumber");
}

#[tokio::test]
async fn test_timeout_is_transport() {
    // Accepts connections at the TCP level but never answers.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let client = RpcClient::new(Url::parse(&url).unwrap(), Duration::from_millis(200)).unwrap();
    let err = client.call("eth_blockNumber", vec![]).await.unwrap_err();

    assert!(err.is_transport());
    assert!(err.to_string().starts_with("transport error: request timed out: "));
    drop(listener);
}

#[tokio::test]
async fn test_timeout_and_refusal_are_distinguishable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let silent = format!("http://{}", listener.local_addr().unwrap());

    let slow = RpcClient::new(Url::parse(&silent).unwrap(), Duration::from_millis(200)).unwrap();
    let refused = client_for("http://127.0.0.1:1");

    let timed_out = slow.call("eth_blockNumber", vec![]).await.unwrap_err();
    let unreachable = refused.call("eth_blockNumber", vec![]).await.unwrap_err();

    assert_ne!(timed_out.to_string(), unreachable.to_string());
    drop(listener);
}

#[tokio::test]
async fn test_empty_method_makes_no_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/").expect(0).create_async().await;

    let client = client_for(&server.url());
    let err = client.call("", vec![]).await.unwrap_err();

    assert!(matches!(err.kind, RpcErrorKind::InvalidRequest));
    mock.assert_async().await;
}
