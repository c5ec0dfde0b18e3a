//! Integration tests for the startup sequence.
//!
//! Covers the connectivity probe, chain identification and the process
//! exit status when the endpoint is unusable.

use std::process::{Command, Stdio};
use std::time::Duration;

use evm_rpc_mcp::error::StartupError;
use evm_rpc_mcp::rpc::{identify_chain, validate_connectivity, RpcClient};
use mockito::Matcher;
use serde_json::json;
use url::Url;

fn client_for(url: &str) -> RpcClient {
    RpcClient::new(Url::parse(url).unwrap(), Duration::from_secs(5)).unwrap()
}

// =============================================================================
// Connectivity Probe
// =============================================================================

#[tokio::test]
async fn test_connectivity_returns_block_number() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({"method": "eth_blockNumber", "params": []})))
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x4b7"}"#)
        .expect(1)
        .create_async()
        .await;

    let block = validate_connectivity(&client_for(&server.url())).await.unwrap();

    assert_eq!(block, json!("0x4b7"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_connectivity_unreachable() {
    let err = validate_connectivity(&client_for("http://127.0.0.1:1"))
        .await
        .unwrap_err();

    match err {
        StartupError::Unreachable(inner) => assert!(inner.is_transport()),
        other => panic!("Expected Unreachable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connectivity_rpc_error_is_fatal() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32005,"message":"rate limited"}}"#)
        .create_async()
        .await;

    let err = validate_connectivity(&client_for(&server.url()))
        .await
        .unwrap_err();

    match err {
        StartupError::Unreachable(inner) => assert_eq!(inner.rpc_message(), Some("rate limited")),
        other => panic!("Expected Unreachable, got {other:?}"),
    }
}

// =============================================================================
// Chain Identification
// =============================================================================

#[tokio::test]
async fn test_identify_zircuit() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({"method": "eth_chainId"})))
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0xbf04"}"#)
        .create_async()
        .await;

    let chain_id = identify_chain(&client_for(&server.url())).await.unwrap();
    assert_eq!(chain_id, 48900);
}

#[tokio::test]
async fn test_identify_rejects_non_string_result() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":1}"#)
        .create_async()
        .await;

    let err = identify_chain(&client_for(&server.url())).await.unwrap_err();
    assert!(matches!(err, StartupError::InvalidChainId { ref value } if value == "1"));
}

#[tokio::test]
async fn test_identify_rejects_bad_hex() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0xzz"}"#)
        .create_async()
        .await;

    let err = identify_chain(&client_for(&server.url())).await.unwrap_err();
    assert!(matches!(err, StartupError::InvalidChainId { .. }));
}

#[tokio::test]
async fn test_identify_propagates_rpc_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"error":{"message":"method not supported"}}"#)
        .create_async()
        .await;

    let err = identify_chain(&client_for(&server.url())).await.unwrap_err();
    assert!(matches!(err, StartupError::Rpc(_)));
    assert_eq!(err.to_string(), "RPC Error: method not supported");
}

// =============================================================================
// Process Exit Status
// =============================================================================

fn server_command(home: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_evm-rpc-mcp"));
    cmd.env_remove("RPC_URL")
        .env_remove("CHAIN_NAME")
        .env("HOME", home)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());
    cmd
}

#[test]
fn test_exit_status_when_endpoint_unreachable() {
    let home = tempfile::tempdir().unwrap();

    let output = server_command(home.path())
        .arg("http://127.0.0.1:1")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty(), "nothing may be served before startup succeeds");
}

#[test]
fn test_exit_status_when_endpoint_blank() {
    let home = tempfile::tempdir().unwrap();

    let output = server_command(home.path()).arg("  ").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_exit_status_when_config_file_missing() {
    let home = tempfile::tempdir().unwrap();
    let missing = home.path().join("nope.json");

    let output = server_command(home.path())
        .arg("--config")
        .arg(&missing)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_endpoint_from_config_file() {
    let mut server = mockito::Server::new();
    let probe = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({"method": "eth_blockNumber"})))
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#)
        .expect(1)
        .create();
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({"method": "eth_chainId"})))
        .with_body(r#"{"jsonrpc":"2.0","id":2,"result":"0x1"}"#)
        .create();

    let home = tempfile::tempdir().unwrap();
    let config_path = home.path().join("config.json");
    std::fs::write(
        &config_path,
        json!({"rpc_url": server.url(), "chain_name": "Local"}).to_string(),
    )
    .unwrap();

    let output = server_command(home.path())
        .arg("--config")
        .arg(&config_path)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    probe.assert();
}
