//! evm-rpc-mcp: MCP server exposing EVM JSON-RPC endpoints as AI tools
//!
//! Startup is fail-fast: if the endpoint cannot be resolved or reached the
//! process exits with status 1 before serving any request.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

use evm_rpc_mcp::config::{self, ServerConfig};
use evm_rpc_mcp::mcp::{McpServer, ServerContext};
use evm_rpc_mcp::rpc::{identify_chain, validate_connectivity, RpcClient, DEFAULT_CHAIN_ID};
use evm_rpc_mcp::tools::build_registry;

/// MCP server exposing an EVM JSON-RPC endpoint as AI tools.
///
/// Every tool call becomes one JSON-RPC request against the configured
/// node. Zircuit quarantine tools are added automatically on Zircuit.
#[derive(Parser, Debug)]
#[command(name = "evm-rpc-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON-RPC endpoint URL (default: https://eth.llamarpc.com)
    #[arg(value_name = "RPC_URL", env = "RPC_URL")]
    rpc_url: Option<String>,

    /// Human-readable network name (default: Ethereum)
    #[arg(value_name = "CHAIN_NAME", env = "CHAIN_NAME")]
    chain_name: Option<String>,

    /// Path to configuration file
    #[arg(short, long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber. stdout is the MCP transport, so
/// logs go to stderr.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the evm-rpc-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let config_path = args.config.as_deref();
    let file_config = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &file_config.logging.level);
    init_tracing(log_level);

    if args.rpc_url.is_none() && file_config.rpc_url.is_none() {
        info!(
            default = config::DEFAULT_RPC_URL,
            "No RPC URL provided, using default"
        );
    }

    let server_config = match ServerConfig::resolve(
        args.rpc_url.as_deref(),
        args.chain_name.as_deref(),
        &file_config,
    ) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "Invalid endpoint configuration");
            return ExitCode::FAILURE;
        }
    };

    // Display GPL license notice (required by GPLv3 Section 5d)
    eprintln!(
        "evm-rpc-mcp {}  Copyright (C) 2026  The Embedded Society",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("This program comes with ABSOLUTELY NO WARRANTY.");
    eprintln!("This is free software, licensed under GPL-3.0-or-later.");
    eprintln!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
    eprintln!();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        rpc_url = %server_config.configured_url,
        chain_name = %server_config.chain_name,
        "Starting evm-rpc-mcp server"
    );

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(serve(server_config))
}

/// Runs the startup sequence, then serves MCP until shutdown.
async fn serve(server_config: ServerConfig) -> ExitCode {
    let client = match RpcClient::from_config(&server_config) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to create HTTP client");
            return ExitCode::FAILURE;
        }
    };

    if validate_connectivity(&client).await.is_err() {
        return ExitCode::FAILURE;
    }

    let chain_id = match identify_chain(&client).await {
        Ok(chain_id) => {
            info!(chain_id, "Connected to network");
            chain_id
        }
        Err(e) => {
            warn!(
                error = %e,
                fallback = DEFAULT_CHAIN_ID,
                "Could not retrieve chain ID, continuing with default"
            );
            DEFAULT_CHAIN_ID
        }
    };

    let registry = match build_registry(chain_id) {
        Ok(registry) => registry,
        Err(e) => {
            error!(error = %e, "Failed to register tools");
            return ExitCode::FAILURE;
        }
    };

    info!(tools = registry.len(), "MCP server ready, waiting for client connection...");

    let mut server = McpServer::new(ServerContext::new(server_config, client, registry));

    match server.run().await {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
