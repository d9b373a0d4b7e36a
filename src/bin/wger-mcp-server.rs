// ABOUTME: Binary entry point: loads configuration, wires components, serves MCP on stdio
// ABOUTME: Prints actionable startup errors for common misconfiguration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 wger MCP Server contributors

//! wger MCP server binary.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use url::Url;

use wger_mcp_server::auth::AuthManager;
use wger_mcp_server::cache::TtlCache;
use wger_mcp_server::client::WgerClient;
use wger_mcp_server::config::ServerConfig;
use wger_mcp_server::errors::ErrorCode;
use wger_mcp_server::mcp::server::McpServer;
use wger_mcp_server::tools::{ToolExecutionContext, ToolRegistry};
use wger_mcp_server::transport::ReqwestTransport;

#[derive(Parser)]
#[command(name = "wger-mcp-server", version, about = "MCP server for the wger workout manager")]
struct Args {
    /// Override the wger API base URL (defaults to WGER_API_URL or wger.de).
    #[arg(long)]
    api_url: Option<Url>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing("info");
            error!("failed to load configuration: {e}");
            if e.code() == ErrorCode::ConfigurationError {
                eprintln!("\nError: {e}");
                eprintln!("Please set one of the following:");
                eprintln!("  - WGER_API_KEY environment variable");
                eprintln!("  - WGER_USERNAME and WGER_PASSWORD environment variables\n");
            }
            std::process::exit(1);
        }
    };

    let mut config = config;
    if let Some(api_url) = args.api_url {
        config.api_url = api_url;
    }

    init_tracing(&config.log_level);
    info!("initializing wger MCP server");
    debug!(
        api_url = %config.api_url,
        has_api_key = config.api_key.is_some(),
        has_username = config.username.is_some(),
        "configuration loaded"
    );

    let config = Arc::new(config);
    let transport = Arc::new(ReqwestTransport::new(config.http_timeout)?);
    let auth = Arc::new(AuthManager::new(&config, transport.clone()));
    let client = Arc::new(WgerClient::new(&config, transport, auth.clone()));
    let cache = Arc::new(TtlCache::new());

    let context = ToolExecutionContext {
        config,
        auth,
        client,
        cache: cache.clone(),
    };
    let server = McpServer::new(ToolRegistry::with_default_tools(), context);

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("server error: {e}");
                cache.destroy().await;
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("received interrupt, shutting down gracefully");
        }
    }

    cache.destroy().await;
    Ok(())
}

/// Route logs to stderr; stdout carries the MCP protocol.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wger_mcp_server={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
