// Standalone MCP server binary

use anyhow::{Context, Result};
use plaid_mcp::server::McpServer;
use plaid_mcp::tools::{register_plaid_tools, ToolRegistry};
use plaid_mcp::transport::StdioTransport;
use plaid_sdk::{HostConfig, HttpTransport, SessionConfigHolder};
use std::sync::Arc;

/// Configuration the launching host passed through the process environment.
fn host_config_from_env() -> HostConfig {
    HostConfig {
        plaid_client_id: std::env::var("PLAID_CLIENT_ID").ok(),
        plaid_secret: std::env::var("PLAID_SECRET").ok(),
        plaid_env: std::env::var("PLAID_ENV").ok(),
        plaid_base_url: std::env::var("PLAID_BASE_URL").ok(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::info!("Plaid MCP Server starting...");

    let session = Arc::new(SessionConfigHolder::new());
    let host_config = host_config_from_env();
    if !host_config.is_empty() {
        session.apply(&host_config).await;
    } else {
        tracing::info!("No Plaid configuration in environment, waiting for the host to provide it");
    }

    let transport = HttpTransport::new(session.clone()).context("Failed to create HTTP client")?;

    let mut registry = ToolRegistry::new();
    register_plaid_tools(&mut registry, &transport)?;
    anyhow::ensure!(!registry.is_empty(), "No tools registered");

    tracing::info!("Registered {} tools", registry.len());

    let mut server = McpServer::new(registry, session);
    server.run(&mut StdioTransport::stdio()).await?;

    Ok(())
}
