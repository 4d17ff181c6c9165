//! neu-agent entry point.
//!
//! Boots the resource cache agent behind an MCP server on stdio transport, so
//! a host can dispatch lifecycle events and inspect the cache as tool calls.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use neu_client::{Agent, AgentConfig, FetchClient, FetchConfig};
use neu_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(version = %config.cache_version, db = %config.db_path.display(), "starting neu-agent on stdio transport");

    let storage = CacheDb::open(&config.db_path).await?;
    let network = FetchClient::new(FetchConfig::from(&config))?;
    let agent = Arc::new(Agent::new(AgentConfig::from_app_config(&config)?, Arc::new(storage), Arc::new(network)));

    let handler = handler::AgentHost::new(agent.clone());
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    tracing::info!(pending = agent.pending_writes(), "transport closed; flushing cache writes");
    agent.settle().await;

    Ok(())
}
