//! MCP server handler implementation.
//!
//! This module defines the host harness that turns tool calls into agent
//! lifecycle events and cache inspections.
use std::sync::Arc;

use neu_client::Agent;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

use crate::tools::cache::{CacheGetParams, get_impl, list_impl};
use crate::tools::fetch::{FetchParams, fetch_impl};
use crate::tools::lifecycle::{activate_impl, install_impl};
use crate::tools::sync::{SyncParams, sync_impl};

/// Host harness dispatching MCP tool calls to the cache agent.
#[derive(Clone)]
pub struct AgentHost {
    agent: Arc<Agent>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl AgentHost {
    /// Create a new host around an agent.
    pub fn new(agent: Arc<Agent>) -> Self {
        Self { agent, tool_router: Self::tool_router() }
    }

    /// Dispatch the install event.
    #[tool(description = "Run the install lifecycle event: open the versioned cache bucket and pre-cache the static asset manifest. Asset failures are reported, never fatal.")]
    async fn lifecycle_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.agent).await
    }

    /// Dispatch the activate event.
    #[tool(description = "Run the activate lifecycle event: delete every cache bucket except the current version and claim clients.")]
    async fn lifecycle_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.agent).await
    }

    /// Dispatch a fetch event.
    #[tool(description = "Send a request through the cache agent. Returns the response and whether it came from cache, network, the offline fallback, or a pass-through.")]
    async fn fetch(&self, params: Parameters<FetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.agent, params.0).await
    }

    /// Dispatch a background sync signal.
    #[tool(description = "Deliver a background sync signal with the given tag. Registered tags run their deferred task; others are ignored.")]
    async fn sync(&self, params: Parameters<SyncParams>) -> Result<CallToolResult, McpError> {
        sync_impl(&self.agent, params.0).await
    }

    /// Read one entry from the current bucket.
    #[tool(description = "Look up the cached response for a URL in the current bucket without touching the network.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.agent, params.0).await
    }

    /// List buckets and entries.
    #[tool(description = "List every cache bucket with its entries, marking the current version.")]
    async fn cache_list(&self) -> Result<CallToolResult, McpError> {
        list_impl(&self.agent).await
    }
}

impl ServerHandler for AgentHost {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "neu-agent".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::stub_agent;

    #[tokio::test]
    async fn test_registers_one_tool_per_event_and_cache_view() {
        let host = AgentHost::new(stub_agent("x-neu-v1").await.0);
        let mut names: Vec<String> = host
            .tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        names.sort();

        assert_eq!(
            names,
            vec!["cache_get", "cache_list", "fetch", "lifecycle_activate", "lifecycle_install", "sync"]
        );
    }

    #[tokio::test]
    async fn test_server_info() {
        let host = AgentHost::new(stub_agent("x-neu-v1").await.0);
        let info = host.get_info();
        assert_eq!(info.server_info.name, "neu-agent");
    }
}
