//! fetch tool implementation.
//!
//! Sends one request through the agent's routing policy. Pass-through
//! requests are performed on the network, exactly as the host would.

use std::collections::BTreeMap;

use neu_client::Agent;
use neu_client::fetch::resolve;
use neu_core::{Method, Request};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::error::HostError;

/// Input parameters for the fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchParams {
    /// Absolute URL, or a path resolved against the agent's origin.
    pub url: String,

    /// Request method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Optional Accept header. `text/html` makes the request a navigation.
    #[serde(default)]
    pub accept: Option<String>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for the fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchOutput {
    /// The resolved request URL.
    pub url: String,
    /// "cache", "network", "fallback", or "passthrough".
    pub source: String,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
    pub body_len: usize,
}

/// Implementation of the fetch tool.
pub async fn fetch_impl(agent: &Agent, params: FetchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(HostError::InvalidInput("url cannot be empty".into()).into());
    }

    let url = resolve(&agent.config().origin, &params.url).map_err(|e| HostError::InvalidInput(e.to_string()))?;
    let mut request = Request::new(Method::from(params.method.as_str()), url);
    if let Some(accept) = params.accept {
        request = request.with_header("accept", accept);
    }

    let served = agent.respond(&request).await?;
    tracing::debug!(url = %request.url, source = served.source.as_str(), status = served.response.status, "served");

    json_result(&FetchOutput {
        url: request.url.to_string(),
        source: served.source.as_str().to_string(),
        status: served.response.status,
        body: served.response.text(),
        body_len: served.response.body.len(),
        headers: served.response.headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{output, stub_agent};

    fn params(url: &str, method: &str, accept: Option<&str>) -> FetchParams {
        FetchParams { url: url.into(), method: method.into(), accept: accept.map(Into::into) }
    }

    #[tokio::test]
    async fn test_fetch_empty_url() {
        let (agent, _) = stub_agent("x-neu-v1").await;
        assert!(fetch_impl(&agent, params("", "GET", None)).await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_static_then_cached() {
        let (agent, network) = stub_agent("x-neu-v1").await;
        agent.install().await.unwrap();
        network.serve("/app.js", 200, "console.log(1)");

        let first: FetchOutput = output(&fetch_impl(&agent, params("/app.js", "GET", None)).await.unwrap());
        assert_eq!(first.source, "network");
        assert_eq!(first.url, "http://localhost:8080/app.js");

        agent.settle().await;
        network.go_offline();

        let second: FetchOutput = output(&fetch_impl(&agent, params("/app.js", "GET", None)).await.unwrap());
        assert_eq!(second.source, "cache");
        assert_eq!(second.body, "console.log(1)");
    }

    #[tokio::test]
    async fn test_fetch_navigation_offline_fallback() {
        let (agent, network) = stub_agent("x-neu-v1").await;
        agent.install().await.unwrap();
        network.go_offline();

        let out: FetchOutput =
            output(&fetch_impl(&agent, params("/profile", "GET", Some("text/html"))).await.unwrap());
        assert_eq!(out.source, "fallback");
        assert_eq!(out.body, "<html>shell</html>");
    }

    #[tokio::test]
    async fn test_fetch_api_offline_is_error() {
        let (agent, network) = stub_agent("x-neu-v1").await;
        network.go_offline();

        let result = fetch_impl(&agent, params("/api/checkin", "GET", None)).await;
        let err = result.unwrap_err();
        assert_eq!(err.code.0, -32006);
    }

    #[tokio::test]
    async fn test_fetch_post_passes_through() {
        let (agent, network) = stub_agent("x-neu-v1").await;
        network.serve("/api/checkin", 201, "ok");

        let out: FetchOutput = output(&fetch_impl(&agent, params("/api/checkin", "post", None)).await.unwrap());
        assert_eq!(out.source, "passthrough");
        assert_eq!(out.status, 201);
    }
}
