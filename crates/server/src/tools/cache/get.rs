//! cache_get tool implementation.
//!
//! Retrieves the cached response for a URL from the current bucket.

use std::collections::BTreeMap;

use neu_client::Agent;
use neu_client::fetch::resolve;
use neu_core::{Error, Request};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::HostError;
use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Absolute URL, or a path resolved against the agent's origin.
    pub url: String,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub bucket: String,
    pub url: String,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(agent: &Agent, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let url = resolve(&agent.config().origin, &params.url).map_err(|e| HostError::InvalidInput(e.to_string()))?;
    let request = Request::get(url);
    let bucket = agent.bucket();

    let response = bucket
        .get(&request)
        .await?
        .ok_or_else(|| Error::CacheMiss(request.url.to_string()))?;

    json_result(&CacheGetOutput {
        bucket: bucket.name().to_string(),
        url: request.url.to_string(),
        status: response.status,
        body: response.text(),
        headers: response.headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{output, stub_agent};

    #[tokio::test]
    async fn test_get_impl_missing() {
        let (agent, _) = stub_agent("x-neu-v1").await;
        let params = CacheGetParams { url: "/nonexistent.js".to_string() };

        let err = get_impl(&agent, params).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }

    #[tokio::test]
    async fn test_get_impl_found() {
        let (agent, _) = stub_agent("x-neu-v1").await;
        agent.install().await.unwrap();

        let params = CacheGetParams { url: "/index.html".to_string() };
        let out: CacheGetOutput = output(&get_impl(&agent, params).await.unwrap());

        assert_eq!(out.bucket, "x-neu-v1");
        assert_eq!(out.status, 200);
        assert_eq!(out.body, "<html>shell</html>");
    }
}
