//! cache_list tool implementation.
//!
//! Lists every bucket with its entries.

use neu_client::Agent;
use neu_core::{Bucket, StoredEntry};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// One bucket in the listing.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BucketListing {
    pub name: String,
    /// Whether this is the agent's current version.
    pub current: bool,
    pub entries: Vec<StoredEntry>,
}

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheListOutput {
    pub version: String,
    pub buckets: Vec<BucketListing>,
}

/// Implementation of the cache_list tool.
pub async fn list_impl(agent: &Agent) -> Result<CallToolResult, McpError> {
    let mut buckets = Vec::new();
    for name in agent.storage().keys().await? {
        let entries = Bucket::named(agent.storage().clone(), name.clone()).entries().await?;
        buckets.push(BucketListing { current: name == agent.version(), name, entries });
    }

    json_result(&CacheListOutput { version: agent.version().to_string(), buckets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{output, stub_agent};

    #[tokio::test]
    async fn test_list_marks_current() {
        let (agent, _) = stub_agent("x-neu-v2").await;
        agent.storage().open("x-neu-v1").await.unwrap();
        agent.install().await.unwrap();

        let out: CacheListOutput = output(&list_impl(&agent).await.unwrap());

        assert_eq!(out.version, "x-neu-v2");
        assert_eq!(out.buckets.len(), 2);
        assert!(!out.buckets[0].current);
        assert!(out.buckets[1].current);
        assert_eq!(out.buckets[1].entries.len(), 2);
    }

    #[tokio::test]
    async fn test_list_empty() {
        let (agent, _) = stub_agent("x-neu-v1").await;
        let out: CacheListOutput = output(&list_impl(&agent).await.unwrap());
        assert!(out.buckets.is_empty());
    }
}
