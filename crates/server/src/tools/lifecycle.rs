//! lifecycle_install and lifecycle_activate tool implementations.

use neu_client::Agent;
use neu_client::agent::AssetFailure;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Output from the lifecycle_install tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InstallOutput {
    /// Version tag of the bucket that was opened.
    pub version: String,
    /// Manifest entries stored in the bucket.
    pub cached: Vec<String>,
    /// Manifest entries that were skipped, with the reason.
    pub failed: Vec<AssetFailure>,
    /// Whether the host should skip the waiting phase.
    pub skip_waiting: bool,
}

/// Output from the lifecycle_activate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ActivateOutput {
    /// Version tag that is now current.
    pub version: String,
    /// Superseded buckets that were deleted.
    pub deleted: Vec<String>,
    /// Whether open clients were claimed.
    pub clients_claimed: bool,
}

/// Implementation of the lifecycle_install tool.
pub async fn install_impl(agent: &Agent) -> Result<CallToolResult, McpError> {
    let outcome = agent.install().await?;

    json_result(&InstallOutput {
        version: outcome.version,
        cached: outcome.cached,
        failed: outcome.failed,
        skip_waiting: outcome.skip_waiting,
    })
}

/// Implementation of the lifecycle_activate tool.
pub async fn activate_impl(agent: &Agent) -> Result<CallToolResult, McpError> {
    let outcome = agent.activate().await?;

    json_result(&ActivateOutput {
        version: outcome.version,
        deleted: outcome.deleted,
        clients_claimed: outcome.clients_claimed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{output, stub_agent};

    #[tokio::test]
    async fn test_install_reports_failures() {
        let (agent, network) = stub_agent("x-neu-v1").await;
        network.serve("/index.html", 503, "");

        let result = install_impl(&agent).await.unwrap();
        let out: InstallOutput = output(&result);

        assert_eq!(out.version, "x-neu-v1");
        assert_eq!(out.cached, vec!["/".to_string()]);
        assert_eq!(out.failed.len(), 1);
        assert_eq!(out.failed[0].asset, "/index.html");
        assert!(out.skip_waiting);
    }

    #[tokio::test]
    async fn test_activate_purges_old_versions() {
        let (agent, _network) = stub_agent("x-neu-v2").await;
        agent.storage().open("x-neu-v1").await.unwrap();
        install_impl(&agent).await.unwrap();

        let result = activate_impl(&agent).await.unwrap();
        let out: ActivateOutput = output(&result);

        assert_eq!(out.deleted, vec!["x-neu-v1".to_string()]);
        assert!(out.clients_claimed);
        assert_eq!(agent.storage().keys().await.unwrap(), vec!["x-neu-v2".to_string()]);
    }
}
