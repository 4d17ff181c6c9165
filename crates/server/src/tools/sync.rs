//! sync tool implementation.

use neu_client::{Agent, SyncEvent, SyncOutcome};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::error::HostError;

/// Parameters for the sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SyncParams {
    /// Sync tag registered by the application (e.g. "sync-checkins").
    pub tag: String,

    /// Whether the host will stop retrying this tag after this attempt.
    #[serde(default)]
    pub last_chance: bool,
}

/// Output from the sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SyncOutput {
    pub tag: String,
    /// "completed" or "ignored".
    pub status: String,
}

/// Implementation of the sync tool.
pub async fn sync_impl(agent: &Agent, params: SyncParams) -> Result<CallToolResult, McpError> {
    if params.tag.trim().is_empty() {
        return Err(HostError::InvalidInput("tag cannot be empty".into()).into());
    }

    let event = SyncEvent { tag: params.tag, last_chance: params.last_chance };
    let output = match agent.handle_sync(&event).await? {
        SyncOutcome::Completed { tag } => SyncOutput { tag, status: "completed".into() },
        SyncOutcome::Ignored { tag } => SyncOutput { tag, status: "ignored".into() },
    };

    json_result(&output)
}
