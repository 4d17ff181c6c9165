//! Structured errors raised by the host harness itself.
//!
//! Agent and storage failures arrive as `neu_core::Error` and map through its
//! own conversion; these cover tool parameters and output encoding.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Errors raised while translating tool calls into agent events.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Invalid tool parameters (e.g., empty URL).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Tool output could not be encoded as JSON.
    #[error("ENCODE_FAILED: {0}")]
    EncodeFailed(String),
}

impl From<HostError> for McpError {
    fn from(err: HostError) -> Self {
        let (code, message) = match &err {
            HostError::InvalidInput(msg) => (-32602, msg.clone()),
            HostError::EncodeFailed(msg) => (-32603, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_maps_to_invalid_params() {
        let mcp_err: McpError = HostError::InvalidInput("url cannot be empty".into()).into();
        assert_eq!(mcp_err.code.0, -32602);
        assert_eq!(mcp_err.message, "url cannot be empty");
    }
}
