//! Error types for the MCP server.

use crate::protocol::JsonRpcError;
use plaid_sdk::PlaidError;

/// Failures of the protocol plumbing itself.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Framing error: {0}")]
    Codec(#[from] tokio_util::codec::LinesCodecError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),
}

/// Failures raised while executing a tool call.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Arguments did not match the tool's input schema.
    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// Error raised by the Plaid dispatcher, passed through unchanged.
    #[error(transparent)]
    Plaid(#[from] PlaidError),

    /// The tool succeeded but its result could not be rendered.
    #[error("Failed to serialize tool result: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    pub fn invalid_arguments(tool: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.to_string(),
            reason: reason.into(),
        }
    }

    /// Protocol-level error for failures the caller must fix in the request.
    /// Other failures are reported as tool results instead.
    pub fn to_rpc_error(&self) -> Option<JsonRpcError> {
        match self {
            Self::InvalidArguments { .. } => Some(JsonRpcError::invalid_params(self.to_string())),
            Self::Plaid(_) | Self::Serialization(_) => None,
        }
    }
}
