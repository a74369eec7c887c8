// MCP (Model Context Protocol) server exposing Plaid operations as tools

pub mod error;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

pub use error::{McpError, ToolError};
pub use server::McpServer;
pub use transport::{ChannelTransport, Inbound, LineTransport, McpTransport, StdioTransport};
