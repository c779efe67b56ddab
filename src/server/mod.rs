//! MCP server implementation

mod handlers;
pub mod mcp_server;

pub use mcp_server::{ErrorHook, McpServer};
