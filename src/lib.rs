// Copyright (c) 2025 Keel MCP Contributors
// SPDX-License-Identifier: MIT

//! # keel-mcp
//!
//! A transport-agnostic server core for the
//! [Model Context Protocol (MCP)](https://modelcontextprotocol.io/):
//! a JSON-RPC 2.0 dispatcher exposing tools, prompts, and resources to MCP
//! clients, with a composable middleware pipeline, schema-driven argument
//! validation, URI-template resource routing, and request-correlated
//! progress notifications.
//!
//! The core owns no sockets and parses no bytes. A transport decodes a
//! JSON-RPC message, calls [`McpServer::dispatch`], and sends back whatever
//! comes out — a response for requests, nothing for notifications. Progress
//! flows the other way through a [`NotificationSender`] the transport wires
//! in once.
//!
//! ## Server Example
//!
//! ```rust,no_run
//! use keel_mcp::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> McpResult<()> {
//!     let server = McpServer::new("echo-server", "1.0.0");
//!
//!     server
//!         .add_tool_fn(
//!             "echo",
//!             Some("Echo a message"),
//!             Some(SchemaSource::Document(json!({
//!                 "type": "object",
//!                 "properties": { "m": { "type": "string" } },
//!                 "required": ["m"]
//!             }))),
//!             |args| {
//!                 let m = args.get("m").and_then(|v| v.as_str()).unwrap_or_default();
//!                 Ok(CallToolResult::text(m))
//!             },
//!         )
//!         .await?;
//!
//!     let response = server
//!         .dispatch(
//!             json!({
//!                 "jsonrpc": "2.0",
//!                 "id": 1,
//!                 "method": "tools/call",
//!                 "params": { "name": "echo", "arguments": { "m": "hi" } }
//!             }),
//!             DispatchOptions::default(),
//!         )
//!         .await;
//!
//!     assert!(response.is_some());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`core`]: errors, per-request context, middleware, schema resolution,
//!   and the tool/prompt/resource entry types
//! - [`protocol`]: MCP wire types, per-method payloads, and method names
//! - [`server`]: the [`McpServer`] registry and dispatch state machine
//! - [`utils`]: URI template compilation and percent-decoding

pub mod core;
pub mod protocol;
pub mod server;
pub mod utils;

// Re-export commonly used types for convenience
pub use crate::core::context::{DispatchOptions, NotificationSender};
pub use crate::core::error::{McpResult, RpcError};
pub use crate::server::McpServer;

/// Prelude module for convenient imports
///
/// Re-exports the most commonly used types and traits. Use
/// `use keel_mcp::prelude::*;` to bring them all into scope.
pub mod prelude {
    pub use crate::core::{
        context::{
            DispatchOptions, NotificationOptions, NotificationSender, ProgressUpdate,
            RequestContext,
        },
        error::{McpResult, RpcError},
        middleware::{Middleware, Next},
        prompt::{PromptHandler, PromptOptions},
        resource::{ResourceHandler, ResourceOptions, ResourceUri},
        schema::{FnValidator, SchemaAdapter, SchemaSource, SchemaValidator},
        tool::ToolHandler,
    };
    pub use crate::protocol::messages::*;
    pub use crate::protocol::methods;
    pub use crate::protocol::types::*;
    pub use crate::server::{ErrorHook, McpServer};
    pub use crate::utils::uri_template::UriTemplate;

    pub use async_trait::async_trait;
}
