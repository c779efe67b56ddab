//! Tool registration entries
//!
//! Tools are named, argument-validated callables. An entry pairs the
//! advertised metadata with its handler and the validator resolved at
//! registration time.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::core::context::RequestContext;
use crate::core::error::McpResult;
use crate::core::schema::SchemaValidator;
use crate::protocol::messages::CallToolResult;
use crate::protocol::types::Tool;

/// Trait for implementing tool handlers
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Execute the tool with already-validated arguments
    async fn call(&self, arguments: Value, ctx: &mut RequestContext) -> McpResult<CallToolResult>;
}

/// A registered tool
pub struct ToolEntry {
    /// Advertised metadata, returned verbatim from `tools/list`
    pub metadata: Tool,
    /// Handler implementing the tool
    pub handler: Arc<dyn ToolHandler>,
    /// Validator run against raw arguments before the handler, if any
    pub validator: Option<Arc<dyn SchemaValidator>>,
}

/// Adapter turning a plain function into a [`ToolHandler`]
pub(crate) struct FnToolHandler<F>(pub(crate) F);

#[async_trait]
impl<F> ToolHandler for FnToolHandler<F>
where
    F: Fn(Value) -> McpResult<CallToolResult> + Send + Sync,
{
    async fn call(&self, arguments: Value, _ctx: &mut RequestContext) -> McpResult<CallToolResult> {
        (self.0)(arguments)
    }
}
