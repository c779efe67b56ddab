//! Prompt registration entries
//!
//! Prompts generate role/content message sequences from named arguments.
//! Declared arguments come either verbatim from registration or are
//! derived from the registered schema's top-level properties.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::core::context::RequestContext;
use crate::core::error::McpResult;
use crate::core::schema::{SchemaSource, SchemaValidator};
use crate::protocol::messages::GetPromptResult;
use crate::protocol::types::{Prompt, PromptArgument};

/// Trait for implementing prompt handlers
#[async_trait]
pub trait PromptHandler: Send + Sync {
    /// Generate prompt messages from the given arguments
    async fn get(&self, arguments: Value, ctx: &mut RequestContext) -> McpResult<GetPromptResult>;
}

/// A registered prompt
pub struct PromptEntry {
    /// Advertised metadata, returned verbatim from `prompts/list`
    pub metadata: Prompt,
    /// Handler implementing the prompt
    pub handler: Arc<dyn PromptHandler>,
    /// Validator run against raw arguments before the handler, if any
    pub validator: Option<Arc<dyn SchemaValidator>>,
}

/// Registration options for a prompt.
///
/// `arguments` and `input_schema` are alternatives: pre-built arguments
/// are advertised verbatim; otherwise the schema is resolved like a
/// tool's and arguments are derived from its properties.
#[derive(Default)]
pub struct PromptOptions {
    pub title: Option<String>,
    pub description: Option<String>,
    pub arguments: Option<Vec<PromptArgument>>,
    pub input_schema: Option<SchemaSource>,
}

impl PromptOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_arguments(mut self, arguments: Vec<PromptArgument>) -> Self {
        self.arguments = Some(arguments);
        self
    }

    pub fn with_input_schema(mut self, schema: SchemaSource) -> Self {
        self.input_schema = Some(schema);
        self
    }
}
