//! Core abstractions: errors, per-request context, middleware, schema
//! resolution, and the tool/prompt/resource entry types.

pub mod context;
pub mod error;
pub mod middleware;
pub mod prompt;
pub mod resource;
pub mod schema;
pub mod tool;

pub use context::{
    DispatchOptions, NotificationOptions, NotificationSender, ProgressUpdate, RequestContext,
};
pub use error::{McpResult, RpcError};
pub use middleware::{Middleware, Next};
pub use prompt::{PromptEntry, PromptHandler, PromptOptions};
pub use resource::{ResourceEntry, ResourceHandler, ResourceMetadata, ResourceOptions, ResourceUri};
pub use schema::{
    FnValidator, ResolvedSchema, SchemaAdapter, SchemaSource, SchemaValidator, resolve_schema,
};
pub use tool::{ToolEntry, ToolHandler};
