//! MCP server core
//!
//! [`McpServer`] owns the capability registries and turns decoded JSON-RPC
//! messages into responses. It is transport-neutral: transports hand it a
//! message plus a [`DispatchOptions`] bag and get back a response, or
//! `None` for notifications.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

use crate::core::context::{
    DispatchOptions, NotificationOptions, NotificationSender, ProgressScope, RequestContext,
    extract_progress_token,
};
use crate::core::error::{McpResult, RpcError};
use crate::core::middleware::{Endpoint, Middleware, Next};
use crate::core::prompt::{PromptEntry, PromptHandler, PromptOptions};
use crate::core::resource::{
    ResourceEntry, ResourceHandler, ResourceMetadata, ResourceOptions,
};
use crate::core::schema::{SchemaAdapter, SchemaSource, SchemaValidator, resolve_schema};
use crate::core::tool::{FnToolHandler, ToolEntry, ToolHandler};
use crate::protocol::messages::{CallToolResult, ResourceUpdatedParams};
use crate::protocol::methods;
use crate::protocol::types::{
    ErrorObject, JsonRpcError, JsonRpcNotification, JsonRpcResponseOrError, Prompt,
    PromptsCapability, RequestId, Resource, ResourceTemplate, ResourcesCapability,
    ServerCapabilities, ServerInfo, Tool, ToolsCapability,
};

/// Hook consulted when a request handler fails.
///
/// Returning an [`ErrorObject`] overrides the default error mapping;
/// returning `None` falls through to it.
pub type ErrorHook = Arc<dyn Fn(&RpcError, &mut RequestContext) -> Option<ErrorObject> + Send + Sync>;

/// The MCP server core: capability registries plus the dispatch machine
pub struct McpServer {
    pub(crate) info: ServerInfo,
    pub(crate) capabilities: RwLock<ServerCapabilities>,
    pub(crate) tools: RwLock<Vec<ToolEntry>>,
    pub(crate) prompts: RwLock<Vec<PromptEntry>>,
    pub(crate) resources: RwLock<Vec<ResourceEntry>>,
    pub(crate) middlewares: RwLock<Vec<Arc<dyn Middleware>>>,
    pub(crate) error_hook: RwLock<Option<ErrorHook>>,
    pub(crate) notification_sender: RwLock<Option<Arc<dyn NotificationSender>>>,
    pub(crate) schema_adapter: RwLock<Option<SchemaAdapter>>,
    pub(crate) initialized: AtomicBool,
}

impl McpServer {
    /// Create a new server with the given name and version
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            info: ServerInfo::new(name.into(), version.into()),
            capabilities: RwLock::new(ServerCapabilities::default()),
            tools: RwLock::new(Vec::new()),
            prompts: RwLock::new(Vec::new()),
            resources: RwLock::new(Vec::new()),
            middlewares: RwLock::new(Vec::new()),
            error_hook: RwLock::new(None),
            notification_sender: RwLock::new(None),
            schema_adapter: RwLock::new(None),
            initialized: AtomicBool::new(false),
        }
    }

    /// Get server information
    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn version(&self) -> &str {
        &self.info.version
    }

    /// Snapshot of the currently advertised capabilities
    pub async fn capabilities(&self) -> ServerCapabilities {
        self.capabilities.read().await.clone()
    }

    /// Whether a successful `initialize` has been served
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Set the adapter used to derive advertised schemas from validators.
    ///
    /// Applies to subsequent registrations only.
    pub async fn set_schema_adapter(&self, adapter: SchemaAdapter) {
        *self.schema_adapter.write().await = Some(adapter);
    }

    /// Wire in the transport's notification sender.
    ///
    /// The sender lives as long as the server; per-request progress
    /// closures are bound views over it.
    pub async fn set_notification_sender(&self, sender: Arc<dyn NotificationSender>) {
        *self.notification_sender.write().await = Some(sender);
    }

    /// Install the error hook, replacing any previous one
    pub async fn set_error_hook(&self, hook: ErrorHook) {
        *self.error_hook.write().await = Some(hook);
    }

    /// Append a middleware to the dispatch pipeline
    pub async fn add_middleware<M>(&self, middleware: M)
    where
        M: Middleware + 'static,
    {
        self.middlewares.write().await.push(Arc::new(middleware));
    }

    // ========================================================================
    // Tool Registration
    // ========================================================================

    /// Register a tool. Re-registering a name replaces the prior entry in
    /// place.
    pub async fn add_tool<H>(
        &self,
        name: &str,
        description: Option<&str>,
        schema: Option<SchemaSource>,
        handler: H,
    ) -> McpResult<()>
    where
        H: ToolHandler + 'static,
    {
        if name.is_empty() {
            return Err(RpcError::invalid_request("Tool name cannot be empty"));
        }

        let adapter = self.schema_adapter.read().await.clone();
        let resolved = resolve_schema(schema, adapter.as_ref());

        let mut metadata = Tool::new(name, resolved.input_schema);
        metadata.description = description.map(str::to_string);

        let entry = ToolEntry {
            metadata,
            handler: Arc::new(handler),
            validator: resolved.validator,
        };

        {
            let mut tools = self.tools.write().await;
            match tools.iter_mut().find(|t| t.metadata.name == name) {
                Some(existing) => *existing = entry,
                None => tools.push(entry),
            }
        }

        self.enable_tools_capability().await;
        Ok(())
    }

    /// Register a tool backed by a plain function
    pub async fn add_tool_fn<F>(
        &self,
        name: &str,
        description: Option<&str>,
        schema: Option<SchemaSource>,
        handler: F,
    ) -> McpResult<()>
    where
        F: Fn(Value) -> McpResult<CallToolResult> + Send + Sync + 'static,
    {
        self.add_tool(name, description, schema, FnToolHandler(handler))
            .await
    }

    // ========================================================================
    // Prompt Registration
    // ========================================================================

    /// Register a prompt. Declared arguments are taken verbatim when
    /// supplied; otherwise they are derived from the registered schema's
    /// top-level properties.
    pub async fn add_prompt<H>(
        &self,
        name: &str,
        options: PromptOptions,
        handler: H,
    ) -> McpResult<()>
    where
        H: PromptHandler + 'static,
    {
        if name.is_empty() {
            return Err(RpcError::invalid_request("Prompt name cannot be empty"));
        }

        let (arguments, validator) = match options.arguments {
            Some(arguments) => (Some(arguments), None),
            None => {
                let adapter = self.schema_adapter.read().await.clone();
                let resolved = resolve_schema(options.input_schema, adapter.as_ref());
                (
                    crate::core::schema::derive_prompt_arguments(&resolved.input_schema),
                    resolved.validator,
                )
            }
        };

        let entry = PromptEntry {
            metadata: Prompt {
                name: name.to_string(),
                title: options.title,
                description: options.description,
                arguments,
            },
            handler: Arc::new(handler),
            validator,
        };

        {
            let mut prompts = self.prompts.write().await;
            match prompts.iter_mut().find(|p| p.metadata.name == name) {
                Some(existing) => *existing = entry,
                None => prompts.push(entry),
            }
        }

        self.enable_prompts_capability().await;
        Ok(())
    }

    // ========================================================================
    // Resource Registration
    // ========================================================================

    /// Register a resource. A pattern containing `{` is a template;
    /// anything else is a static URI.
    pub async fn add_resource<H>(
        &self,
        pattern: &str,
        options: ResourceOptions,
        handler: H,
    ) -> McpResult<()>
    where
        H: ResourceHandler + 'static,
    {
        self.add_resource_with_validators(pattern, options, HashMap::new(), handler)
            .await
    }

    /// Register a resource with per-variable validators, keyed by template
    /// variable name. Validator failures surface as `INVALID_PARAMS` on
    /// `resources/read`.
    pub async fn add_resource_with_validators<H>(
        &self,
        pattern: &str,
        options: ResourceOptions,
        validators: HashMap<String, Arc<dyn SchemaValidator>>,
        handler: H,
    ) -> McpResult<()>
    where
        H: ResourceHandler + 'static,
    {
        use crate::utils::uri_template::UriTemplate;

        let entry = if UriTemplate::is_template(pattern) {
            let matcher = UriTemplate::compile(pattern)?;
            ResourceEntry {
                metadata: ResourceMetadata::Template(ResourceTemplate {
                    uri_template: pattern.to_string(),
                    name: options.name,
                    title: options.title,
                    description: options.description,
                    mime_type: options.mime_type,
                }),
                handler: Arc::new(handler),
                validators,
                matcher: Some(matcher),
            }
        } else {
            Url::parse(pattern).map_err(|e| {
                RpcError::invalid_request(format!("Invalid resource URI '{pattern}': {e}"))
            })?;
            ResourceEntry {
                metadata: ResourceMetadata::Static(Resource {
                    uri: pattern.to_string(),
                    name: options.name,
                    title: options.title,
                    description: options.description,
                    mime_type: options.mime_type,
                }),
                handler: Arc::new(handler),
                validators,
                matcher: None,
            }
        };

        {
            let mut resources = self.resources.write().await;
            match resources
                .iter_mut()
                .find(|r| r.metadata.key() == pattern)
            {
                Some(existing) => *existing = entry,
                None => resources.push(entry),
            }
        }

        self.enable_resources_capability().await;
        Ok(())
    }

    // ========================================================================
    // Capability Advertisement
    // ========================================================================

    async fn enable_tools_capability(&self) {
        let mut caps = self.capabilities.write().await;
        if caps.tools.is_none() {
            caps.tools = Some(ToolsCapability {
                list_changed: Some(true),
            });
        }
    }

    async fn enable_prompts_capability(&self) {
        let mut caps = self.capabilities.write().await;
        if caps.prompts.is_none() {
            caps.prompts = Some(PromptsCapability {
                list_changed: Some(true),
            });
        }
    }

    async fn enable_resources_capability(&self) {
        let mut caps = self.capabilities.write().await;
        if caps.resources.is_none() {
            caps.resources = Some(ResourcesCapability::default());
        }
    }

    // ========================================================================
    // Server-initiated Notifications
    // ========================================================================

    async fn send_notification(
        &self,
        session_id: Option<&str>,
        notification: JsonRpcNotification,
    ) -> McpResult<()> {
        let sender = self.notification_sender.read().await.clone();
        match sender {
            Some(sender) => {
                sender
                    .send(session_id, notification, NotificationOptions::default())
                    .await
            }
            None => Ok(()),
        }
    }

    /// Notify a session that the tool list changed
    pub async fn notify_tools_list_changed(&self, session_id: Option<&str>) -> McpResult<()> {
        self.send_notification(
            session_id,
            JsonRpcNotification::new(methods::TOOLS_LIST_CHANGED, None),
        )
        .await
    }

    /// Notify a session that the prompt list changed
    pub async fn notify_prompts_list_changed(&self, session_id: Option<&str>) -> McpResult<()> {
        self.send_notification(
            session_id,
            JsonRpcNotification::new(methods::PROMPTS_LIST_CHANGED, None),
        )
        .await
    }

    /// Notify a session that the resource list changed
    pub async fn notify_resources_list_changed(&self, session_id: Option<&str>) -> McpResult<()> {
        self.send_notification(
            session_id,
            JsonRpcNotification::new(methods::RESOURCES_LIST_CHANGED, None),
        )
        .await
    }

    /// Notify a session that a resource's contents changed
    pub async fn notify_resource_updated(
        &self,
        session_id: Option<&str>,
        uri: &str,
    ) -> McpResult<()> {
        let params = ResourceUpdatedParams {
            uri: uri.to_string(),
        };
        self.send_notification(
            session_id,
            JsonRpcNotification::new(
                methods::RESOURCES_UPDATED,
                Some(serde_json::to_value(&params)?),
            ),
        )
        .await
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Dispatch one decoded JSON-RPC message.
    ///
    /// Requests always yield a response (success or error) carrying the
    /// request id. Notifications always yield `None`, even when handling
    /// fails.
    pub async fn dispatch(
        &self,
        message: Value,
        options: DispatchOptions,
    ) -> Option<JsonRpcResponseOrError> {
        // `id: null` classifies as absent — the message is a notification
        let request_id: Option<RequestId> = message
            .get("id")
            .filter(|id| !id.is_null())
            .and_then(|id| serde_json::from_value(id.clone()).ok());
        let method = message
            .get("method")
            .and_then(Value::as_str)
            .map(str::to_string);
        let progress_token = extract_progress_token(&message);

        let mut ctx = RequestContext::new(message, request_id.clone(), options);

        if let (Some(token), Some(session_id)) = (progress_token, ctx.session_id.clone()) {
            if let Some(sender) = self.notification_sender.read().await.clone() {
                ctx.bind_progress(ProgressScope {
                    sender,
                    session_id,
                    token,
                    related_request_id: request_id.clone(),
                });
            }
        }

        let Some(method) = method else {
            return request_id.map(|id| error_outcome(id, RpcError::method_not_found()));
        };

        let Some(route) = Route::resolve(&method) else {
            debug!(method = %method, "unknown method");
            return request_id.map(|id| {
                error_outcome(
                    id,
                    RpcError::method_not_found().with_data(json!({ "method": method })),
                )
            });
        };
        debug!(method = %method, request = request_id.is_some(), "dispatching");

        let middlewares = self.middlewares.read().await.clone();
        let endpoint = MethodEndpoint {
            server: self,
            route,
        };
        let next = Next {
            chain: &middlewares,
            endpoint: &endpoint,
        };
        let outcome = next.run(&mut ctx).await;

        let Some(id) = request_id else {
            if let Err(err) = outcome {
                debug!(code = err.code, "notification handling failed: {}", err.message);
            }
            return None;
        };

        match outcome {
            Ok(()) => match ctx.response.take() {
                Some(response) => Some(JsonRpcResponseOrError::Response(response)),
                None => Some(error_outcome(
                    id,
                    RpcError::internal("No response generated"),
                )),
            },
            Err(err) => {
                let hook = self.error_hook.read().await.clone();
                let error = hook
                    .and_then(|hook| hook(&err, &mut ctx))
                    .unwrap_or_else(|| ErrorObject::from(err));
                Some(JsonRpcResponseOrError::Error(JsonRpcError::new(id, error)))
            }
        }
    }
}

fn error_outcome(id: RequestId, err: RpcError) -> JsonRpcResponseOrError {
    JsonRpcResponseOrError::Error(JsonRpcError::new(id, err.into()))
}

/// Built-in methods the dispatcher can route to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Route {
    Initialize,
    Ping,
    ToolsList,
    ToolsCall,
    PromptsList,
    PromptsGet,
    ResourcesList,
    ResourcesTemplatesList,
    ResourcesRead,
    ResourcesSubscribe,
    ResourcesUnsubscribe,
    CompletionComplete,
    LoggingSetLevel,
    /// Any `notifications/*` method: acknowledged with `{}`
    Notification,
}

impl Route {
    pub(crate) fn resolve(method: &str) -> Option<Self> {
        match method {
            methods::INITIALIZE => Some(Route::Initialize),
            methods::PING => Some(Route::Ping),
            methods::TOOLS_LIST => Some(Route::ToolsList),
            methods::TOOLS_CALL => Some(Route::ToolsCall),
            methods::PROMPTS_LIST => Some(Route::PromptsList),
            methods::PROMPTS_GET => Some(Route::PromptsGet),
            methods::RESOURCES_LIST => Some(Route::ResourcesList),
            methods::RESOURCES_TEMPLATES_LIST => Some(Route::ResourcesTemplatesList),
            methods::RESOURCES_READ => Some(Route::ResourcesRead),
            methods::RESOURCES_SUBSCRIBE => Some(Route::ResourcesSubscribe),
            methods::RESOURCES_UNSUBSCRIBE => Some(Route::ResourcesUnsubscribe),
            methods::COMPLETION_COMPLETE => Some(Route::CompletionComplete),
            methods::LOGGING_SET_LEVEL => Some(Route::LoggingSetLevel),
            m if m.starts_with(methods::NOTIFICATIONS_PREFIX) => Some(Route::Notification),
            _ => None,
        }
    }
}

/// The dispatch tail: runs the resolved built-in handler and stores the
/// response on the context for requests.
struct MethodEndpoint<'s> {
    server: &'s McpServer,
    route: Route,
}

#[async_trait]
impl Endpoint for MethodEndpoint<'_> {
    async fn call(&self, ctx: &mut RequestContext) -> McpResult<()> {
        self.server.run_method(self.route, ctx).await
    }
}
