//! Built-in method handlers
//!
//! One handler per MCP method, each taking the raw params and returning
//! the serialized result. The dispatch tail routes to these and stores
//! the response on the context for requests.

use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tracing::debug;

use crate::core::context::RequestContext;
use crate::core::error::{McpResult, RpcError};
use crate::core::resource::{ResourceMetadata, ResourceUri};
use crate::protocol::messages::*;
use crate::protocol::methods;
use crate::protocol::types::{JsonRpcResponse, LATEST_PROTOCOL_VERSION};

use super::mcp_server::{McpServer, Route};

impl McpServer {
    /// Run the resolved method handler; for requests, store the response
    /// on the context.
    pub(crate) async fn run_method(&self, route: Route, ctx: &mut RequestContext) -> McpResult<()> {
        let params = ctx.params().cloned();

        let result = match route {
            Route::Initialize => self.handle_initialize(params).await?,
            Route::Ping => json!({}),
            Route::ToolsList => self.handle_tools_list(params).await?,
            Route::ToolsCall => self.handle_tools_call(params, ctx).await?,
            Route::PromptsList => self.handle_prompts_list(params).await?,
            Route::PromptsGet => self.handle_prompts_get(params, ctx).await?,
            Route::ResourcesList => self.handle_resources_list(params).await?,
            Route::ResourcesTemplatesList => self.handle_resource_templates_list(params).await?,
            Route::ResourcesRead => self.handle_resources_read(params, ctx).await?,
            Route::ResourcesSubscribe => {
                return Err(RpcError::not_implemented(methods::RESOURCES_SUBSCRIBE));
            }
            Route::ResourcesUnsubscribe => {
                return Err(RpcError::not_implemented(methods::RESOURCES_UNSUBSCRIBE));
            }
            Route::CompletionComplete => {
                return Err(RpcError::not_implemented(methods::COMPLETION_COMPLETE));
            }
            Route::LoggingSetLevel => self.handle_logging_set_level(params)?,
            Route::Notification => json!({}),
        };

        if let Some(id) = &ctx.request_id {
            ctx.response = Some(JsonRpcResponse::new(id.clone(), result));
        }
        Ok(())
    }

    async fn handle_initialize(&self, params: Option<Value>) -> McpResult<Value> {
        let params: InitializeParams = match params {
            Some(p) => serde_json::from_value(p)
                .map_err(|e| RpcError::invalid_params(format!("Invalid initialize params: {e}")))?,
            None => {
                return Err(RpcError::invalid_params("Missing initialize parameters"));
            }
        };

        if params.protocol_version != LATEST_PROTOCOL_VERSION {
            return Err(RpcError::protocol_version_mismatch(&params.protocol_version));
        }

        if params.client_info.name.is_empty() {
            return Err(RpcError::invalid_params("Client name cannot be empty"));
        }

        self.initialized.store(true, Ordering::SeqCst);
        debug!(client = %params.client_info.name, "initialized");

        let result = InitializeResult {
            protocol_version: LATEST_PROTOCOL_VERSION.to_string(),
            capabilities: self.capabilities.read().await.clone(),
            server_info: self.info.clone(),
            instructions: None,
        };
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_tools_list(&self, params: Option<Value>) -> McpResult<Value> {
        let _params = parse_list_params(params)?;
        let tools = self.tools.read().await;
        let result = ListToolsResult {
            tools: tools.iter().map(|entry| entry.metadata.clone()).collect(),
            next_cursor: None,
        };
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_tools_call(
        &self,
        params: Option<Value>,
        ctx: &mut RequestContext,
    ) -> McpResult<Value> {
        let params: CallToolParams = match params {
            Some(p) => serde_json::from_value(p)
                .map_err(|e| RpcError::invalid_params(format!("Invalid tool call params: {e}")))?,
            None => {
                return Err(RpcError::invalid_params("Missing tool call parameters"));
            }
        };

        let (handler, validator) = {
            let tools = self.tools.read().await;
            let Some(entry) = tools.iter().find(|t| t.metadata.name == params.name) else {
                return Err(
                    RpcError::method_not_found().with_data(json!({ "method": params.name }))
                );
            };
            (Arc::clone(&entry.handler), entry.validator.clone())
        };

        let raw = params.arguments.unwrap_or(Value::Null);
        let arguments = match &validator {
            Some(validator) => ctx.validate(validator, &raw).await?,
            None => raw,
        };

        let result = handler.call(arguments, ctx).await?;
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_prompts_list(&self, params: Option<Value>) -> McpResult<Value> {
        let _params = parse_list_params(params)?;
        let prompts = self.prompts.read().await;
        let result = ListPromptsResult {
            prompts: prompts.iter().map(|entry| entry.metadata.clone()).collect(),
            next_cursor: None,
        };
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_prompts_get(
        &self,
        params: Option<Value>,
        ctx: &mut RequestContext,
    ) -> McpResult<Value> {
        let params: GetPromptParams = match params {
            Some(p) => serde_json::from_value(p)
                .map_err(|e| RpcError::invalid_params(format!("Invalid prompt get params: {e}")))?,
            None => {
                return Err(RpcError::invalid_params("Missing prompt get parameters"));
            }
        };

        let (handler, validator) = {
            let prompts = self.prompts.read().await;
            let Some(entry) = prompts.iter().find(|p| p.metadata.name == params.name) else {
                return Err(
                    RpcError::invalid_params("Prompt not found")
                        .with_data(json!({ "name": params.name })),
                );
            };
            (Arc::clone(&entry.handler), entry.validator.clone())
        };

        let raw = params.arguments.unwrap_or_else(|| json!({}));
        let arguments = match &validator {
            Some(validator) => ctx.validate(validator, &raw).await?,
            None => raw,
        };

        let result = handler.get(arguments, ctx).await?;
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_resources_list(&self, params: Option<Value>) -> McpResult<Value> {
        let _params = parse_list_params(params)?;
        let resources = self.resources.read().await;
        let result = ListResourcesResult {
            resources: resources
                .iter()
                .filter_map(|entry| match &entry.metadata {
                    ResourceMetadata::Static(resource) => Some(resource.clone()),
                    ResourceMetadata::Template(_) => None,
                })
                .collect(),
            next_cursor: None,
        };
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_resource_templates_list(&self, params: Option<Value>) -> McpResult<Value> {
        let _params = parse_list_params(params)?;
        let resources = self.resources.read().await;
        let result = ListResourceTemplatesResult {
            resource_templates: resources
                .iter()
                .filter_map(|entry| match &entry.metadata {
                    ResourceMetadata::Static(_) => None,
                    ResourceMetadata::Template(template) => Some(template.clone()),
                })
                .collect(),
            next_cursor: None,
        };
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_resources_read(
        &self,
        params: Option<Value>,
        ctx: &mut RequestContext,
    ) -> McpResult<Value> {
        let params: ReadResourceParams = match params {
            Some(p) => serde_json::from_value(p).map_err(|e| {
                RpcError::invalid_params(format!("Invalid resource read params: {e}"))
            })?,
            None => {
                return Err(RpcError::invalid_params("Missing resource read parameters"));
            }
        };
        let uri = params.uri;

        // Exact static match wins over templates
        let static_handler = {
            let resources = self.resources.read().await;
            resources
                .iter()
                .find(|entry| !entry.is_template() && entry.metadata.key() == uri)
                .map(|entry| Arc::clone(&entry.handler))
        };
        if let Some(handler) = static_handler {
            let result = handler
                .read(&ResourceUri { href: uri.clone() }, &HashMap::new(), ctx)
                .await?;
            return Ok(serde_json::to_value(result)?);
        }

        // Templates in registration order; first match wins
        let template_match = {
            let resources = self.resources.read().await;
            resources.iter().filter(|entry| entry.is_template()).find_map(|entry| {
                let matcher = entry.matcher.as_ref()?;
                let raw_variables = matcher.matches(&uri)?;
                Some((
                    Arc::clone(&entry.handler),
                    entry.validators.clone(),
                    raw_variables,
                    matcher.variables().to_vec(),
                ))
            })
        };
        let Some((handler, validators, raw_variables, variable_order)) = template_match else {
            return Err(RpcError::method_not_found().with_data(json!({ "uri": uri })));
        };

        let mut variables: HashMap<String, Value> = HashMap::with_capacity(raw_variables.len());
        for name in &variable_order {
            let Some(raw) = raw_variables.get(name) else {
                continue;
            };
            let value = match validators.get(name) {
                Some(validator) => ctx
                    .validate(validator, &Value::String(raw.clone()))
                    .await
                    .map_err(|e| {
                        RpcError::invalid_params(format!(
                            "Validation failed for parameter '{name}': {message}",
                            message = e.message
                        ))
                    })?,
                None => Value::String(raw.clone()),
            };
            variables.insert(name.clone(), value);
        }

        let result = handler
            .read(&ResourceUri { href: uri.clone() }, &variables, ctx)
            .await?;
        Ok(serde_json::to_value(result)?)
    }

    fn handle_logging_set_level(&self, params: Option<Value>) -> McpResult<Value> {
        // Accepted but not acted upon; level management is an embedder concern
        if let Some(p) = params {
            if let Ok(parsed) = serde_json::from_value::<SetLoggingLevelParams>(p) {
                debug!(level = ?parsed.level, "logging/setLevel acknowledged");
            }
        }
        Ok(json!({}))
    }
}

/// Cursors are accepted for forward compatibility but not interpreted
fn parse_list_params(params: Option<Value>) -> McpResult<ListParams> {
    match params {
        Some(p) => serde_json::from_value(p)
            .map_err(|e| RpcError::invalid_params(format!("Invalid list params: {e}"))),
        None => Ok(ListParams::default()),
    }
}
