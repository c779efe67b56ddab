//! Core MCP protocol types
//!
//! This module contains the wire-level types shared by every MCP method:
//! JSON-RPC envelopes, identifiers, capability advertisements, and the
//! metadata shapes for tools, prompts, and resources.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Core Protocol Constants
// ============================================================================

/// MCP protocol version supported by this server core
pub const LATEST_PROTOCOL_VERSION: &str = "2025-06-18";
pub const JSONRPC_VERSION: &str = "2.0";

// ============================================================================
// Identifiers
// ============================================================================

/// Request ID for JSON-RPC correlation: a string or an integer.
///
/// Absent on notifications; `null` ids are treated as absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(i64),
}

impl From<i64> for RequestId {
    fn from(value: i64) -> Self {
        RequestId::Number(value)
    }
}

impl From<String> for RequestId {
    fn from(value: String) -> Self {
        RequestId::String(value)
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        RequestId::String(value.to_string())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::String(s) => write!(f, "{s}"),
            RequestId::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Progress token supplied by the client under `params._meta.progressToken`.
///
/// A string or an integer; anything else is rejected at extraction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum ProgressToken {
    String(String),
    Number(i64),
}

impl From<&str> for ProgressToken {
    fn from(value: &str) -> Self {
        ProgressToken::String(value.to_string())
    }
}

impl From<i64> for ProgressToken {
    fn from(value: i64) -> Self {
        ProgressToken::Number(value)
    }
}

// ============================================================================
// Implementation Info
// ============================================================================

/// Information about an MCP implementation (server or client)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Implementation {
    /// Identifier intended for programmatic use
    pub name: String,
    /// Version of the implementation
    pub version: String,
    /// Human-readable display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Implementation {
    /// Create a new implementation with name and version
    pub fn new<S: Into<String>>(name: S, version: S) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            title: None,
        }
    }

    /// Create implementation with a display title
    pub fn with_title<S: Into<String>>(name: S, version: S, title: S) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            title: Some(title.into()),
        }
    }
}

pub type ServerInfo = Implementation;
pub type ClientInfo = Implementation;

// ============================================================================
// Capabilities
// ============================================================================

/// Server capabilities advertised from `initialize`.
///
/// Each section is enabled lazily by the first registration of that kind;
/// an absent section means the capability is not offered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ServerCapabilities {
    /// Prompt-related capabilities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompts: Option<PromptsCapability>,
    /// Resource-related capabilities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourcesCapability>,
    /// Tool-related capabilities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
    /// Logging capabilities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingCapability>,
    /// Experimental capabilities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experimental: Option<HashMap<String, Value>>,
}

/// Client capabilities received in `initialize`.
///
/// The core does not interpret these; they are carried opaquely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ClientCapabilities {
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

/// Prompt-related server capabilities
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PromptsCapability {
    /// Whether the server emits prompt list change notifications
    #[serde(rename = "listChanged", skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// Resource-related server capabilities
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ResourcesCapability {
    /// Whether the server supports resource subscriptions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribe: Option<bool>,
    /// Whether the server emits resource list change notifications
    #[serde(rename = "listChanged", skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// Tool-related server capabilities
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ToolsCapability {
    /// Whether the server emits tool list change notifications
    #[serde(rename = "listChanged", skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// Logging capabilities
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LoggingCapability {
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

// ============================================================================
// Advertised Metadata
// ============================================================================

/// Advertised tool metadata.
///
/// `input_schema` is always a JSON Schema object, even when registration
/// supplied a validator instead of a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    /// Name of the tool
    pub name: String,
    /// Human-readable display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description of what the tool does
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema describing the tool's arguments
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl Tool {
    pub fn new<S: Into<String>>(name: S, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            title: None,
            description: None,
            input_schema,
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Advertised prompt metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prompt {
    /// Name of the prompt
    pub name: String,
    /// Human-readable display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description of the prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Arguments accepted by the prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<PromptArgument>>,
}

/// A single declared prompt argument
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptArgument {
    /// Name of the argument
    pub name: String,
    /// Human-readable display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description of the argument
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the argument must be provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

/// Advertised metadata for a static (fixed-URI) resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    /// URI of the resource
    pub uri: String,
    /// Name of the resource
    pub name: String,
    /// Human-readable display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description of the resource
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// MIME type of the resource contents
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Advertised metadata for a templated resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceTemplate {
    /// URI template with `{variable}` placeholders
    #[serde(rename = "uriTemplate")]
    pub uri_template: String,
    /// Name of the resource template
    pub name: String,
    /// Human-readable display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description of the resource template
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// MIME type of resources produced by this template
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

// ============================================================================
// Content Model
// ============================================================================

/// A single content part in a tool result or prompt message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image")]
    Image {
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
}

impl ContentBlock {
    /// Create a text content block
    pub fn text<S: Into<String>>(text: S) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    /// Create an image content block from base64 data
    pub fn image<S: Into<String>>(data: S, mime_type: S) -> Self {
        ContentBlock::Image {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Message author role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message produced by a prompt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptMessage {
    pub role: Role,
    pub content: ContentBlock,
}

impl PromptMessage {
    /// Create a user text message
    pub fn user_text<S: Into<String>>(text: S) -> Self {
        Self {
            role: Role::User,
            content: ContentBlock::text(text),
        }
    }

    /// Create an assistant text message
    pub fn assistant_text<S: Into<String>>(text: S) -> Self {
        Self {
            role: Role::Assistant,
            content: ContentBlock::text(text),
        }
    }
}

/// Contents returned from a resource read
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ResourceContents {
    Text {
        uri: String,
        #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        text: String,
    },
    Blob {
        uri: String,
        #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        blob: String,
    },
}

impl ResourceContents {
    /// Create text contents for a URI
    pub fn text<S: Into<String>>(uri: S, text: S) -> Self {
        ResourceContents::Text {
            uri: uri.into(),
            mime_type: None,
            text: text.into(),
        }
    }
}

/// Logging severity levels accepted by `logging/setLevel`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoggingLevel {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

// ============================================================================
// JSON-RPC Envelopes
// ============================================================================

/// JSON-RPC request message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Request ID for correlation
    pub id: RequestId,
    /// Method name being called
    pub method: String,
    /// Method parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC request
    pub fn new(id: RequestId, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// Successful JSON-RPC response message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Request ID copied from the request
    pub id: RequestId,
    /// Result of the method call
    pub result: Value,
}

impl JsonRpcResponse {
    /// Create a response carrying an already-serialized result
    pub fn new(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result,
        }
    }

    /// Create a response by serializing the given result
    pub fn success<T: Serialize>(id: RequestId, result: T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(id, serde_json::to_value(result)?))
    }
}

/// JSON-RPC error response message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcError {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Request ID copied from the request
    pub id: RequestId,
    /// Error information
    pub error: ErrorObject,
}

impl JsonRpcError {
    /// Create an error response
    pub fn new(id: RequestId, error: ErrorObject) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error,
        }
    }
}

/// Wire-level error object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorObject {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional error data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// JSON-RPC notification message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcNotification {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Method name being called
    pub method: String,
    /// Method parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    /// Create a new JSON-RPC notification
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
        }
    }
}

/// Outcome of dispatching a request: exactly one of `result` or `error`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum JsonRpcResponseOrError {
    Response(JsonRpcResponse),
    Error(JsonRpcError),
}

impl JsonRpcResponseOrError {
    /// The request id this outcome answers
    pub fn id(&self) -> &RequestId {
        match self {
            JsonRpcResponseOrError::Response(r) => &r.id,
            JsonRpcResponseOrError::Error(e) => &e.id,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, JsonRpcResponseOrError::Error(_))
    }

    pub fn as_response(&self) -> Option<&JsonRpcResponse> {
        match self {
            JsonRpcResponseOrError::Response(r) => Some(r),
            JsonRpcResponseOrError::Error(_) => None,
        }
    }

    pub fn as_error(&self) -> Option<&JsonRpcError> {
        match self {
            JsonRpcResponseOrError::Response(_) => None,
            JsonRpcResponseOrError::Error(e) => Some(e),
        }
    }
}

// ============================================================================
// Error Codes
// ============================================================================

/// Standard JSON-RPC error codes plus MCP-reserved extensions
pub mod error_codes {
    /// Invalid JSON was received (transport concern)
    pub const PARSE_ERROR: i32 = -32700;
    /// The JSON sent is not a valid Request object
    pub const INVALID_REQUEST: i32 = -32600;
    /// The method does not exist / is not available
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid method parameter(s)
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal JSON-RPC error
    pub const INTERNAL_ERROR: i32 = -32603;

    /// Requested protocol version is not supported
    pub const PROTOCOL_VERSION_MISMATCH: i32 = -32000;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_protocol_version() {
        assert_eq!(LATEST_PROTOCOL_VERSION, "2025-06-18");
        assert_eq!(JSONRPC_VERSION, "2.0");
    }

    #[test]
    fn test_request_id_serialization() {
        let string_id: RequestId = "req-1".into();
        assert_eq!(serde_json::to_value(&string_id).unwrap(), json!("req-1"));

        let numeric_id: RequestId = 42.into();
        assert_eq!(serde_json::to_value(&numeric_id).unwrap(), json!(42));

        let parsed: RequestId = serde_json::from_value(json!(7)).unwrap();
        assert_eq!(parsed, RequestId::Number(7));
    }

    #[test]
    fn test_progress_token_rejects_other_shapes() {
        assert!(serde_json::from_value::<ProgressToken>(json!("tok")).is_ok());
        assert!(serde_json::from_value::<ProgressToken>(json!(3)).is_ok());
        assert!(serde_json::from_value::<ProgressToken>(json!({"k": 1})).is_err());
        assert!(serde_json::from_value::<ProgressToken>(json!([1])).is_err());
    }

    #[test]
    fn test_content_block_serialization() {
        let text = ContentBlock::text("Hello, world!");
        let json = serde_json::to_value(&text).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["text"], "Hello, world!");

        let image = ContentBlock::image("base64data", "image/png");
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["mimeType"], "image/png");
    }

    #[test]
    fn test_tool_metadata_serialization() {
        let tool = Tool::new("echo", json!({"type": "object"})).with_description("Echo a message");

        let json = serde_json::to_value(&tool).unwrap();
        assert_eq!(json["name"], "echo");
        assert_eq!(json["description"], "Echo a message");
        assert_eq!(json["inputSchema"]["type"], "object");
        assert!(json.get("title").is_none());
    }

    #[test]
    fn test_resource_contents_untagged() {
        let text = ResourceContents::text("file:///a.txt", "hello");
        let json = serde_json::to_value(&text).unwrap();
        assert_eq!(json["uri"], "file:///a.txt");
        assert_eq!(json["text"], "hello");

        let parsed: ResourceContents = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, text);
    }

    #[test]
    fn test_response_or_error_roundtrip() {
        let response =
            JsonRpcResponseOrError::Response(JsonRpcResponse::new(1.into(), json!({"ok": true})));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["result"]["ok"], true);
        let parsed: JsonRpcResponseOrError = serde_json::from_value(value).unwrap();
        assert!(!parsed.is_error());

        let error = JsonRpcResponseOrError::Error(JsonRpcError::new(
            2.into(),
            ErrorObject {
                code: error_codes::METHOD_NOT_FOUND,
                message: "Method not found".to_string(),
                data: None,
            },
        ));
        let value = serde_json::to_value(&error).unwrap();
        assert_eq!(value["error"]["code"], -32601);
        let parsed: JsonRpcResponseOrError = serde_json::from_value(value).unwrap();
        assert!(parsed.is_error());
        assert_eq!(parsed.id(), &RequestId::Number(2));
    }

    #[test]
    fn test_capabilities_serialize_lazily() {
        let caps = ServerCapabilities {
            tools: Some(ToolsCapability {
                list_changed: Some(true),
            }),
            resources: Some(ResourcesCapability::default()),
            ..Default::default()
        };

        let json = serde_json::to_value(&caps).unwrap();
        assert_eq!(json["tools"]["listChanged"], true);
        // An enabled resources capability with no flags is an empty object
        assert_eq!(json["resources"], json!({}));
        assert!(json.get("prompts").is_none());
    }
}
