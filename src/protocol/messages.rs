//! MCP protocol messages
//!
//! Typed parameter and result payloads for every method the dispatcher
//! serves, aligned with the 2025-06-18 specification.

use crate::protocol::types::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// ============================================================================
// Request Parameter Types
// ============================================================================

/// Parameters for initialize request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InitializeParams {
    /// Protocol version the client speaks
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Client capabilities
    pub capabilities: ClientCapabilities,
    /// Client implementation info
    #[serde(rename = "clientInfo")]
    pub client_info: Implementation,
    /// Request metadata
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, Value>>,
}

/// Parameters for tool call request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CallToolParams {
    /// Name of the tool to call
    pub name: String,
    /// Raw arguments; validated before reaching the handler when the tool
    /// was registered with a validator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
    /// Request metadata
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, Value>>,
}

/// Parameters for prompt get request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GetPromptParams {
    /// Name of the prompt
    pub name: String,
    /// Arguments for prompt templating; defaults to an empty object
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
    /// Request metadata
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, Value>>,
}

/// Parameters for resource read request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadResourceParams {
    /// URI of the resource to read
    pub uri: String,
    /// Request metadata
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, Value>>,
}

/// Parameters for list requests (cursor accepted, not interpreted)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ListParams {
    /// Pagination cursor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    /// Request metadata
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, Value>>,
}

/// Parameters for logging level set request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetLoggingLevelParams {
    /// Logging level to set
    pub level: LoggingLevel,
    /// Request metadata
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, Value>>,
}

// ============================================================================
// Response Result Types
// ============================================================================

/// Result for initialize request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InitializeResult {
    /// Protocol version the server speaks
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Server capabilities
    pub capabilities: ServerCapabilities,
    /// Server implementation info
    #[serde(rename = "serverInfo")]
    pub server_info: Implementation,
    /// Optional instructions for the client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// Result for tool call request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CallToolResult {
    /// Content parts produced by the tool
    pub content: Vec<ContentBlock>,
    /// Whether the tool reported a domain-level failure
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
    /// Structured result payload
    #[serde(rename = "structuredContent", skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
}

impl CallToolResult {
    /// Create a successful result with a single text part
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            is_error: None,
            structured_content: None,
        }
    }
}

/// Result for list tools request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListToolsResult {
    /// Available tools in registration order
    pub tools: Vec<Tool>,
    /// Next cursor for pagination
    #[serde(rename = "nextCursor", skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Result for list prompts request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListPromptsResult {
    /// Available prompts in registration order
    pub prompts: Vec<Prompt>,
    /// Next cursor for pagination
    #[serde(rename = "nextCursor", skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Result for prompt get request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GetPromptResult {
    /// Description of the generated prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Generated messages
    pub messages: Vec<PromptMessage>,
}

impl GetPromptResult {
    pub fn new(messages: Vec<PromptMessage>) -> Self {
        Self {
            description: None,
            messages,
        }
    }
}

/// Result for list resources request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListResourcesResult {
    /// Available static resources in registration order
    pub resources: Vec<Resource>,
    /// Next cursor for pagination
    #[serde(rename = "nextCursor", skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Result for list resource templates request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListResourceTemplatesResult {
    /// Available resource templates in registration order
    #[serde(rename = "resourceTemplates")]
    pub resource_templates: Vec<ResourceTemplate>,
    /// Next cursor for pagination
    #[serde(rename = "nextCursor", skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Result for read resource request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadResourceResult {
    /// Resource contents
    pub contents: Vec<ResourceContents>,
}

impl ReadResourceResult {
    /// Create a result with a single text part
    pub fn text<S: Into<String>>(uri: S, text: S) -> Self {
        Self {
            contents: vec![ResourceContents::text(uri, text)],
        }
    }
}

// ============================================================================
// Notification Parameter Types
// ============================================================================

/// Parameters for progress notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressParams {
    /// Progress token from the originating request
    #[serde(rename = "progressToken")]
    pub progress_token: ProgressToken,
    /// Current progress value
    pub progress: f64,
    /// Total progress expected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    /// Optional progress message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Parameters for cancelled notification (accepted, not acted upon)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CancelledParams {
    /// ID of the request being cancelled
    #[serde(rename = "requestId")]
    pub request_id: RequestId,
    /// Optional reason for cancellation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Parameters for resource updated notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceUpdatedParams {
    /// URI of the updated resource
    pub uri: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_initialize_params_roundtrip() {
        let value = json!({
            "protocolVersion": "2025-06-18",
            "capabilities": {},
            "clientInfo": {"name": "test-client", "version": "1.0.0"}
        });

        let params: InitializeParams = serde_json::from_value(value).unwrap();
        assert_eq!(params.protocol_version, "2025-06-18");
        assert_eq!(params.client_info.name, "test-client");

        let back = serde_json::to_value(&params).unwrap();
        assert_eq!(back["clientInfo"]["version"], "1.0.0");
    }

    #[test]
    fn test_call_tool_params_accept_missing_arguments() {
        let params: CallToolParams = serde_json::from_value(json!({"name": "echo"})).unwrap();
        assert_eq!(params.name, "echo");
        assert!(params.arguments.is_none());
    }

    #[test]
    fn test_call_tool_params_reject_non_object() {
        assert!(serde_json::from_value::<CallToolParams>(json!(5)).is_err());
        assert!(serde_json::from_value::<CallToolParams>(json!("echo")).is_err());
        assert!(serde_json::from_value::<CallToolParams>(json!({"name": 7})).is_err());
    }

    #[test]
    fn test_call_tool_result_serialization() {
        let result = CallToolResult {
            content: vec![ContentBlock::text("done")],
            is_error: Some(false),
            structured_content: Some(json!({"status": "ok"})),
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["content"][0]["text"], "done");
        assert_eq!(json["isError"], false);
        assert_eq!(json["structuredContent"]["status"], "ok");
    }

    #[test]
    fn test_list_results_omit_absent_cursor() {
        let result = ListToolsResult {
            tools: vec![],
            next_cursor: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("nextCursor").is_none());
        assert!(json["tools"].is_array());
    }

    #[test]
    fn test_progress_params_serialization() {
        let params = ProgressParams {
            progress_token: "upload-1".into(),
            progress: 50.0,
            total: Some(100.0),
            message: None,
        };

        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["progressToken"], "upload-1");
        assert_eq!(json["progress"], 50.0);
        assert_eq!(json["total"], 100.0);
        assert!(json.get("message").is_none());
    }

    #[test]
    fn test_cancelled_params_roundtrip() {
        let params: CancelledParams =
            serde_json::from_value(json!({"requestId": "req-9", "reason": "user"})).unwrap();
        assert_eq!(params.request_id, "req-9".into());
        assert_eq!(params.reason.as_deref(), Some("user"));
    }

    #[test]
    fn test_read_resource_result_helper() {
        let result = ReadResourceResult::text("github://repos/a/b", "a/b");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["contents"][0]["uri"], "github://repos/a/b");
        assert_eq!(json["contents"][0]["text"], "a/b");
    }
}
