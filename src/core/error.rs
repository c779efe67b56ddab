//! Error types for the MCP server core
//!
//! The one first-class error is [`RpcError`]: a JSON-RPC error object with
//! code, message, and optional data. It serializes to the wire `error`
//! member verbatim. Anything else reaching the dispatcher is foreign and
//! coerced into an internal error.

use serde_json::{Value, json};
use thiserror::Error;

use crate::protocol::types::{ErrorObject, LATEST_PROTOCOL_VERSION, error_codes};

/// A JSON-RPC error with code, message, and optional structured data
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct RpcError {
    /// JSON-RPC error code
    pub code: i32,
    /// Human-readable error message
    pub message: String,
    /// Additional structured error data
    pub data: Option<Value>,
}

/// Result type alias for MCP operations
pub type McpResult<T> = Result<T, RpcError>;

impl RpcError {
    /// Create a new error with the given code and message
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Attach structured data to the error
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Create an invalid-request error (malformed envelope)
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(error_codes::INVALID_REQUEST, message)
    }

    /// Create a method-not-found error
    pub fn method_not_found() -> Self {
        Self::new(error_codes::METHOD_NOT_FOUND, "Method not found")
    }

    /// Create an invalid-params error
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(error_codes::INVALID_PARAMS, message)
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(error_codes::INTERNAL_ERROR, message)
    }

    /// Create a not-implemented error for a stubbed method
    pub fn not_implemented(method: &str) -> Self {
        Self::internal("Not implemented").with_data(json!({ "method": method }))
    }

    /// Create a protocol-version mismatch error carrying both versions
    pub fn protocol_version_mismatch(requested: &str) -> Self {
        Self::new(
            error_codes::PROTOCOL_VERSION_MISMATCH,
            "Unsupported protocol version",
        )
        .with_data(json!({
            "supportedVersion": LATEST_PROTOCOL_VERSION,
            "requestedVersion": requested,
        }))
    }
}

impl From<RpcError> for ErrorObject {
    fn from(err: RpcError) -> Self {
        ErrorObject {
            code: err.code,
            message: err.message,
            data: err.data,
        }
    }
}

impl From<ErrorObject> for RpcError {
    fn from(err: ErrorObject) -> Self {
        Self {
            code: err.code,
            message: err.message,
            data: err.data,
        }
    }
}

// Foreign errors carry their message under INTERNAL_ERROR
impl From<serde_json::Error> for RpcError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal("Internal error").with_data(json!({ "message": err.to_string() }))
    }
}

impl From<std::io::Error> for RpcError {
    fn from(err: std::io::Error) -> Self {
        Self::internal("Internal error").with_data(json!({ "message": err.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        let error = RpcError::method_not_found();
        assert_eq!(error.code, -32601);
        assert_eq!(error.to_string(), "Method not found");

        let error = RpcError::invalid_params("Tool name cannot be empty");
        assert_eq!(error.code, -32602);

        let error = RpcError::internal("No response generated");
        assert_eq!(error.code, -32603);
    }

    #[test]
    fn test_not_implemented_carries_method() {
        let error = RpcError::not_implemented("resources/subscribe");
        assert_eq!(error.code, -32603);
        assert_eq!(error.message, "Not implemented");
        assert_eq!(
            error.data.unwrap()["method"],
            json!("resources/subscribe")
        );
    }

    #[test]
    fn test_protocol_version_mismatch_data() {
        let error = RpcError::protocol_version_mismatch("1999-01-01");
        assert_eq!(error.code, -32000);
        let data = error.data.unwrap();
        assert_eq!(data["supportedVersion"], LATEST_PROTOCOL_VERSION);
        assert_eq!(data["requestedVersion"], "1999-01-01");
    }

    #[test]
    fn test_error_object_conversion_is_verbatim() {
        let error = RpcError::invalid_params("bad shape").with_data(json!({"field": "name"}));
        let object = ErrorObject::from(error.clone());
        assert_eq!(object.code, error.code);
        assert_eq!(object.message, error.message);
        assert_eq!(object.data, error.data);
    }

    #[test]
    fn test_foreign_error_coercion() {
        let parse_failure = serde_json::from_str::<Value>("not json").unwrap_err();
        let error: RpcError = parse_failure.into();
        assert_eq!(error.code, -32603);
        assert!(error.data.unwrap()["message"].is_string());
    }
}
