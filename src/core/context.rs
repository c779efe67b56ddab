//! Per-request context
//!
//! One [`RequestContext`] is built for each dispatched message and
//! discarded afterwards. It carries the raw message, correlation ids, a
//! mutable state bag for middleware, and — when the client asked for it —
//! a progress sender bound to the originating request.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::core::error::McpResult;
use crate::core::schema::{self, SchemaValidator};
use crate::protocol::messages::ProgressParams;
use crate::protocol::methods;
use crate::protocol::types::{JsonRpcNotification, JsonRpcResponse, ProgressToken, RequestId};

/// Options accompanying a dispatched message, supplied by the transport
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    /// Session the message belongs to
    pub session_id: Option<String>,
    /// Authentication info established by outer layers
    pub auth_info: Option<Value>,
}

/// Delivery options for a server-to-client notification
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationOptions {
    /// Request this notification relates to, for client-side correlation
    pub related_request_id: Option<RequestId>,
}

/// Transport-supplied capability for pushing notifications to a client.
///
/// Wired in once by the transport; lives as long as the server.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(
        &self,
        session_id: Option<&str>,
        notification: JsonRpcNotification,
        options: NotificationOptions,
    ) -> McpResult<()>;
}

/// One progress update emitted by a handler
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressUpdate {
    /// Current progress value
    pub progress: f64,
    /// Total progress expected, if known
    pub total: Option<f64>,
    /// Optional human-readable status
    pub message: Option<String>,
}

/// The bound view a context holds when progress reporting is available:
/// sender, session, token, and originating request id.
pub(crate) struct ProgressScope {
    pub(crate) sender: Arc<dyn NotificationSender>,
    pub(crate) session_id: String,
    pub(crate) token: ProgressToken,
    pub(crate) related_request_id: Option<RequestId>,
}

/// Per-request context handed to middleware and handlers
pub struct RequestContext {
    /// The raw inbound message
    pub request: Value,
    /// Request id; `None` for notifications
    pub request_id: Option<RequestId>,
    /// Session the request arrived on
    pub session_id: Option<String>,
    /// Authentication info established by outer layers
    pub auth_info: Option<Value>,
    /// Freely mutable state bag shared along the middleware chain
    pub state: HashMap<String, Value>,
    /// Response produced by the tail; absent until the tail runs
    pub response: Option<JsonRpcResponse>,
    pub(crate) progress: Option<ProgressScope>,
}

impl RequestContext {
    pub(crate) fn new(
        request: Value,
        request_id: Option<RequestId>,
        options: DispatchOptions,
    ) -> Self {
        Self {
            request,
            request_id,
            session_id: options.session_id,
            auth_info: options.auth_info,
            state: HashMap::new(),
            response: None,
            progress: None,
        }
    }

    pub(crate) fn bind_progress(&mut self, scope: ProgressScope) {
        self.progress = Some(scope);
    }

    /// Method name of the inbound message, if present
    pub fn method(&self) -> Option<&str> {
        self.request.get("method").and_then(Value::as_str)
    }

    /// Raw params of the inbound message, if present
    pub fn params(&self) -> Option<&Value> {
        self.request.get("params")
    }

    /// Whether the message is a notification (no response will be sent)
    pub fn is_notification(&self) -> bool {
        self.request_id.is_none()
    }

    /// Whether a progress sender is bound to this request
    pub fn supports_progress(&self) -> bool {
        self.progress.is_some()
    }

    /// Run a validator against a raw value.
    ///
    /// Failures surface as `INVALID_PARAMS` regardless of the code the
    /// validator reported.
    pub async fn validate(
        &self,
        validator: &Arc<dyn SchemaValidator>,
        raw: &Value,
    ) -> McpResult<Value> {
        validator
            .validate(raw)
            .await
            .map_err(schema::into_invalid_params)
    }

    /// Emit a `notifications/progress` tagged with this request's token
    /// and id.
    ///
    /// A no-op when the client supplied no progress token or the transport
    /// wired no sender. Send failures are logged and swallowed; progress
    /// can never fail the request it reports on.
    pub async fn progress(&self, update: ProgressUpdate) -> McpResult<()> {
        let Some(scope) = &self.progress else {
            return Ok(());
        };

        let params = ProgressParams {
            progress_token: scope.token.clone(),
            progress: update.progress,
            total: update.total,
            message: update.message,
        };
        let notification =
            JsonRpcNotification::new(methods::PROGRESS, Some(serde_json::to_value(&params)?));
        let options = NotificationOptions {
            related_request_id: scope.related_request_id.clone(),
        };
        if let Err(err) = scope
            .sender
            .send(Some(&scope.session_id), notification, options)
            .await
        {
            warn!(code = err.code, "progress notification dropped: {}", err.message);
        }
        Ok(())
    }
}

/// Extract the progress token from `params._meta.progressToken`.
///
/// Only string and integer tokens are accepted; any other shape yields
/// `None`.
pub(crate) fn extract_progress_token(message: &Value) -> Option<ProgressToken> {
    let token = message.get("params")?.get("_meta")?.get("progressToken")?;
    match token {
        Value::String(s) => Some(ProgressToken::String(s.clone())),
        Value::Number(n) => n.as_i64().map(ProgressToken::Number),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_progress_token_location() {
        let message = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"_meta": {"progressToken": "tok"}}
        });
        assert_eq!(
            extract_progress_token(&message),
            Some(ProgressToken::String("tok".to_string()))
        );

        // Top-level progressToken is not recognized
        let message = json!({"jsonrpc": "2.0", "id": 1, "progressToken": "tok"});
        assert_eq!(extract_progress_token(&message), None);
    }

    #[test]
    fn test_extract_progress_token_shapes() {
        let numeric = json!({"params": {"_meta": {"progressToken": 7}}});
        assert_eq!(
            extract_progress_token(&numeric),
            Some(ProgressToken::Number(7))
        );

        let object = json!({"params": {"_meta": {"progressToken": {"nested": true}}}});
        assert_eq!(extract_progress_token(&object), None);

        let boolean = json!({"params": {"_meta": {"progressToken": true}}});
        assert_eq!(extract_progress_token(&boolean), None);
    }

    #[tokio::test]
    async fn test_progress_without_binding_is_noop() {
        let ctx = RequestContext::new(json!({}), None, DispatchOptions::default());
        assert!(!ctx.supports_progress());
        assert!(ctx.progress(ProgressUpdate::default()).await.is_ok());
    }
}
