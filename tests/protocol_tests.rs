//! Wire-shape tests: exact JSON emitted for responses and errors

use keel_mcp::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn success_responses_have_exactly_the_jsonrpc_shape() {
    let server = McpServer::new("wire-test", "0.0.1");

    let outcome = server
        .dispatch(
            json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}),
            DispatchOptions::default(),
        )
        .await
        .unwrap();

    let value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(value, json!({"jsonrpc": "2.0", "id": 1, "result": {}}));
    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), 3);
}

#[tokio::test]
async fn error_responses_have_exactly_the_jsonrpc_shape() {
    let server = McpServer::new("wire-test", "0.0.1");

    let outcome = server
        .dispatch(
            json!({"jsonrpc": "2.0", "id": "r", "method": "unknown/method"}),
            DispatchOptions::default(),
        )
        .await
        .unwrap();

    let value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(
        value,
        json!({
            "jsonrpc": "2.0",
            "id": "r",
            "error": {
                "code": -32601,
                "message": "Method not found",
                "data": { "method": "unknown/method" }
            }
        })
    );
    // Never both result and error
    assert!(value.get("result").is_none());
}

#[test]
fn error_code_table_matches_jsonrpc() {
    assert_eq!(error_codes::PARSE_ERROR, -32700);
    assert_eq!(error_codes::INVALID_REQUEST, -32600);
    assert_eq!(error_codes::METHOD_NOT_FOUND, -32601);
    assert_eq!(error_codes::INVALID_PARAMS, -32602);
    assert_eq!(error_codes::INTERNAL_ERROR, -32603);
    assert_eq!(error_codes::PROTOCOL_VERSION_MISMATCH, -32000);
}

#[test]
fn request_and_notification_envelopes_roundtrip() {
    let request = JsonRpcRequest::new(7.into(), "tools/list", None);
    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value, json!({"jsonrpc": "2.0", "id": 7, "method": "tools/list"}));
    let back: JsonRpcRequest = serde_json::from_value(value).unwrap();
    assert_eq!(back, request);

    let notification = JsonRpcNotification::new(
        methods::PROGRESS,
        Some(json!({"progressToken": "t", "progress": 1.0})),
    );
    let value = serde_json::to_value(&notification).unwrap();
    assert_eq!(value["method"], "notifications/progress");
    assert!(value.get("id").is_none());
}

#[test]
fn initialize_result_uses_camel_case_keys() {
    let result = InitializeResult {
        protocol_version: LATEST_PROTOCOL_VERSION.to_string(),
        capabilities: ServerCapabilities::default(),
        server_info: Implementation::new("s", "1.0"),
        instructions: None,
    };

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["protocolVersion"], "2025-06-18");
    assert_eq!(value["serverInfo"]["name"], "s");
    assert!(value.get("instructions").is_none());
}
