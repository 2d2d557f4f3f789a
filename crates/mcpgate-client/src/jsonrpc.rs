// mcpgate-client/src/jsonrpc.rs
// ============================================================================
// Module: JSON-RPC Frame Types
// Description: Request/response/error envelopes for MCP's JSON-RPC dialect.
// Dependencies: serde, serde_json
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// JSON-RPC request envelope.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version tag, always `"2.0"`.
    pub jsonrpc: &'static str,
    /// Request identifier. Monotonically increasing, starting at 1.
    pub id: u64,
    /// Method name to invoke.
    pub method: String,
    /// Optional parameters payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Builds a request with the standard `"2.0"` version tag.
    #[must_use]
    pub fn new(id: u64, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC notification: a request with no `id`, expecting no response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcNotification {
    /// JSON-RPC version tag, always `"2.0"`.
    pub jsonrpc: &'static str,
    /// Method name to invoke.
    pub method: String,
    /// Optional parameters payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    /// Builds a notification with the standard `"2.0"` version tag.
    #[must_use]
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC error payload.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JsonRpcErrorPayload {
    /// Numeric error code.
    pub code: i64,
    /// Error message provided by the server.
    pub message: String,
    /// Optional structured error data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A decoded JSON-RPC frame, either a response or a notification the
/// server sent unprompted.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcFrame {
    /// Present on responses; absent on server-initiated notifications.
    #[serde(default)]
    pub id: Option<u64>,
    /// Present on server-initiated notifications; absent on responses.
    #[serde(default)]
    pub method: Option<String>,
    /// Result payload, present on a successful response.
    #[serde(default)]
    pub result: Option<Value>,
    /// Error payload, present on a failed response.
    #[serde(default)]
    pub error: Option<JsonRpcErrorPayload>,
}

impl JsonRpcFrame {
    /// Returns `true` when this frame is a response (carries an `id`),
    /// as opposed to a server-initiated notification.
    #[must_use]
    pub const fn is_response(&self) -> bool {
        self.id.is_some()
    }

    /// The JSON-RPC code for "method not found".
    pub const METHOD_NOT_FOUND: i64 = -32601;

    /// Returns `true` when this frame's error is "method not found".
    #[must_use]
    pub fn is_method_not_found(&self) -> bool {
        self.error
            .as_ref()
            .is_some_and(|err| err.code == Self::METHOD_NOT_FOUND)
    }
}
