//! MCP protocol types (JSON-RPC 2.0, client side)

use invox_domain::{ContentFragment, ToolCapability};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol revision sent during the initialize handshake.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC request or notification (a request without an id)
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (must be "2.0")
    pub jsonrpc: &'static str,
    /// Request ID; absent for notifications
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Method name
    pub method: String,
    /// Method parameters
    #[serde(skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

impl JsonRpcRequest {
    /// Create a request carrying an id.
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id: Some(id),
            method: method.into(),
            params,
        }
    }

    /// Create a notification (no id, no response expected).
    pub fn notification(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id: None,
            method: method.into(),
            params: Value::Null,
        }
    }
}

/// JSON-RPC response envelope
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse {
    /// Request ID this response answers
    pub id: Option<Value>,
    /// Result data on success
    pub result: Option<Value>,
    /// Error details on failure
    pub error: Option<ErrorDetail>,
}

/// Error detail structure
#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
}

/// `tools/list` result payload
#[derive(Debug, Deserialize)]
pub struct ToolListResult {
    /// Advertised tools
    pub tools: Vec<ToolEntry>,
}

/// One advertised tool
#[derive(Debug, Deserialize)]
pub struct ToolEntry {
    /// Tool name
    pub name: String,
    /// Tool description
    #[serde(default)]
    pub description: Option<String>,
    /// Input schema (JSON Schema)
    #[serde(rename = "inputSchema", default)]
    pub input_schema: Value,
}

impl From<ToolEntry> for ToolCapability {
    fn from(entry: ToolEntry) -> Self {
        ToolCapability {
            name: entry.name,
            description: entry.description.unwrap_or_default(),
            input_schema: entry.input_schema,
        }
    }
}

/// `tools/call` result payload
#[derive(Debug, Deserialize)]
pub struct CallToolResult {
    /// Result content items
    #[serde(default)]
    pub content: Vec<ContentItem>,
}

/// One content item of a tool result
#[derive(Debug, Deserialize)]
pub struct ContentItem {
    /// Content type ("text" is the only one consumed)
    #[serde(rename = "type")]
    pub kind: String,
    /// Text payload for text items
    #[serde(default)]
    pub text: Option<String>,
}

impl CallToolResult {
    /// Keep the text fragments, dropping non-text content.
    pub fn into_fragments(self) -> Vec<ContentFragment> {
        self.content
            .into_iter()
            .filter(|item| item.kind == "text")
            .filter_map(|item| item.text)
            .map(ContentFragment::new)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let request = JsonRpcRequest::new(7, "tools/list", json!({}));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["jsonrpc"], json!("2.0"));
        assert_eq!(value["id"], json!(7));
        assert_eq!(value["method"], json!("tools/list"));
    }

    #[test]
    fn test_notification_has_no_id() {
        let request = JsonRpcRequest::notification("notifications/initialized");
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("id").is_none());
        assert!(value.get("params").is_none());
    }

    #[test]
    fn test_tool_list_parsing() {
        let result: ToolListResult = serde_json::from_value(json!({
            "tools": [{
                "name": "box_ai_extract_tool",
                "description": "Extract fields from a Box file",
                "inputSchema": {"type": "object", "properties": {"file_id": {"type": "string"}}}
            }]
        }))
        .unwrap();

        let capability: ToolCapability = result.tools.into_iter().next().unwrap().into();
        assert_eq!(capability.name, "box_ai_extract_tool");
        assert_eq!(capability.input_schema["type"], json!("object"));
    }

    #[test]
    fn test_call_result_keeps_text_fragments_only() {
        let result: CallToolResult = serde_json::from_value(json!({
            "content": [
                {"type": "text", "text": "{\"answer\": \"{}\"}"},
                {"type": "image", "data": "base64"},
                {"type": "text", "text": "second"}
            ]
        }))
        .unwrap();

        let fragments = result.into_fragments();
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[1].text, "second");
    }

    #[test]
    fn test_error_response_parsing() {
        let response: JsonRpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"Method not found"}}"#,
        )
        .unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, -32601);
        assert!(response.result.is_none());
    }
}
