// ABOUTME: JSON-RPC 2.0 and MCP wire types for the stdio protocol layer
// ABOUTME: Includes tool descriptor schemas and initialization payloads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 wger MCP Server contributors

//! Wire-level types for the MCP protocol (JSON-RPC 2.0 over stdio).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{JSONRPC_VERSION, MCP_PROTOCOL_VERSION, SERVER_NAME};

/// JSON-RPC error code: malformed JSON.
pub const ERROR_PARSE: i32 = -32700;
/// JSON-RPC error code: request object invalid.
pub const ERROR_INVALID_REQUEST: i32 = -32600;
/// JSON-RPC error code: unknown method.
pub const ERROR_METHOD_NOT_FOUND: i32 = -32601;
/// JSON-RPC error code: invalid method parameters.
pub const ERROR_INVALID_PARAMS: i32 = -32602;
/// JSON-RPC error code: internal server error.
pub const ERROR_INTERNAL: i32 = -32603;

/// Incoming JSON-RPC request or notification.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version marker, expected to be `"2.0"`.
    #[serde(default)]
    pub jsonrpc: String,
    /// Request id; absent for notifications.
    #[serde(default)]
    pub id: Option<Value>,
    /// Method name.
    pub method: String,
    /// Method parameters.
    #[serde(default)]
    pub params: Option<Value>,
}

/// Outgoing JSON-RPC response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// Mirrors the request id (`null` when it could not be read).
    pub id: Value,
    /// Successful result payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Build a success response.
    #[must_use]
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Build an error response.
    #[must_use]
    pub fn error(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// JSON-RPC error object.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    /// Numeric error code.
    pub code: i32,
    /// Human-readable message.
    pub message: String,
    /// Optional structured payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// JSON Schema for a tool's input object.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSchema {
    /// Always `"object"` for tool inputs.
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Named input properties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, PropertySchema>>,
    /// Required property names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl JsonSchema {
    /// Schema for an object with the given properties.
    #[must_use]
    pub fn object(properties: HashMap<String, PropertySchema>, required: Vec<String>) -> Self {
        Self {
            schema_type: "object".to_owned(),
            properties: Some(properties),
            required: if required.is_empty() {
                None
            } else {
                Some(required)
            },
        }
    }

    /// Schema for a tool that takes no input.
    #[must_use]
    pub fn empty_object() -> Self {
        Self {
            schema_type: "object".to_owned(),
            properties: Some(HashMap::new()),
            required: None,
        }
    }
}

/// Schema for one input property.
#[derive(Debug, Clone, Serialize)]
pub struct PropertySchema {
    /// JSON type name (`"string"`, `"number"`, ...).
    #[serde(rename = "type")]
    pub property_type: String,
    /// Property description shown to the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PropertySchema {
    /// A string property.
    #[must_use]
    pub fn string(description: &str) -> Self {
        Self {
            property_type: "string".to_owned(),
            description: Some(description.to_owned()),
        }
    }

    /// A numeric property.
    #[must_use]
    pub fn number(description: &str) -> Self {
        Self {
            property_type: "number".to_owned(),
            description: Some(description.to_owned()),
        }
    }
}

/// Tool descriptor returned from `tools/list`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// Input schema.
    #[serde(rename = "inputSchema")]
    pub input_schema: JsonSchema,
}

/// Result payload for `initialize`.
#[derive(Debug, Clone, Serialize)]
pub struct InitializeResult {
    /// MCP protocol revision.
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Advertised capabilities.
    pub capabilities: ServerCapabilities,
    /// Server identity.
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

impl Default for InitializeResult {
    fn default() -> Self {
        Self {
            protocol_version: MCP_PROTOCOL_VERSION.to_owned(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {},
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_owned(),
                version: env!("CARGO_PKG_VERSION").to_owned(),
            },
        }
    }
}

/// Capability set advertised during initialization.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    /// Tool execution capability.
    pub tools: ToolsCapability,
}

/// Marker for tool support.
#[derive(Debug, Clone, Serialize)]
pub struct ToolsCapability {}

/// Server name and version reported to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Crate version.
    pub version: String,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn notification_parses_without_id() {
        let request: JsonRpcRequest =
            serde_json::from_value(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
                .unwrap();
        assert!(request.id.is_none());
        assert_eq!(request.method, "notifications/initialized");
    }

    #[test]
    fn error_responses_omit_result() {
        let response = JsonRpcResponse::error(json!(3), ERROR_METHOD_NOT_FOUND, "nope");
        let serialized = serde_json::to_value(&response).unwrap();
        assert!(serialized.get("result").is_none());
        assert_eq!(serialized["error"]["code"], json!(-32601));
    }

    #[test]
    fn input_schema_serializes_with_json_schema_field_names() {
        let mut properties = HashMap::new();
        properties.insert("exerciseId".to_owned(), PropertySchema::number("id"));
        let schema = JsonSchema::object(properties, vec!["exerciseId".to_owned()]);
        let serialized = serde_json::to_value(&schema).unwrap();
        assert_eq!(serialized["type"], json!("object"));
        assert_eq!(serialized["properties"]["exerciseId"]["type"], json!("number"));
        assert_eq!(serialized["required"], json!(["exerciseId"]));
    }
}
