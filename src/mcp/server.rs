// ABOUTME: Stdio MCP server: reads JSON-RPC requests line by line and dispatches tools
// ABOUTME: Tool failures surface as isError tool results with user-friendly messages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 wger MCP Server contributors

//! # MCP Server Loop
//!
//! One JSON-RPC message per line on stdin, one response per line on stdout.
//! All logging goes to stderr; stdout is reserved for the protocol.

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::errors::{AppError, AppResult};
use crate::mcp::schema::{
    InitializeResult, JsonRpcRequest, JsonRpcResponse, ERROR_INTERNAL, ERROR_INVALID_PARAMS,
    ERROR_METHOD_NOT_FOUND, ERROR_PARSE,
};
use crate::tools::{ToolExecutionContext, ToolRegistry};

/// MCP server bound to a tool registry and its execution context.
pub struct McpServer {
    registry: ToolRegistry,
    context: ToolExecutionContext,
}

impl McpServer {
    /// Create a server over the given registry and context.
    #[must_use]
    pub fn new(registry: ToolRegistry, context: ToolExecutionContext) -> Self {
        Self { registry, context }
    }

    /// Serve requests from stdin until it closes.
    ///
    /// # Errors
    /// Fails when stdin or stdout become unusable; per-request failures are
    /// reported to the client, not returned here.
    pub async fn run(&self) -> AppResult<()> {
        info!("wger MCP server listening on stdio");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| AppError::api(None, format!("failed to read from stdin: {e}")))?
        {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_message(&line).await {
                let mut serialized = serde_json::to_string(&response)
                    .map_err(|e| AppError::api(None, format!("failed to encode response: {e}")))?;
                serialized.push('\n');
                stdout
                    .write_all(serialized.as_bytes())
                    .await
                    .map_err(|e| AppError::api(None, format!("failed to write to stdout: {e}")))?;
                stdout
                    .flush()
                    .await
                    .map_err(|e| AppError::api(None, format!("failed to write to stdout: {e}")))?;
            }
        }

        info!("stdin closed, shutting down");
        Ok(())
    }

    /// Handle one raw message; `None` for notifications.
    pub async fn handle_message(&self, raw: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(raw) {
            Ok(request) => request,
            Err(e) => {
                warn!("received malformed JSON-RPC message: {e}");
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    ERROR_PARSE,
                    format!("Parse error: {e}"),
                ));
            }
        };

        debug!(method = %request.method, "handling request");
        let id = request.id.clone();
        let response = self.dispatch(request).await;
        // Notifications get no response even when dispatch produced one.
        id.map(|id| match response {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err((code, message)) => JsonRpcResponse::error(id, code, message),
        })
    }

    async fn dispatch(&self, request: JsonRpcRequest) -> Result<Value, (i32, String)> {
        match request.method.as_str() {
            "initialize" => serde_json::to_value(InitializeResult::default())
                .map_err(|e| (ERROR_INTERNAL, e.to_string())),
            "notifications/initialized" | "notifications/cancelled" => Ok(Value::Null),
            "ping" => Ok(json!({})),
            "tools/list" => serde_json::to_value(json!({ "tools": self.registry.descriptors() }))
                .map_err(|e| (ERROR_INTERNAL, e.to_string())),
            "tools/call" => self.call_tool(request.params.unwrap_or(Value::Null)).await,
            other => Err((
                ERROR_METHOD_NOT_FOUND,
                format!("Method not found: {other}"),
            )),
        }
    }

    async fn call_tool(&self, params: Value) -> Result<Value, (i32, String)> {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| (ERROR_INVALID_PARAMS, "Missing tool name".to_owned()))?;
        let arguments = params
            .get("arguments")
            .cloned()
            .unwrap_or_else(|| json!({}));

        let Some(tool) = self.registry.find(name) else {
            return Err((ERROR_INVALID_PARAMS, format!("Unknown tool: {name}")));
        };

        info!(tool = name, "executing tool");
        match tool.execute(arguments, &self.context).await {
            Ok(result) => {
                let text = serde_json::to_string_pretty(result.content())
                    .map_err(|e| (ERROR_INTERNAL, e.to_string()))?;
                Ok(json!({
                    "content": [{ "type": "text", "text": text }],
                    "isError": result.is_error(),
                }))
            }
            Err(error) => {
                warn!(tool = name, "tool execution failed: {error}");
                Ok(json!({
                    "content": [{ "type": "text", "text": error.user_message() }],
                    "isError": true,
                }))
            }
        }
    }
}
