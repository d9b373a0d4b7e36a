// ABOUTME: Diagnostic tool reporting configuration presence flags
// ABOUTME: Never exposes secret values, only whether they are set
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 wger MCP Server contributors

//! Configuration diagnostics.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::errors::AppResult;
use crate::mcp::schema::JsonSchema;
use crate::tools::{McpTool, ToolExecutionContext, ToolResult};

/// Reports which configuration options are present.
pub struct DiagnoseTool;

#[async_trait]
impl McpTool for DiagnoseTool {
    fn name(&self) -> &'static str {
        "diagnose"
    }

    fn description(&self) -> &'static str {
        "Diagnostic tool to check configuration"
    }

    fn input_schema(&self) -> JsonSchema {
        JsonSchema::empty_object()
    }

    async fn execute(&self, _args: Value, ctx: &ToolExecutionContext) -> AppResult<ToolResult> {
        Ok(ToolResult::ok(json!({
            "hasApiKey": ctx.config.api_key.is_some(),
            "apiUrl": ctx.config.api_url.as_str(),
            "hasCredentials": ctx.auth.has_credentials(),
            "apiKeyLength": ctx.config.api_key.as_ref().map_or(0, String::len),
        })))
    }
}
