// ABOUTME: McpTool trait, execution context, and registry for the wger tool set
// ABOUTME: Shared argument extraction helpers used by every tool handler
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 wger MCP Server contributors

//! # MCP Tools
//!
//! Each callable operation is an [`McpTool`]: a name, a description, an input
//! schema, and an async `execute`. Tools receive their collaborators through
//! [`ToolExecutionContext`] rather than reaching into global state, so each
//! one can be exercised in isolation with a fake transport.

pub mod diagnose;
pub mod exercises;
pub mod workouts;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::auth::AuthManager;
use crate::cache::TtlCache;
use crate::client::WgerClient;
use crate::config::ServerConfig;
use crate::errors::{AppError, AppResult};
use crate::mcp::schema::{JsonSchema, ToolDescriptor};

/// Dependencies handed to every tool execution.
pub struct ToolExecutionContext {
    /// Runtime configuration.
    pub config: Arc<ServerConfig>,
    /// Token manager.
    pub auth: Arc<AuthManager>,
    /// Resilient wger API client.
    pub client: Arc<WgerClient>,
    /// Shared TTL cache.
    pub cache: Arc<TtlCache>,
}

/// Outcome of a tool execution.
#[derive(Debug, Clone)]
pub struct ToolResult {
    content: Value,
    is_error: bool,
}

impl ToolResult {
    /// Successful result carrying a JSON payload.
    #[must_use]
    pub fn ok(content: Value) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    /// Failed result carrying a JSON payload.
    #[must_use]
    pub fn error(content: Value) -> Self {
        Self {
            content,
            is_error: true,
        }
    }

    /// The JSON payload.
    #[must_use]
    pub fn content(&self) -> &Value {
        &self.content
    }

    /// Whether this result represents a failure.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.is_error
    }
}

/// A single callable MCP tool.
#[async_trait]
pub trait McpTool: Send + Sync {
    /// Tool name as exposed over MCP.
    fn name(&self) -> &'static str;

    /// One-paragraph tool description shown to the model.
    fn description(&self) -> &'static str;

    /// JSON schema of the tool's input object.
    fn input_schema(&self) -> JsonSchema;

    /// Execute the tool with already-parsed JSON arguments.
    async fn execute(&self, args: Value, ctx: &ToolExecutionContext) -> AppResult<ToolResult>;
}

/// Registry of the available tools.
pub struct ToolRegistry {
    tools: Vec<Box<dyn McpTool>>,
}

impl ToolRegistry {
    /// Registry with the full wger tool set.
    #[must_use]
    pub fn with_default_tools() -> Self {
        Self {
            tools: vec![
                Box::new(exercises::SearchExercisesTool),
                Box::new(exercises::GetExerciseDetailsTool),
                Box::new(exercises::ListCategoriesTool),
                Box::new(exercises::ListEquipmentTool),
                Box::new(exercises::ListMusclesTool),
                Box::new(workouts::CreateWorkoutTool),
                Box::new(workouts::GetUserRoutinesTool),
                Box::new(workouts::AddExerciseToRoutineTool),
                Box::new(diagnose::DiagnoseTool),
            ],
        }
    }

    /// Look up a tool by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&dyn McpTool> {
        self.tools
            .iter()
            .find(|tool| tool.name() == name)
            .map(AsRef::as_ref)
    }

    /// Descriptors for `tools/list`.
    #[must_use]
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools
            .iter()
            .map(|tool| ToolDescriptor {
                name: tool.name().to_owned(),
                description: tool.description().to_owned(),
                input_schema: tool.input_schema(),
            })
            .collect()
    }
}

/// Extract an optional string argument.
pub(crate) fn optional_str(args: &Value, key: &str) -> AppResult<Option<String>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(AppError::invalid_input(format!("'{key}' must be a string"))),
    }
}

/// Extract an optional non-negative integer argument.
pub(crate) fn optional_u64(args: &Value, key: &str) -> AppResult<Option<u64>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_u64().map(Some).ok_or_else(|| {
            AppError::invalid_input(format!("'{key}' must be a non-negative integer"))
        }),
    }
}

/// Extract a required positive integer argument.
pub(crate) fn required_positive_u64(args: &Value, key: &str) -> AppResult<u64> {
    let value = optional_u64(args, key)?
        .ok_or_else(|| AppError::invalid_input(format!("'{key}' is required")))?;
    if value == 0 {
        return Err(AppError::invalid_input(format!(
            "'{key}' must be a positive integer"
        )));
    }
    Ok(value)
}

/// Extract an optional positive integer, rejecting zero.
pub(crate) fn optional_positive_u64(args: &Value, key: &str) -> AppResult<Option<u64>> {
    match optional_u64(args, key)? {
        Some(0) => Err(AppError::invalid_input(format!(
            "'{key}' must be a positive integer"
        ))),
        other => Ok(other),
    }
}
