// ABOUTME: Exercise discovery tools: search, details, and reference-data listings
// ABOUTME: Reference data is cached for 24 hours, exercise details for 1 hour
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 wger MCP Server contributors

//! # Exercise Discovery Tools
//!
//! - `search_exercises` - filterable, paginated exercise search
//! - `get_exercise_details` - full details for one exercise
//! - `list_categories` / `list_equipment` / `list_muscles` - reference data

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::constants::cache_keys;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::mcp::schema::{JsonSchema, PropertySchema};
use crate::models::{Equipment, Exercise, ExerciseCategory, Muscle, Paginated};
use crate::tools::{
    optional_positive_u64, optional_str, optional_u64, required_positive_u64, McpTool,
    ToolExecutionContext, ToolResult,
};

/// Deserialize an API payload, flagging shape mismatches as API failures.
fn decode<T: DeserializeOwned>(payload: Value, what: &str) -> AppResult<T> {
    serde_json::from_value(payload)
        .map_err(|e| AppError::api(None, format!("Unexpected {what} response from wger API: {e}")))
}

/// Fetch a cached reference-data listing, going to the API on a miss.
async fn fetch_reference_list<T>(
    ctx: &ToolExecutionContext,
    cache_key: &str,
    path: &str,
    what: &str,
) -> AppResult<ToolResult>
where
    T: DeserializeOwned + Serialize,
{
    if let Some(cached) = ctx.cache.get(cache_key).await {
        debug!(cache_key, "returning cached reference data");
        return Ok(ToolResult::ok(cached));
    }

    let response = ctx.client.get(path, &[]).await?;
    let page: Paginated<T> = decode(response, what)?;

    let result = json!({ "results": page.results });
    ctx.cache
        .set(
            cache_key,
            result.clone(),
            Some(Duration::from_secs(ctx.config.cache_ttl_static_secs)),
        )
        .await;

    info!("fetched {} {what} entries", page.results.len());
    Ok(ToolResult::ok(result))
}

/// Searchable, filterable exercise listing.
pub struct SearchExercisesTool;

#[async_trait]
impl McpTool for SearchExercisesTool {
    fn name(&self) -> &'static str {
        "search_exercises"
    }

    fn description(&self) -> &'static str {
        "Search for exercises with optional filters. You can filter by keyword query, muscle \
         group ID, equipment ID, and category ID. Supports pagination with limit and offset \
         parameters. Use list_muscles, list_equipment, and list_categories to get valid filter IDs."
    }

    fn input_schema(&self) -> JsonSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "query".to_owned(),
            PropertySchema::string("Optional keyword to search in exercise names and descriptions"),
        );
        properties.insert(
            "muscle".to_owned(),
            PropertySchema::number("Optional muscle group ID to filter exercises by target muscle"),
        );
        properties.insert(
            "equipment".to_owned(),
            PropertySchema::number("Optional equipment ID to filter exercises by required equipment"),
        );
        properties.insert(
            "category".to_owned(),
            PropertySchema::number(
                "Optional category ID to filter exercises by type (strength, cardio, etc.)",
            ),
        );
        properties.insert(
            "limit".to_owned(),
            PropertySchema::number("Number of results to return (default: 20, max: 100)"),
        );
        properties.insert(
            "offset".to_owned(),
            PropertySchema::number("Number of results to skip for pagination (default: 0)"),
        );
        JsonSchema::object(properties, Vec::new())
    }

    async fn execute(&self, args: Value, ctx: &ToolExecutionContext) -> AppResult<ToolResult> {
        info!("searching exercises");

        let query = optional_str(&args, "query")?;
        let muscle = optional_positive_u64(&args, "muscle")?;
        let equipment = optional_positive_u64(&args, "equipment")?;
        let category = optional_positive_u64(&args, "category")?;
        let limit = optional_u64(&args, "limit")?.unwrap_or(20);
        if !(1..=100).contains(&limit) {
            return Err(AppError::invalid_input("'limit' must be between 1 and 100"));
        }
        let offset = optional_u64(&args, "offset")?.unwrap_or(0);

        let mut params = vec![
            ("limit".to_owned(), limit.to_string()),
            ("offset".to_owned(), offset.to_string()),
        ];
        if let Some(q) = query {
            params.push(("search".to_owned(), q));
        }
        if let Some(id) = muscle {
            params.push(("muscles".to_owned(), id.to_string()));
        }
        if let Some(id) = equipment {
            params.push(("equipment".to_owned(), id.to_string()));
        }
        if let Some(id) = category {
            params.push(("category".to_owned(), id.to_string()));
        }

        let response = ctx.client.get("/exercise/", &params).await?;
        let page: Paginated<Exercise> = decode(response, "exercise search")?;

        info!(
            count = page.count,
            returned = page.results.len(),
            "found exercises"
        );
        let payload = serde_json::to_value(&page)
            .map_err(|e| AppError::api(None, format!("Failed to serialize results: {e}")))?;
        Ok(ToolResult::ok(payload))
    }
}

/// Full details for one exercise.
pub struct GetExerciseDetailsTool;

#[async_trait]
impl McpTool for GetExerciseDetailsTool {
    fn name(&self) -> &'static str {
        "get_exercise_details"
    }

    fn description(&self) -> &'static str {
        "Get comprehensive details for a specific exercise by ID. Returns full exercise \
         information including name, description, muscles worked (primary and secondary), \
         required equipment, category, and variations. Use search_exercises to find exercise \
         IDs first."
    }

    fn input_schema(&self) -> JsonSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "exerciseId".to_owned(),
            PropertySchema::number("The unique ID of the exercise to fetch details for"),
        );
        JsonSchema::object(properties, vec!["exerciseId".to_owned()])
    }

    async fn execute(&self, args: Value, ctx: &ToolExecutionContext) -> AppResult<ToolResult> {
        let exercise_id = required_positive_u64(&args, "exerciseId")?;
        info!(exercise_id, "fetching exercise details");

        let cache_key = cache_keys::exercise(exercise_id);
        if let Some(cached) = ctx.cache.get(&cache_key).await {
            debug!(exercise_id, "returning cached exercise details");
            return Ok(ToolResult::ok(cached));
        }

        let response = match ctx.client.get(&format!("/exercise/{exercise_id}/"), &[]).await {
            Ok(response) => response,
            Err(e) if e.code() == ErrorCode::ResourceNotFound => {
                return Err(AppError::not_found(format!(
                    "Exercise with ID {exercise_id} not found."
                )));
            }
            Err(e) => return Err(e),
        };

        let exercise: Exercise = decode(response, "exercise details")?;
        let payload = serde_json::to_value(&exercise)
            .map_err(|e| AppError::api(None, format!("Failed to serialize exercise: {e}")))?;

        ctx.cache
            .set(
                cache_key,
                payload.clone(),
                Some(Duration::from_secs(ctx.config.cache_ttl_exercise_secs)),
            )
            .await;

        info!(exercise_id, name = %exercise.name, "fetched exercise details");
        Ok(ToolResult::ok(payload))
    }
}

/// All exercise categories.
pub struct ListCategoriesTool;

#[async_trait]
impl McpTool for ListCategoriesTool {
    fn name(&self) -> &'static str {
        "list_categories"
    }

    fn description(&self) -> &'static str {
        "List all available exercise categories from wger. Categories include types like \
         strength training, cardio, stretching, and more. Use this to understand what \
         categories are available for filtering exercises."
    }

    fn input_schema(&self) -> JsonSchema {
        JsonSchema::empty_object()
    }

    async fn execute(&self, _args: Value, ctx: &ToolExecutionContext) -> AppResult<ToolResult> {
        info!("fetching exercise categories");
        fetch_reference_list::<ExerciseCategory>(
            ctx,
            cache_keys::CATEGORIES,
            "/exercisecategory/",
            "category",
        )
        .await
    }
}

/// All equipment entries.
pub struct ListEquipmentTool;

#[async_trait]
impl McpTool for ListEquipmentTool {
    fn name(&self) -> &'static str {
        "list_equipment"
    }

    fn description(&self) -> &'static str {
        "List all available exercise equipment from wger, such as barbells, dumbbells, and \
         machines. Use this to get valid equipment IDs for filtering exercises."
    }

    fn input_schema(&self) -> JsonSchema {
        JsonSchema::empty_object()
    }

    async fn execute(&self, _args: Value, ctx: &ToolExecutionContext) -> AppResult<ToolResult> {
        info!("fetching equipment list");
        fetch_reference_list::<Equipment>(ctx, cache_keys::EQUIPMENT, "/equipment/", "equipment")
            .await
    }
}

/// All muscle groups.
pub struct ListMusclesTool;

#[async_trait]
impl McpTool for ListMusclesTool {
    fn name(&self) -> &'static str {
        "list_muscles"
    }

    fn description(&self) -> &'static str {
        "List all muscle groups known to wger, including localized and English names. Use this \
         to get valid muscle IDs for filtering exercises by target muscle."
    }

    fn input_schema(&self) -> JsonSchema {
        JsonSchema::empty_object()
    }

    async fn execute(&self, _args: Value, ctx: &ToolExecutionContext) -> AppResult<ToolResult> {
        info!("fetching muscle list");
        fetch_reference_list::<Muscle>(ctx, cache_keys::MUSCLES, "/muscle/", "muscle").await
    }
}
