// ABOUTME: Workout management tools: create routines, list them, and add exercises
// ABOUTME: All three require credentials; user data is never cached
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 wger MCP Server contributors

//! # Workout Management Tools
//!
//! - `create_workout` - create a new routine
//! - `get_user_routines` - list the user's routines
//! - `add_exercise_to_routine` - attach an exercise to a routine day

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Months, NaiveDate, Utc};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::errors::{AppError, AppResult};
use crate::mcp::schema::{JsonSchema, PropertySchema};
use crate::models::{Paginated, Routine, WorkoutSet};
use crate::tools::{
    optional_positive_u64, optional_str, optional_u64, required_positive_u64, McpTool,
    ToolExecutionContext, ToolResult,
};

/// Guard for tools that cannot work anonymously.
fn require_credentials(ctx: &ToolExecutionContext, action: &str) -> AppResult<()> {
    if ctx.auth.has_credentials() {
        Ok(())
    } else {
        Err(AppError::auth(format!(
            "Authentication required to {action}. Please set WGER_API_KEY or WGER_USERNAME \
             and WGER_PASSWORD environment variables."
        )))
    }
}

/// Parse a `YYYY-MM-DD` argument.
fn parse_date(value: &str, key: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::invalid_input(format!("'{key}' must be a date in YYYY-MM-DD format")))
}

/// Create a new workout routine.
pub struct CreateWorkoutTool;

#[async_trait]
impl McpTool for CreateWorkoutTool {
    fn name(&self) -> &'static str {
        "create_workout"
    }

    fn description(&self) -> &'static str {
        "Create a new workout routine for the authenticated user. Returns the routine ID and \
         metadata for use with add_exercise_to_routine. Requires a name and date range \
         (defaults to 1 year starting today)."
    }

    fn input_schema(&self) -> JsonSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "name".to_owned(),
            PropertySchema::string("Workout routine name (1-200 characters)"),
        );
        properties.insert(
            "description".to_owned(),
            PropertySchema::string("Optional workout description (max 2000 characters)"),
        );
        properties.insert(
            "start".to_owned(),
            PropertySchema::string("Start date in YYYY-MM-DD format (optional, defaults to today)"),
        );
        properties.insert(
            "end".to_owned(),
            PropertySchema::string(
                "End date in YYYY-MM-DD format (optional, defaults to 1 year from start)",
            ),
        );
        JsonSchema::object(properties, vec!["name".to_owned()])
    }

    async fn execute(&self, args: Value, ctx: &ToolExecutionContext) -> AppResult<ToolResult> {
        info!("executing create_workout tool");
        require_credentials(ctx, "create workouts")?;

        let name = optional_str(&args, "name")?
            .ok_or_else(|| AppError::invalid_input("'name' is required"))?;
        if name.is_empty() || name.chars().count() > 200 {
            return Err(AppError::invalid_input(
                "'name' must be between 1 and 200 characters",
            ));
        }
        let description = optional_str(&args, "description")?.unwrap_or_default();
        if description.chars().count() > 2000 {
            return Err(AppError::invalid_input(
                "'description' cannot exceed 2000 characters",
            ));
        }

        let today = Utc::now().date_naive();
        let start = match optional_str(&args, "start")? {
            Some(raw) => parse_date(&raw, "start")?,
            None => today,
        };
        let end = match optional_str(&args, "end")? {
            Some(raw) => parse_date(&raw, "end")?,
            None => start
                .checked_add_months(Months::new(12))
                .unwrap_or(start),
        };

        debug!(%name, %start, %end, "creating routine");

        // Make sure a valid token exists before issuing the write.
        ctx.auth.get_token().await?;

        let body = json!({
            "name": name,
            "description": description,
            "start": start.format("%Y-%m-%d").to_string(),
            "end": end.format("%Y-%m-%d").to_string(),
        });
        let response = ctx.client.post("/routine/", Some(&body)).await?;
        let routine: Routine = serde_json::from_value(response)
            .map_err(|e| AppError::api(None, format!("Unexpected routine response from wger API: {e}")))?;

        info!(routine_id = routine.id, name = %routine.name, "successfully created routine");
        let payload = serde_json::to_value(&routine)
            .map_err(|e| AppError::api(None, format!("Failed to serialize routine: {e}")))?;
        Ok(ToolResult::ok(payload))
    }
}

/// List the authenticated user's routines.
pub struct GetUserRoutinesTool;

#[async_trait]
impl McpTool for GetUserRoutinesTool {
    fn name(&self) -> &'static str {
        "get_user_routines"
    }

    fn description(&self) -> &'static str {
        "Fetch all workout routines for the authenticated user with complete exercise lists, \
         days, and set/rep schemes. Supports pagination."
    }

    fn input_schema(&self) -> JsonSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "limit".to_owned(),
            PropertySchema::number("Maximum number of routines to return (default: 20, max: 50)"),
        );
        properties.insert(
            "offset".to_owned(),
            PropertySchema::number("Number of routines to skip for pagination (default: 0)"),
        );
        JsonSchema::object(properties, Vec::new())
    }

    async fn execute(&self, args: Value, ctx: &ToolExecutionContext) -> AppResult<ToolResult> {
        info!("executing get_user_routines tool");
        require_credentials(ctx, "view workout routines")?;

        let limit = optional_u64(&args, "limit")?.unwrap_or(20);
        if !(1..=50).contains(&limit) {
            return Err(AppError::invalid_input("'limit' must be between 1 and 50"));
        }
        let offset = optional_u64(&args, "offset")?.unwrap_or(0);

        debug!(limit, offset, "fetching user routines");
        ctx.auth.get_token().await?;

        // User data changes frequently; never cached.
        let params = vec![
            ("limit".to_owned(), limit.to_string()),
            ("offset".to_owned(), offset.to_string()),
        ];
        let response = ctx.client.get("/routine/", &params).await?;
        let page: Paginated<Routine> = serde_json::from_value(response)
            .map_err(|e| AppError::api(None, format!("Unexpected routine response from wger API: {e}")))?;

        info!(
            count = page.count,
            returned = page.results.len(),
            "successfully fetched user routines"
        );
        let payload = serde_json::to_value(&page)
            .map_err(|e| AppError::api(None, format!("Failed to serialize routines: {e}")))?;
        Ok(ToolResult::ok(payload))
    }
}

/// Add an exercise to an existing routine day.
pub struct AddExerciseToRoutineTool;

#[async_trait]
impl McpTool for AddExerciseToRoutineTool {
    fn name(&self) -> &'static str {
        "add_exercise_to_routine"
    }

    fn description(&self) -> &'static str {
        "Add an exercise to an existing workout routine with specified sets, reps, weight, and \
         order. Returns the created set details."
    }

    fn input_schema(&self) -> JsonSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "workoutId".to_owned(),
            PropertySchema::number("ID of the workout routine to add the exercise to"),
        );
        properties.insert(
            "dayId".to_owned(),
            PropertySchema::number("ID of the day within the workout routine"),
        );
        properties.insert(
            "exerciseId".to_owned(),
            PropertySchema::number("ID of the exercise to add"),
        );
        properties.insert(
            "sets".to_owned(),
            PropertySchema::number("Number of sets to perform (1-10)"),
        );
        properties.insert(
            "reps".to_owned(),
            PropertySchema::number("Optional number of repetitions per set (1-100)"),
        );
        properties.insert(
            "weight".to_owned(),
            PropertySchema::number("Optional weight in kilograms (must be non-negative)"),
        );
        properties.insert(
            "order".to_owned(),
            PropertySchema::number("Optional order of this exercise in the day"),
        );
        properties.insert(
            "comment".to_owned(),
            PropertySchema::string("Optional notes or comments for this exercise (max 200 characters)"),
        );
        JsonSchema::object(
            properties,
            vec![
                "workoutId".to_owned(),
                "dayId".to_owned(),
                "exerciseId".to_owned(),
                "sets".to_owned(),
            ],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolExecutionContext) -> AppResult<ToolResult> {
        info!("executing add_exercise_to_routine tool");
        require_credentials(ctx, "add exercises to routines")?;

        let workout_id = required_positive_u64(&args, "workoutId")?;
        let day_id = required_positive_u64(&args, "dayId")?;
        let exercise_id = required_positive_u64(&args, "exerciseId")?;
        let sets = required_positive_u64(&args, "sets")?;
        if sets > 10 {
            return Err(AppError::invalid_input("'sets' must be between 1 and 10"));
        }
        let reps = optional_positive_u64(&args, "reps")?;
        if reps.is_some_and(|r| r > 100) {
            return Err(AppError::invalid_input("'reps' must be between 1 and 100"));
        }
        let weight = match args.get("weight") {
            None | Some(Value::Null) => None,
            Some(value) => {
                let w = value.as_f64().ok_or_else(|| {
                    AppError::invalid_input("'weight' must be a non-negative number")
                })?;
                if w < 0.0 {
                    return Err(AppError::invalid_input("'weight' must be non-negative"));
                }
                Some(w)
            }
        };
        let order = optional_positive_u64(&args, "order")?;
        let comment = optional_str(&args, "comment")?;
        if comment.as_ref().is_some_and(|c| c.chars().count() > 200) {
            return Err(AppError::invalid_input(
                "'comment' cannot exceed 200 characters",
            ));
        }

        debug!(workout_id, day_id, exercise_id, sets, "adding exercise to routine");
        ctx.auth.get_token().await?;

        let mut body = Map::new();
        body.insert("exerciseday".to_owned(), json!(day_id));
        body.insert("exercise".to_owned(), json!(exercise_id));
        body.insert("sets".to_owned(), json!(sets));
        if let Some(r) = reps {
            body.insert("reps".to_owned(), json!(r));
        }
        if let Some(w) = weight {
            body.insert("weight".to_owned(), json!(w));
        }
        if let Some(o) = order {
            body.insert("order".to_owned(), json!(o));
        }
        if let Some(c) = comment {
            body.insert("comment".to_owned(), json!(c));
        }

        let response = ctx.client.post("/set/", Some(&Value::Object(body))).await?;
        let set: WorkoutSet = serde_json::from_value(response)
            .map_err(|e| AppError::api(None, format!("Unexpected set response from wger API: {e}")))?;

        info!(set_id = set.id, workout_id, day_id, exercise_id, "successfully added exercise");
        let payload = serde_json::to_value(&set)
            .map_err(|e| AppError::api(None, format!("Failed to serialize set: {e}")))?;
        Ok(ToolResult::ok(payload))
    }
}
