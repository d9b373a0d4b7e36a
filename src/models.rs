// ABOUTME: Serde data models for the subset of the wger API v2 used by the tools
// ABOUTME: Covers exercises, reference data, routines, and paginated responses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 wger MCP Server contributors

//! Common data models for wger API entities.
//!
//! Based on wger API v2: <https://wger.de/api/v2>. Only the fields the tools
//! consume are modeled; unknown fields are ignored on deserialization.

use serde::{Deserialize, Serialize};

/// A single exercise with its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    /// Unique exercise identifier.
    pub id: u64,
    /// Exercise name.
    pub name: String,
    /// Stable UUID for the exercise.
    pub uuid: String,
    /// HTML-formatted description and instructions.
    #[serde(default)]
    pub description: String,
    /// Category id (strength, cardio, stretching, ...).
    pub category: u64,
    /// Primary muscle group ids.
    #[serde(default)]
    pub muscles: Vec<u64>,
    /// Secondary muscle group ids.
    #[serde(default)]
    pub muscles_secondary: Vec<u64>,
    /// Required equipment ids.
    #[serde(default)]
    pub equipment: Vec<u64>,
    /// Language id of the content.
    #[serde(default)]
    pub language: u64,
    /// Variation exercise ids.
    #[serde(default)]
    pub variations: Vec<u64>,
}

/// An exercise category (e.g. strength, cardio).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseCategory {
    /// Unique category identifier.
    pub id: u64,
    /// Category name.
    pub name: String,
}

/// A muscle or muscle group that exercises can target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Muscle {
    /// Unique muscle identifier.
    pub id: u64,
    /// Localized muscle name.
    pub name: String,
    /// English muscle name.
    #[serde(default)]
    pub name_en: String,
    /// Whether the muscle is on the front of the body.
    #[serde(default)]
    pub is_front: bool,
}

/// Equipment usable for exercises.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Equipment {
    /// Unique equipment identifier.
    pub id: u64,
    /// Equipment name.
    pub name: String,
}

/// A user's workout routine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Routine {
    /// Unique routine identifier.
    pub id: u64,
    /// Routine name.
    pub name: String,
    /// Optional routine description.
    #[serde(default)]
    pub description: String,
    /// Start date (`YYYY-MM-DD`).
    #[serde(default)]
    pub start: Option<String>,
    /// End date (`YYYY-MM-DD`).
    #[serde(default)]
    pub end: Option<String>,
}

/// An exercise added to a routine day with set/rep parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSet {
    /// Unique set identifier.
    pub id: u64,
    /// Day the set belongs to.
    #[serde(rename = "exerciseday")]
    pub exercise_day: u64,
    /// Referenced exercise id.
    #[serde(default)]
    pub exercise: Option<u64>,
    /// Number of sets to perform.
    #[serde(default)]
    pub sets: u32,
    /// Repetitions per set.
    #[serde(default)]
    pub reps: Option<u32>,
    /// Weight in kilograms.
    #[serde(default)]
    pub weight: Option<f64>,
    /// Order of this exercise within the day.
    #[serde(default)]
    pub order: Option<u32>,
    /// Optional notes.
    #[serde(default)]
    pub comment: String,
}

/// Generic paginated response wrapper used by wger list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Total number of items across all pages.
    pub count: u64,
    /// URL of the next page, if any.
    pub next: Option<String>,
    /// URL of the previous page, if any.
    pub previous: Option<String>,
    /// Items on the current page.
    pub results: Vec<T>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn paginated_exercises_deserialize_with_unknown_fields() {
        let body = json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [{
                "id": 345,
                "name": "Bench Press",
                "uuid": "c788d643-150a-4ac7-97ef-84643c6419bf",
                "description": "<p>Lay on a bench</p>",
                "category": 11,
                "muscles": [4],
                "muscles_secondary": [2, 5],
                "equipment": [1],
                "language": 2,
                "license": 2,
                "license_author": "someone"
            }]
        });
        let page: Paginated<Exercise> = serde_json::from_value(body).unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].id, 345);
        assert_eq!(page.results[0].muscles_secondary, vec![2, 5]);
    }

    #[test]
    fn routine_dates_are_optional() {
        let body = json!({"id": 7, "name": "Push/Pull"});
        let routine: Routine = serde_json::from_value(body).unwrap();
        assert_eq!(routine.name, "Push/Pull");
        assert!(routine.start.is_none());
    }
}
