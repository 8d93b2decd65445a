// src/models/score.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use std::collections::HashMap;

/// Represents the 'exercise_scores' table. One row per (exercise, student);
/// resubmission overwrites the row and replaces its correctness links.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ExerciseScore {
    pub id: i64,
    pub exercise_id: i64,
    pub student_id: i64,
    pub score: f64,
    pub feedback: String,
    pub total_questions: i32,
    pub date_taken: chrono::NaiveDate,
}

/// DTO for submitting an exercise attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitExerciseRequest {
    pub student_id: Option<i64>,

    /// Question ID -> the text of the chosen choice.
    #[serde(default)]
    pub answers: HashMap<i64, String>,
}

/// DTO for the scoring response.
#[derive(Debug, Serialize)]
pub struct SubmitExerciseResponse {
    pub score: i64,
    pub total_questions: i64,
    pub feedback: String,
    pub passed: bool,
    /// On a failed attempt: whether a fresh question set was generated.
    pub regenerated: bool,
}
