// src/models/exercise.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// Represents the 'exercises' table: one generated question set per
/// (lesson, student) pair.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub lesson_id: String,
    pub student_id: i64,
    pub name: String,
}

/// Represents the 'exercise_questions' table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ExerciseQuestion {
    pub id: i64,
    pub exercise_id: i64,
    pub question: String,
    pub choice_a: String,
    pub choice_b: String,
    pub choice_c: String,
    pub choice_d: String,
    pub subject: String,
    pub correct_answer: String,
}

/// DTO for sending a question to the client (excludes the correct answer).
#[derive(Debug, Serialize, FromRow)]
pub struct PublicQuestion {
    pub id: i64,
    pub question: String,
    pub choice_a: String,
    pub choice_b: String,
    pub choice_c: String,
    pub choice_d: String,
    pub subject: String,
}

/// DTO for requesting question generation. All ids are required; missing
/// ones are reported as 400s naming the field.
#[derive(Debug, Deserialize)]
pub struct GenerateQuestionsRequest {
    pub course_id: Option<String>,
    pub lesson_id: Option<String>,
    pub page_id: Option<i64>,
    pub student_id: Option<i64>,
}

/// DTO for the generation response.
#[derive(Debug, Serialize)]
pub struct GenerateQuestionsResponse {
    pub exercise_id: i64,
    pub question_count: usize,
    /// False when an existing exercise was returned instead of generating.
    pub regenerated: bool,
}
