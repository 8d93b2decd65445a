// src/models/lesson.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// Represents the 'lessons' table in the database.
/// `lesson_order` positions the lesson in its syllabus; `available` is
/// flipped when the student passes the previous lesson's exercise.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Lesson {
    pub lesson_id: String,
    pub syllabus_id: String,
    pub lesson_title: String,
    pub lesson_order: i32,
    pub available: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateLessonRequest {
    #[validate(length(min = 1, max = 10, message = "lesson_id must be 1-10 characters."))]
    pub lesson_id: String,
    #[validate(length(min = 1, message = "syllabus_id is required."))]
    pub syllabus_id: String,
    #[validate(length(min = 1, max = 200, message = "lesson_title must be 1-200 characters."))]
    pub lesson_title: String,
    pub lesson_order: i32,
    #[serde(default)]
    pub available: bool,
}

/// DTO for the reorder-and-rename operation. Absent fields keep their values.
#[derive(Debug, Deserialize)]
pub struct UpdateLessonRequest {
    pub lesson_order: Option<i32>,
    pub lesson_title: Option<String>,
}
