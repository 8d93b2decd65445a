// src/models/syllabus.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// Represents the 'syllabi' table. One syllabus per course.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Syllabus {
    pub syllabus_id: String,
    pub course_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSyllabusRequest {
    #[validate(length(min = 1, max = 10, message = "syllabus_id must be 1-10 characters."))]
    pub syllabus_id: String,
    #[validate(length(min = 1, message = "course_id is required."))]
    pub course_id: String,
}
