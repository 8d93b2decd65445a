// src/models/course.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// Represents the 'courses' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Course {
    pub course_id: String,
    pub course_title: String,
    pub short_description: String,
    pub long_description: String,
    pub image: String,
    pub is_published: bool,
}

/// DTO for creating a new course.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 10, message = "course_id must be 1-10 characters."))]
    pub course_id: String,
    #[validate(length(min = 1, max = 200, message = "course_title must be 1-200 characters."))]
    pub course_title: String,
    #[validate(length(max = 500, message = "short_description must be at most 500 characters."))]
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub long_description: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// DTO for updating an existing course. Absent fields keep their values.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCourseRequest {
    #[validate(length(min = 1, max = 200, message = "course_title must be 1-200 characters."))]
    pub course_title: Option<String>,
    #[validate(length(max = 500, message = "short_description must be at most 500 characters."))]
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    pub image: Option<String>,
}
