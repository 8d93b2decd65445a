// src/models/page.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// Represents the 'pages' table: one rich-text content page of a lesson.
/// (lesson_id, page_number) is unique.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Page {
    pub id: i64,
    pub lesson_id: String,
    pub syllabus_id: String,
    pub page_number: i32,
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePageRequest {
    #[validate(length(min = 1, message = "lesson_id is required."))]
    pub lesson_id: String,
    #[validate(range(min = 1, message = "page_number must be positive."))]
    pub page_number: i32,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePageRequest {
    pub content: String,
}
