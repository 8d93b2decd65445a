// src/models/student.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// Minimal student record so generation and scoring requests can resolve
/// student ids. Account management itself lives elsewhere.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub username: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStudentRequest {
    #[validate(length(min = 3, max = 30, message = "username must be 3-30 characters."))]
    pub username: String,
    #[serde(default)]
    pub display_name: String,
}
