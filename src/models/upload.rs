// src/models/upload.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// Represents the 'file_uploads' table: a record of a file handed to the
/// blob store, with the public URL it was given.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FileUpload {
    pub id: i64,
    pub file_name: String,
    pub url: String,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}
