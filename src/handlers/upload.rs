// src/handlers/upload.rs

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use url::Url;

use crate::{error::AppError, models::upload::FileUpload, state::AppState};

/// Accepts a multipart upload, hands the bytes to the storage backend
/// (a local directory standing in for the blob store), records the upload,
/// and returns the public URL.
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
        .ok_or_else(|| AppError::BadRequest("No file in upload".to_string()))?;

    let original_name = field
        .file_name()
        .map(sanitize_file_name)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("Upload is missing a file name".to_string()))?;

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    // Timestamp prefix keeps repeated uploads of the same name distinct.
    let stored_name = format!("{}_{}", chrono::Utc::now().timestamp_millis(), original_name);

    tokio::fs::create_dir_all(&state.config.upload_dir)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let path = std::path::Path::new(&state.config.upload_dir).join(&stored_name);
    tokio::fs::write(&path, &data)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let url = Url::parse(&state.config.public_base_url)
        .and_then(|base| base.join(&format!("uploads/{}", stored_name)))
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let upload = sqlx::query_as::<_, FileUpload>(
        "INSERT INTO file_uploads (file_name, url)
         VALUES ($1, $2)
         RETURNING id, file_name, url, uploaded_at",
    )
    .bind(&original_name)
    .bind(url.as_str())
    .fetch_one(&state.pool)
    .await?;

    tracing::info!("Stored upload {} as {}", original_name, stored_name);

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "url": upload.url })),
    ))
}

/// Keeps the base name only and drops path separators and control characters.
fn sanitize_file_name(name: &str) -> String {
    name.rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .chars()
        .filter(|c| !c.is_control())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::sanitize_file_name;

    #[test]
    fn strips_path_components() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name(r"C:\temp\notes.txt"), "notes.txt");
        assert_eq!(sanitize_file_name("diagram.png"), "diagram.png");
    }
}
