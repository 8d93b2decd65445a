// src/handlers/page.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::page::{CreatePageRequest, Page, UpdatePageRequest},
    utils::html::clean_html,
};

const PAGE_COLUMNS: &str = "id, lesson_id, syllabus_id, page_number, content";

/// Lists a lesson's pages.
pub async fn list_pages_by_lesson(
    State(pool): State<PgPool>,
    Path(lesson_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let pages = sqlx::query_as::<_, Page>(&format!(
        "SELECT {PAGE_COLUMNS} FROM pages WHERE lesson_id = $1 ORDER BY page_number"
    ))
    .bind(&lesson_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(pages))
}

/// Creates a page within a lesson. Page numbers are unique per lesson.
/// Stored content is sanitized against stored XSS.
pub async fn create_page(
    State(pool): State<PgPool>,
    Json(payload): Json<CreatePageRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(e) = payload.validate() {
        return Err(AppError::BadRequest(e.to_string()));
    }

    let syllabus_id: String =
        sqlx::query_scalar("SELECT syllabus_id FROM lessons WHERE lesson_id = $1")
            .bind(&payload.lesson_id)
            .fetch_optional(&pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Lesson not found".to_string()))?;

    let page = sqlx::query_as::<_, Page>(&format!(
        "INSERT INTO pages (lesson_id, syllabus_id, page_number, content)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (lesson_id, page_number) DO NOTHING
         RETURNING {PAGE_COLUMNS}"
    ))
    .bind(&payload.lesson_id)
    .bind(&syllabus_id)
    .bind(payload.page_number)
    .bind(clean_html(&payload.content))
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| {
        AppError::Conflict("Page number already exists for this lesson".to_string())
    })?;

    Ok((StatusCode::CREATED, Json(page)))
}

/// Retrieves a page by (lesson, page_number).
pub async fn get_page(
    State(pool): State<PgPool>,
    Path((lesson_id, page_number)): Path<(String, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let page = fetch_page(&pool, &lesson_id, page_number).await?;
    Ok(Json(page))
}

/// Replaces a page's content.
pub async fn update_page(
    State(pool): State<PgPool>,
    Path((lesson_id, page_number)): Path<(String, i32)>,
    Json(payload): Json<UpdatePageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let page = sqlx::query_as::<_, Page>(&format!(
        "UPDATE pages SET content = $3
         WHERE lesson_id = $1 AND page_number = $2
         RETURNING {PAGE_COLUMNS}"
    ))
    .bind(&lesson_id)
    .bind(page_number)
    .bind(clean_html(&payload.content))
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Page not found".to_string()))?;

    Ok(Json(page))
}

pub async fn delete_page(
    State(pool): State<PgPool>,
    Path((lesson_id, page_number)): Path<(String, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM pages WHERE lesson_id = $1 AND page_number = $2")
        .bind(&lesson_id)
        .bind(page_number)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Page not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_page(pool: &PgPool, lesson_id: &str, page_number: i32) -> Result<Page, AppError> {
    sqlx::query_as::<_, Page>(&format!(
        "SELECT {PAGE_COLUMNS} FROM pages WHERE lesson_id = $1 AND page_number = $2"
    ))
    .bind(lesson_id)
    .bind(page_number)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Page not found".to_string()))
}
