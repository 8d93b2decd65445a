// src/handlers/lesson.rs

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
    models::{
        exercise::Exercise,
        lesson::{CreateLessonRequest, Lesson, UpdateLessonRequest},
        page::Page,
    },
};

const LESSON_COLUMNS: &str = "lesson_id, syllabus_id, lesson_title, lesson_order, available";

pub async fn get_lesson(
    State(pool): State<PgPool>,
    Path(lesson_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let lesson = fetch_lesson(&pool, &lesson_id).await?;
    Ok(Json(lesson))
}

pub async fn create_lesson(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateLessonRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(e) = payload.validate() {
        return Err(AppError::BadRequest(e.to_string()));
    }

    let syllabus_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM syllabi WHERE syllabus_id = $1)")
            .bind(&payload.syllabus_id)
            .fetch_one(&pool)
            .await?;
    if !syllabus_exists {
        return Err(AppError::NotFound("Syllabus not found".to_string()));
    }

    let lesson = sqlx::query_as::<_, Lesson>(&format!(
        "INSERT INTO lessons (lesson_id, syllabus_id, lesson_title, lesson_order, available)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (lesson_id) DO NOTHING
         RETURNING {LESSON_COLUMNS}"
    ))
    .bind(&payload.lesson_id)
    .bind(&payload.syllabus_id)
    .bind(&payload.lesson_title)
    .bind(payload.lesson_order)
    .bind(payload.available)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| AppError::Conflict("Lesson ID already exists".to_string()))?;

    Ok((StatusCode::CREATED, Json(lesson)))
}

pub async fn delete_lesson(
    State(pool): State<PgPool>,
    Path(lesson_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM lessons WHERE lesson_id = $1")
        .bind(&lesson_id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Lesson not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Reorders and/or renames a lesson. Moving a lesson shifts every lesson
/// between the old and new position by one, inside a single transaction.
pub async fn update_lesson(
    State(pool): State<PgPool>,
    Path(lesson_id): Path<String>,
    Json(payload): Json<UpdateLessonRequest>,
) -> Result<impl IntoResponse, AppError> {
    let lesson = fetch_lesson(&pool, &lesson_id).await?;

    let new_order = payload.lesson_order.unwrap_or(lesson.lesson_order);
    let new_title = payload.lesson_title.unwrap_or_else(|| lesson.lesson_title.clone());

    if new_order < 1 {
        return Err(AppError::BadRequest(
            "lesson_order must be positive".to_string(),
        ));
    }
    let lesson_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lessons WHERE syllabus_id = $1")
        .bind(&lesson.syllabus_id)
        .fetch_one(&pool)
        .await?;
    if i64::from(new_order) > lesson_count {
        return Err(AppError::BadRequest(format!(
            "lesson_order must be at most {}",
            lesson_count
        )));
    }

    let mut tx = pool.begin().await?;

    if new_order != lesson.lesson_order {
        if new_order < lesson.lesson_order {
            sqlx::query(
                "UPDATE lessons SET lesson_order = lesson_order + 1
                 WHERE syllabus_id = $1 AND lesson_order < $2 AND lesson_order >= $3",
            )
            .bind(&lesson.syllabus_id)
            .bind(lesson.lesson_order)
            .bind(new_order)
            .execute(&mut *tx)
            .await?;
        } else {
            sqlx::query(
                "UPDATE lessons SET lesson_order = lesson_order - 1
                 WHERE syllabus_id = $1 AND lesson_order > $2 AND lesson_order <= $3",
            )
            .bind(&lesson.syllabus_id)
            .bind(lesson.lesson_order)
            .bind(new_order)
            .execute(&mut *tx)
            .await?;
        }
    }

    sqlx::query("UPDATE lessons SET lesson_order = $2, lesson_title = $3 WHERE lesson_id = $1")
        .bind(&lesson_id)
        .bind(new_order)
        .bind(&new_title)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Json(serde_json::json!({ "status": "lesson updated" })))
}

/// Lists a lesson's pages in page order.
pub async fn get_lesson_pages(
    State(pool): State<PgPool>,
    Path(lesson_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    fetch_lesson(&pool, &lesson_id).await?;

    let pages = sqlx::query_as::<_, Page>(
        "SELECT id, lesson_id, syllabus_id, page_number, content
         FROM pages WHERE lesson_id = $1 ORDER BY page_number",
    )
    .bind(&lesson_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(pages))
}

/// Lists the exercises generated for a lesson (across students).
pub async fn get_lesson_exercises(
    State(pool): State<PgPool>,
    Path(lesson_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    fetch_lesson(&pool, &lesson_id).await?;

    let exercises = sqlx::query_as::<_, Exercise>(
        "SELECT id, lesson_id, student_id, name FROM exercises WHERE lesson_id = $1 ORDER BY id",
    )
    .bind(&lesson_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(exercises))
}

async fn fetch_lesson(pool: &PgPool, lesson_id: &str) -> Result<Lesson, AppError> {
    sqlx::query_as::<_, Lesson>(&format!(
        "SELECT {LESSON_COLUMNS} FROM lessons WHERE lesson_id = $1"
    ))
    .bind(lesson_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Lesson not found".to_string()))
}
