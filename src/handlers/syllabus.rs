// src/handlers/syllabus.rs

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
        lesson::Lesson,
        syllabus::{CreateSyllabusRequest, Syllabus},
    },
};

pub async fn create_syllabus(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateSyllabusRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(e) = payload.validate() {
        return Err(AppError::BadRequest(e.to_string()));
    }

    let course_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM courses WHERE course_id = $1)")
            .bind(&payload.course_id)
            .fetch_one(&pool)
            .await?;
    if !course_exists {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    let syllabus = sqlx::query_as::<_, Syllabus>(
        "INSERT INTO syllabi (syllabus_id, course_id)
         VALUES ($1, $2)
         ON CONFLICT (course_id) DO NOTHING
         RETURNING syllabus_id, course_id",
    )
    .bind(&payload.syllabus_id)
    .bind(&payload.course_id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| AppError::Conflict("Course already has a syllabus".to_string()))?;

    Ok((StatusCode::CREATED, Json(syllabus)))
}

/// Retrieves the syllabus for a course.
pub async fn get_syllabus_by_course(
    State(pool): State<PgPool>,
    Path(course_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let syllabus = sqlx::query_as::<_, Syllabus>(
        "SELECT syllabus_id, course_id FROM syllabi WHERE course_id = $1",
    )
    .bind(&course_id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Syllabus not found".to_string()))?;

    let lessons = sqlx::query_as::<_, Lesson>(
        "SELECT lesson_id, syllabus_id, lesson_title, lesson_order, available
         FROM lessons
         WHERE syllabus_id = $1
         ORDER BY lesson_order",
    )
    .bind(&syllabus.syllabus_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(serde_json::json!({
        "syllabus_id": syllabus.syllabus_id,
        "course_id": syllabus.course_id,
        "lessons": lessons,
    })))
}
