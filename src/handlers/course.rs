// src/handlers/course.rs

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
    models::course::{Course, CreateCourseRequest, UpdateCourseRequest},
};

const COURSE_COLUMNS: &str =
    "course_id, course_title, short_description, long_description, image, is_published";

/// Lists all courses.
pub async fn list_courses(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let courses = sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses ORDER BY course_id"
    ))
    .fetch_all(&pool)
    .await?;

    Ok(Json(courses))
}

/// Retrieves a single course by ID.
pub async fn get_course(
    State(pool): State<PgPool>,
    Path(course_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let course = sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE course_id = $1"
    ))
    .bind(&course_id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    Ok(Json(course))
}

pub async fn create_course(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(e) = payload.validate() {
        return Err(AppError::BadRequest(e.to_string()));
    }

    let course = sqlx::query_as::<_, Course>(&format!(
        "INSERT INTO courses (course_id, course_title, short_description, long_description, image)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (course_id) DO NOTHING
         RETURNING {COURSE_COLUMNS}"
    ))
    .bind(&payload.course_id)
    .bind(&payload.course_title)
    .bind(&payload.short_description)
    .bind(&payload.long_description)
    .bind(payload.image.as_deref().unwrap_or("default.png"))
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| AppError::Conflict("Course ID already exists".to_string()))?;

    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn update_course(
    State(pool): State<PgPool>,
    Path(course_id): Path<String>,
    Json(payload): Json<UpdateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(e) = payload.validate() {
        return Err(AppError::BadRequest(e.to_string()));
    }

    let course = sqlx::query_as::<_, Course>(&format!(
        "UPDATE courses SET
            course_title = COALESCE($2, course_title),
            short_description = COALESCE($3, short_description),
            long_description = COALESCE($4, long_description),
            image = COALESCE($5, image)
         WHERE course_id = $1
         RETURNING {COURSE_COLUMNS}"
    ))
    .bind(&course_id)
    .bind(payload.course_title.as_deref())
    .bind(payload.short_description.as_deref())
    .bind(payload.long_description.as_deref())
    .bind(payload.image.as_deref())
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    Ok(Json(course))
}

pub async fn delete_course(
    State(pool): State<PgPool>,
    Path(course_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM courses WHERE course_id = $1")
        .bind(&course_id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Checks whether a course with the given ID exists.
pub async fn check_course_id(
    State(pool): State<PgPool>,
    Path(course_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM courses WHERE course_id = $1)")
            .bind(&course_id)
            .fetch_one(&pool)
            .await?;

    Ok(Json(serde_json::json!({ "exists": exists })))
}

/// Marks a course as published.
pub async fn publish_course(
    State(pool): State<PgPool>,
    Path(course_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("UPDATE courses SET is_published = TRUE WHERE course_id = $1")
        .bind(&course_id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "status": "course published" })))
}
