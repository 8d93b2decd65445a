// src/handlers/student.rs

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
    models::student::{CreateStudentRequest, Student},
};

pub async fn create_student(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateStudentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(e) = payload.validate() {
        return Err(AppError::BadRequest(e.to_string()));
    }

    let student = sqlx::query_as::<_, Student>(
        "INSERT INTO students (username, display_name)
         VALUES ($1, $2)
         ON CONFLICT (username) DO NOTHING
         RETURNING id, username, display_name",
    )
    .bind(&payload.username)
    .bind(&payload.display_name)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| AppError::Conflict("Username already exists".to_string()))?;

    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn get_student(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let student =
        sqlx::query_as::<_, Student>("SELECT id, username, display_name FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;

    Ok(Json(student))
}
