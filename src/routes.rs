// src/routes.rs

use axum::{
    Router,
    http::Method,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{course, exercise, lesson, page, student, syllabus, upload},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (courses, syllabi, lessons, pages, students,
///   exercises, uploads).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool, Config, Generation Client).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let course_routes = Router::new()
        .route("/", get(course::list_courses).post(course::create_course))
        .route("/check_id/{course_id}", get(course::check_course_id))
        .route(
            "/{id}",
            get(course::get_course)
                .put(course::update_course)
                .delete(course::delete_course),
        )
        .route("/{id}/publish", put(course::publish_course));

    let syllabus_routes = Router::new()
        .route("/", post(syllabus::create_syllabus))
        .route("/{course_id}", get(syllabus::get_syllabus_by_course));

    let lesson_routes = Router::new()
        .route("/", post(lesson::create_lesson))
        .route(
            "/{id}",
            get(lesson::get_lesson)
                .put(lesson::update_lesson)
                .delete(lesson::delete_lesson),
        )
        .route("/{id}/pages", get(lesson::get_lesson_pages))
        .route("/{id}/exercises", get(lesson::get_lesson_exercises));

    let page_routes = Router::new()
        .route("/", post(page::create_page))
        .route("/{lesson_id}", get(page::list_pages_by_lesson))
        .route(
            "/{lesson_id}/{page_number}",
            get(page::get_page)
                .put(page::update_page)
                .delete(page::delete_page),
        );

    let student_routes = Router::new()
        .route("/", post(student::create_student))
        .route("/{id}", get(student::get_student));

    let exercise_routes = Router::new()
        .route("/generate", post(exercise::generate_questions))
        .route("/{id}/questions", get(exercise::list_questions))
        .route("/{id}/submit", post(exercise::submit_exercise))
        .route("/{id}/score/{student_id}", get(exercise::get_exercise_score));

    let upload_routes = Router::new().route("/", post(upload::upload_file));

    let uploads_dir = state.config.upload_dir.clone();

    Router::new()
        .nest("/api/courses", course_routes)
        .nest("/api/syllabi", syllabus_routes)
        .nest("/api/lessons", lesson_routes)
        .nest("/api/pages", page_routes)
        .nest("/api/students", student_routes)
        .nest("/api/exercises", exercise_routes)
        .nest("/api/uploads", upload_routes)
        // Stored uploads are served straight from disk.
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
