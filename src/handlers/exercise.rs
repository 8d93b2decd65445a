// src/handlers/exercise.rs
//
// The exercise pipeline endpoints: question generation for a
// (lesson, student) pair, the public question listing, and scoring with
// the pass/unlock and fail/regenerate paths.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    generation::{ExercisePrompt, ParserPolicy, parse_questions},
    models::{
        course::Course,
        exercise::{Exercise, GenerateQuestionsRequest, GenerateQuestionsResponse, PublicQuestion},
        lesson::Lesson,
        page::Page,
        score::{ExerciseScore, SubmitExerciseRequest, SubmitExerciseResponse},
        student::Student,
    },
    state::AppState,
    utils::html::extract_page_text,
};

const PASS_FEEDBACK: &str = "Congratulations, you passed the exercise!";
const FAIL_FEEDBACK: &str = "You did not pass the exercise. Please try again.";

/// Generates (or returns the existing) exercise for a (lesson, student) pair.
///
/// The upstream call happens before any transaction is opened; the exercise
/// row and its questions are then persisted atomically. The unique
/// (lesson_id, student_id) constraint makes concurrent requests collapse to
/// one row: whoever loses the insert race re-reads and returns the winner's
/// exercise.
pub async fn generate_questions(
    State(state): State<AppState>,
    Json(req): Json<GenerateQuestionsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let course_id = require(req.course_id, "course_id")?;
    let lesson_id = require(req.lesson_id, "lesson_id")?;
    let page_id = require(req.page_id, "page_id")?;
    let student_id = require(req.student_id, "student_id")?;

    let course = fetch_course(&state.pool, &course_id).await?;
    let lesson = fetch_lesson(&state.pool, &lesson_id).await?;
    fetch_student(&state.pool, student_id).await?;

    let page = sqlx::query_as::<_, Page>(
        "SELECT id, lesson_id, syllabus_id, page_number, content FROM pages WHERE id = $1",
    )
    .bind(page_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Page not found".to_string()))?;

    if page.lesson_id != lesson.lesson_id {
        return Err(AppError::BadRequest(
            "page does not belong to the given lesson".to_string(),
        ));
    }

    // Idempotent by (lesson, student): an existing exercise short-circuits
    // before any upstream call is made.
    if let Some(existing) = find_exercise(&state.pool, &lesson.lesson_id, student_id).await? {
        let count = question_count(&state.pool, existing).await?;
        return Ok((
            StatusCode::OK,
            Json(GenerateQuestionsResponse {
                exercise_id: existing,
                question_count: count as usize,
                regenerated: false,
            }),
        ));
    }

    let records =
        generate_question_records(&state, &course, &lesson, &page.content).await?;

    let mut tx = state.pool.begin().await?;

    let inserted: Option<i64> = sqlx::query_scalar(
        "INSERT INTO exercises (lesson_id, student_id, name)
         VALUES ($1, $2, $3)
         ON CONFLICT (lesson_id, student_id) DO NOTHING
         RETURNING id",
    )
    .bind(&lesson.lesson_id)
    .bind(student_id)
    .bind(format!("{} Exercise", lesson.lesson_title))
    .fetch_optional(&mut *tx)
    .await?;

    let Some(exercise_id) = inserted else {
        // Lost the race: another request created the exercise between our
        // check and the insert. Drop the generated set and return theirs.
        tx.rollback().await?;
        let existing = find_exercise(&state.pool, &lesson.lesson_id, student_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Exercise not found".to_string()))?;
        let count = question_count(&state.pool, existing).await?;
        return Ok((
            StatusCode::OK,
            Json(GenerateQuestionsResponse {
                exercise_id: existing,
                question_count: count as usize,
                regenerated: false,
            }),
        ));
    };

    let inserted_count = records.len();
    insert_questions(&mut tx, exercise_id, &records).await?;
    tx.commit().await?;

    tracing::info!(
        "Generated exercise {} with {} questions for lesson {} / student {}",
        exercise_id,
        inserted_count,
        lesson.lesson_id,
        student_id
    );

    Ok((
        StatusCode::CREATED,
        Json(GenerateQuestionsResponse {
            exercise_id,
            question_count: inserted_count,
            regenerated: true,
        }),
    ))
}

/// Lists an exercise's questions with the correct answers hidden.
pub async fn list_questions(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    fetch_exercise(&pool, id).await?;

    let questions = sqlx::query_as::<_, PublicQuestion>(
        "SELECT id, question, choice_a, choice_b, choice_c, choice_d, subject
         FROM exercise_questions
         WHERE exercise_id = $1
         ORDER BY id",
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(questions))
}

/// Grades a submitted answer set against the exercise's stored questions.
///
/// Score write, correctness-link replacement, next-lesson unlock and (on
/// fail) question deletion happen in one transaction. The fail path then
/// regenerates a fresh question set after commit, since the upstream call
/// must not run inside a transaction.
pub async fn submit_exercise(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<SubmitExerciseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = require(req.student_id, "student_id")?;

    if req.answers.is_empty() {
        return Err(AppError::BadRequest("No answers submitted".to_string()));
    }

    let exercise = fetch_exercise(&state.pool, id).await?;
    fetch_student(&state.pool, student_id).await?;

    let answer_key: HashMap<i64, String> = sqlx::query_as::<_, (i64, String)>(
        "SELECT id, correct_answer FROM exercise_questions WHERE exercise_id = $1",
    )
    .bind(id)
    .fetch_all(&state.pool)
    .await?
    .into_iter()
    .collect();

    let total_questions = answer_key.len() as i64;
    if total_questions == 0 {
        return Err(AppError::BadRequest(
            "Exercise has no questions to grade".to_string(),
        ));
    }

    let (score, correct_ids) = compute_score(&req.answers, &answer_key);
    let passed = is_passing(score, total_questions, state.config.pass_ratio);
    let feedback = if passed { PASS_FEEDBACK } else { FAIL_FEEDBACK };

    let lesson = fetch_lesson(&state.pool, &exercise.lesson_id).await?;

    let mut tx = state.pool.begin().await?;

    let score_id: i64 = sqlx::query_scalar(
        "INSERT INTO exercise_scores
            (exercise_id, student_id, score, feedback, total_questions, date_taken)
         VALUES ($1, $2, $3, $4, $5, CURRENT_DATE)
         ON CONFLICT (exercise_id, student_id) DO UPDATE SET
            score = EXCLUDED.score,
            feedback = EXCLUDED.feedback,
            total_questions = EXCLUDED.total_questions,
            date_taken = EXCLUDED.date_taken
         RETURNING id",
    )
    .bind(id)
    .bind(student_id)
    .bind(score as f64)
    .bind(feedback)
    .bind(total_questions as i32)
    .fetch_one(&mut *tx)
    .await?;

    // Full replace of the correctness links, not a merge.
    sqlx::query("DELETE FROM correct_questions WHERE score_id = $1")
        .bind(score_id)
        .execute(&mut *tx)
        .await?;

    for question_id in &correct_ids {
        sqlx::query(
            "INSERT INTO correct_questions (score_id, question_id)
             VALUES ($1, $2)
             ON CONFLICT (score_id, question_id) DO NOTHING",
        )
        .bind(score_id)
        .bind(question_id)
        .execute(&mut *tx)
        .await?;
    }

    if passed {
        sqlx::query(
            "UPDATE lessons SET available = TRUE
             WHERE syllabus_id = $1 AND lesson_order = $2",
        )
        .bind(&lesson.syllabus_id)
        .bind(lesson.lesson_order + 1)
        .execute(&mut *tx)
        .await?;
    } else {
        sqlx::query("DELETE FROM exercise_questions WHERE exercise_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    // Fresh question set for the retry. The committed score stands even if
    // this fails; the client sees `regenerated: false` and can re-request.
    let mut regenerated = false;
    if !passed {
        match regenerate_question_set(&state, &exercise).await {
            Ok(count) => {
                regenerated = true;
                tracing::info!(
                    "Regenerated {} questions for exercise {} after failed attempt",
                    count,
                    id
                );
            }
            Err(e) => {
                tracing::error!("Failed to regenerate questions for exercise {}: {}", id, e);
            }
        }
    }

    Ok(Json(SubmitExerciseResponse {
        score,
        total_questions,
        feedback: feedback.to_string(),
        passed,
        regenerated,
    }))
}

/// Retrieves a student's recorded score for an exercise.
pub async fn get_exercise_score(
    State(pool): State<PgPool>,
    Path((id, student_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let score = sqlx::query_as::<_, ExerciseScore>(
        "SELECT id, exercise_id, student_id, score, feedback, total_questions, date_taken
         FROM exercise_scores WHERE exercise_id = $1 AND student_id = $2",
    )
    .bind(id)
    .bind(student_id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Score not found".to_string()))?;

    Ok(Json(score))
}

/// Counts exact matches between submitted answers and the stored key.
/// Returns the score and the ids of the correctly answered questions.
pub fn compute_score(
    answers: &HashMap<i64, String>,
    answer_key: &HashMap<i64, String>,
) -> (i64, Vec<i64>) {
    let mut correct_ids: Vec<i64> = answers
        .iter()
        .filter(|&(qid, given)| answer_key.get(qid).is_some_and(|want| want == given))
        .map(|(qid, _)| *qid)
        .collect();
    correct_ids.sort_unstable();
    (correct_ids.len() as i64, correct_ids)
}

/// Pass iff score >= ceil(ratio * total).
pub fn is_passing(score: i64, total_questions: i64, pass_ratio: f64) -> bool {
    let required = (pass_ratio * total_questions as f64).ceil() as i64;
    total_questions > 0 && score >= required
}

fn require<T>(value: Option<T>, field: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::BadRequest(format!("{} is required", field)))
}

async fn fetch_course(pool: &PgPool, course_id: &str) -> Result<Course, AppError> {
    sqlx::query_as::<_, Course>(
        "SELECT course_id, course_title, short_description, long_description, image, is_published
         FROM courses WHERE course_id = $1",
    )
    .bind(course_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Course not found".to_string()))
}

async fn fetch_lesson(pool: &PgPool, lesson_id: &str) -> Result<Lesson, AppError> {
    sqlx::query_as::<_, Lesson>(
        "SELECT lesson_id, syllabus_id, lesson_title, lesson_order, available
         FROM lessons WHERE lesson_id = $1",
    )
    .bind(lesson_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Lesson not found".to_string()))
}

async fn fetch_student(pool: &PgPool, student_id: i64) -> Result<Student, AppError> {
    sqlx::query_as::<_, Student>("SELECT id, username, display_name FROM students WHERE id = $1")
        .bind(student_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".to_string()))
}

async fn fetch_exercise(pool: &PgPool, id: i64) -> Result<Exercise, AppError> {
    sqlx::query_as::<_, Exercise>(
        "SELECT id, lesson_id, student_id, name FROM exercises WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Exercise not found".to_string()))
}

async fn find_exercise(
    pool: &PgPool,
    lesson_id: &str,
    student_id: i64,
) -> Result<Option<i64>, AppError> {
    Ok(sqlx::query_scalar(
        "SELECT id FROM exercises WHERE lesson_id = $1 AND student_id = $2",
    )
    .bind(lesson_id)
    .bind(student_id)
    .fetch_optional(pool)
    .await?)
}

async fn question_count(pool: &PgPool, exercise_id: i64) -> Result<i64, AppError> {
    Ok(sqlx::query_scalar(
        "SELECT COUNT(*) FROM exercise_questions WHERE exercise_id = $1",
    )
    .bind(exercise_id)
    .fetch_one(pool)
    .await?)
}

/// Extract -> prompt -> upstream call -> parse. No transaction is held
/// across the upstream call.
async fn generate_question_records(
    state: &AppState,
    course: &Course,
    lesson: &Lesson,
    page_content: &str,
) -> Result<Vec<crate::generation::ParsedQuestion>, AppError> {
    let extracted = extract_page_text(page_content);
    let prompt = ExercisePrompt::build(
        &course.course_title,
        &lesson.lesson_title,
        &extracted.body,
        state.config.questions_per_exercise,
    );

    let raw = state.generator.generate(&prompt).await?;
    let records = parse_questions(&raw, &course.course_title, ParserPolicy::default());

    if records.is_empty() {
        return Err(AppError::UpstreamGeneration(
            "reply contained no parseable questions".to_string(),
        ));
    }
    Ok(records)
}

async fn insert_questions(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    exercise_id: i64,
    records: &[crate::generation::ParsedQuestion],
) -> Result<(), AppError> {
    for record in records {
        sqlx::query(
            "INSERT INTO exercise_questions
                (exercise_id, question, choice_a, choice_b, choice_c, choice_d, subject, correct_answer)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(exercise_id)
        .bind(&record.question)
        .bind(&record.choice_a)
        .bind(&record.choice_b)
        .bind(&record.choice_c)
        .bind(&record.choice_d)
        .bind(&record.subject)
        .bind(&record.correct_answer)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// Builds a fresh question set for an existing exercise from the lesson's
/// first page. Used after a failed attempt.
async fn regenerate_question_set(state: &AppState, exercise: &Exercise) -> Result<usize, AppError> {
    let lesson = fetch_lesson(&state.pool, &exercise.lesson_id).await?;

    let course = sqlx::query_as::<_, Course>(
        "SELECT c.course_id, c.course_title, c.short_description, c.long_description, c.image, c.is_published
         FROM courses c
         JOIN syllabi s ON s.course_id = c.course_id
         WHERE s.syllabus_id = $1",
    )
    .bind(&lesson.syllabus_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    let page_content: String = sqlx::query_scalar(
        "SELECT content FROM pages WHERE lesson_id = $1 ORDER BY page_number LIMIT 1",
    )
    .bind(&lesson.lesson_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Lesson has no pages".to_string()))?;

    let records = generate_question_records(state, &course, &lesson, &page_content).await?;

    let mut tx = state.pool.begin().await?;
    sqlx::query("DELETE FROM exercise_questions WHERE exercise_id = $1")
        .bind(exercise.id)
        .execute(&mut *tx)
        .await?;
    let count = records.len();
    insert_questions(&mut tx, exercise.id, &records).await?;
    tx.commit().await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(pairs: &[(i64, &str)]) -> HashMap<i64, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn scores_exact_matches_only() {
        let answer_key = key(&[(1, "2x"), (2, "x"), (3, "4")]);

        let (score, correct) = compute_score(&key(&[(1, "2x")]), &answer_key);
        assert_eq!(score, 1);
        assert_eq!(correct, vec![1]);

        let (score, correct) = compute_score(&key(&[(1, "x")]), &answer_key);
        assert_eq!(score, 0);
        assert!(correct.is_empty());
    }

    #[test]
    fn ignores_unknown_question_ids() {
        let answer_key = key(&[(1, "2x")]);
        let (score, _) = compute_score(&key(&[(1, "2x"), (99, "2x")]), &answer_key);
        assert_eq!(score, 1);
    }

    #[test]
    fn scores_full_submission() {
        let answer_key = key(&[(1, "a"), (2, "b"), (3, "c")]);
        let (score, correct) = compute_score(&key(&[(1, "a"), (2, "wrong"), (3, "c")]), &answer_key);
        assert_eq!(score, 2);
        assert_eq!(correct, vec![1, 3]);
    }

    #[test]
    fn passing_threshold_is_ceil_of_ratio() {
        // 80% of 12 questions -> 10 required
        assert!(!is_passing(9, 12, 0.8));
        assert!(is_passing(10, 12, 0.8));
        // 80% of 15 questions -> 12 required
        assert!(!is_passing(11, 15, 0.8));
        assert!(is_passing(12, 15, 0.8));
    }

    #[test]
    fn zero_questions_never_passes() {
        assert!(!is_passing(0, 0, 0.8));
    }
}
