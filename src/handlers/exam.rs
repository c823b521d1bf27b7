// src/handlers/exam.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use sqlx::{Sqlite, SqlitePool};
use validator::Validate;

use crate::{
    config::{
        Config, DEFAULT_PASSING_SCORE, MARATHON_MAX_QUESTIONS, MARATHON_MIN_DURATION_MINUTES,
        MARATHON_MIN_QUESTIONS, TICKET_MIN_QUESTIONS,
    },
    error::AppError,
    models::{
        package::Package,
        question::Question,
        session::{
            AnswerEntry, AnswerRecord, AutoSaveRequest, DisclosureMode, ExamSession, GradeOutcome,
            ResultQuestionView, ResultView, SessionQuestionView, SessionStatus, SessionView,
            SubmitRequest, grade,
        },
        ticket::Ticket,
    },
    utils::{i18n::Lang, jwt::Claims},
};

/// One drawn question: the id plus the correct-index snapshot the session
/// will keep for its whole life.
#[derive(sqlx::FromRow)]
struct DrawnQuestion {
    id: i64,
    correct_option_index: i64,
}

/// Parameters a starter resolves before the session row is written.
struct SessionParams {
    source: &'static str,
    package_id: Option<i64>,
    ticket_id: Option<i64>,
    duration_minutes: i64,
    passing_score: f64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct StartPackageRequest {
    pub package_id: i64,
    #[validate(range(min = 1, max = 480))]
    pub duration_minutes: Option<i64>,
    pub mode: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct StartMarathonRequest {
    pub topic_id: Option<i64>,
    pub question_count: i64,
    #[validate(range(min = 1, max = 480))]
    pub duration_minutes: Option<i64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub passing_score: Option<f64>,
    pub mode: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StartTicketRequest {
    pub ticket_id: i64,
    pub mode: Option<String>,
    pub language: Option<String>,
}

/// Starts a session from an admin-curated package.
///
/// Question order is the package's stored order; duration and passing score
/// come from the package row, duration overridable by the caller.
pub async fn start_package(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<StartPackageRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let package = sqlx::query_as::<_, Package>(
        "SELECT * FROM packages WHERE id = ? AND is_active = 1 AND is_deleted = 0",
    )
    .bind(payload.package_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Package not found".to_string()))?;

    let questions = sqlx::query_as::<_, DrawnQuestion>(
        r#"
        SELECT q.id, q.correct_option_index
        FROM package_questions pq
        JOIN questions q ON q.id = pq.question_id
        WHERE pq.package_id = ? AND q.is_active = 1 AND q.is_deleted = 0
        ORDER BY pq.position
        "#,
    )
    .bind(package.id)
    .fetch_all(&pool)
    .await?;

    // The content side keeps the association in sync with question_count;
    // the starter still fails fast if the live set shrank underneath it.
    if (questions.len() as i64) < package.question_count {
        return Err(AppError::Insufficient(format!(
            "Package declares {} questions but only {} are usable",
            package.question_count,
            questions.len()
        )));
    }

    let params = SessionParams {
        source: "package",
        package_id: Some(package.id),
        ticket_id: None,
        duration_minutes: payload.duration_minutes.unwrap_or(package.duration_minutes),
        passing_score: package.passing_score,
    };

    let session = create_session(
        &pool,
        &config,
        claims.user_id(),
        questions,
        params,
        payload.mode.as_deref(),
        payload.language.as_deref(),
    )
    .await?;

    let view = render_session_view(&pool, &session).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Starts an ad-hoc marathon: N distinct active questions drawn at random,
/// optionally restricted to one topic.
pub async fn start_marathon(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<StartMarathonRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if payload.question_count < MARATHON_MIN_QUESTIONS
        || payload.question_count > MARATHON_MAX_QUESTIONS
    {
        return Err(AppError::BadRequest(format!(
            "question_count must be between {} and {}",
            MARATHON_MIN_QUESTIONS, MARATHON_MAX_QUESTIONS
        )));
    }

    if let Some(topic_id) = payload.topic_id {
        sqlx::query_scalar::<_, i64>(
            "SELECT id FROM topics WHERE id = ? AND is_active = 1 AND is_deleted = 0",
        )
        .bind(topic_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Topic not found".to_string()))?;
    }

    // Random draw without replacement: let the database shuffle and cap.
    let questions = match payload.topic_id {
        Some(topic_id) => {
            sqlx::query_as::<_, DrawnQuestion>(
                r#"
                SELECT id, correct_option_index FROM questions
                WHERE is_active = 1 AND is_deleted = 0 AND topic_id = ?
                ORDER BY RANDOM()
                LIMIT ?
                "#,
            )
            .bind(topic_id)
            .bind(payload.question_count)
            .fetch_all(&pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, DrawnQuestion>(
                r#"
                SELECT id, correct_option_index FROM questions
                WHERE is_active = 1 AND is_deleted = 0
                ORDER BY RANDOM()
                LIMIT ?
                "#,
            )
            .bind(payload.question_count)
            .fetch_all(&pool)
            .await?
        }
    };

    if (questions.len() as i64) < payload.question_count {
        return Err(AppError::Insufficient(format!(
            "Requested {} questions but only {} are eligible",
            payload.question_count,
            questions.len()
        )));
    }

    let params = SessionParams {
        source: "marathon",
        package_id: None,
        ticket_id: None,
        duration_minutes: payload
            .duration_minutes
            .unwrap_or_else(|| MARATHON_MIN_DURATION_MINUTES.max(payload.question_count)),
        passing_score: payload.passing_score.unwrap_or(DEFAULT_PASSING_SCORE),
    };

    let session = create_session(
        &pool,
        &config,
        claims.user_id(),
        questions,
        params,
        payload.mode.as_deref(),
        payload.language.as_deref(),
    )
    .await?;

    let view = render_session_view(&pool, &session).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Starts a fixed-form ticket session: the ticket's pre-assembled question
/// set in its stored order, with the ticket's stored duration and threshold.
pub async fn start_ticket(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<StartTicketRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ticket = sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = ? AND is_active = 1")
        .bind(payload.ticket_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Ticket not found".to_string()))?;

    let questions = sqlx::query_as::<_, DrawnQuestion>(
        r#"
        SELECT q.id, q.correct_option_index
        FROM ticket_questions tq
        JOIN questions q ON q.id = tq.question_id
        WHERE tq.ticket_id = ? AND q.is_deleted = 0
        ORDER BY tq.position
        "#,
    )
    .bind(ticket.id)
    .fetch_all(&pool)
    .await?;

    if questions.len() < TICKET_MIN_QUESTIONS {
        return Err(AppError::Insufficient(format!(
            "Ticket {} has only {} usable questions",
            ticket.number,
            questions.len()
        )));
    }

    let params = SessionParams {
        source: "ticket",
        package_id: None,
        ticket_id: Some(ticket.id),
        duration_minutes: ticket.duration_minutes,
        passing_score: ticket.passing_score,
    };

    let session = create_session(
        &pool,
        &config,
        claims.user_id(),
        questions,
        params,
        payload.mode.as_deref(),
        payload.language.as_deref(),
    )
    .await?;

    let view = render_session_view(&pool, &session).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Shared tail of every starter: concurrency guard, then the session row and
/// its full answer-record set written in one transaction. No partial session
/// is ever visible.
async fn create_session(
    pool: &SqlitePool,
    config: &Config,
    user_id: i64,
    questions: Vec<DrawnQuestion>,
    params: SessionParams,
    mode: Option<&str>,
    language: Option<&str>,
) -> Result<ExamSession, AppError> {
    let user_language = sqlx::query_scalar::<_, String>("SELECT language FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let language = Lang::parse(language.unwrap_or(&user_language));
    let mode = DisclosureMode::parse(mode.unwrap_or("secure"));

    let now = Utc::now();

    if config.single_session_policy {
        // Only a live session blocks; a logically-expired leftover waiting
        // for the sweep must not lock the user out.
        let active = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM exam_sessions WHERE user_id = ? AND status = 'in_progress' AND expires_at > ?",
        )
        .bind(user_id)
        .bind(now)
        .fetch_one(pool)
        .await?;

        if active > 0 {
            return Err(AppError::Conflict(
                "An exam session is already in progress".to_string(),
            ));
        }
    }

    let expires_at = now + Duration::minutes(params.duration_minutes);

    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO exam_sessions
            (user_id, source, package_id, ticket_id, status, mode, language,
             total_questions, duration_minutes, passing_score,
             started_at, expires_at, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(params.source)
    .bind(params.package_id)
    .bind(params.ticket_id)
    .bind(SessionStatus::InProgress.as_str())
    .bind(mode.as_str())
    .bind(language.as_str())
    .bind(questions.len() as i64)
    .bind(params.duration_minutes)
    .bind(params.passing_score)
    .bind(now)
    .bind(expires_at)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let session_id = result.last_insert_rowid();

    for (index, question) in questions.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO answer_records
                (session_id, question_id, question_order, correct_option_index)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(session_id)
        .bind(question.id)
        .bind((index + 1) as i64)
        .bind(question.correct_option_index)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        "Started {} session {} for user {} ({} questions, {} min)",
        params.source,
        session_id,
        user_id,
        questions.len(),
        params.duration_minutes
    );

    fetch_session(pool, session_id).await
}

/// Incrementally saves answers into a running session. Last-write-wins per
/// question slot, the whole batch in one transaction, safely repeatable.
/// Never transitions status and never grades.
pub async fn auto_save(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<i64>,
    Json(payload): Json<AutoSaveRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let session = fetch_owned_session(&pool, session_id, claims.user_id()).await?;
    ensure_mutable(&session, Utc::now())?;

    let mut tx = pool.begin().await?;
    apply_answer_entries(&mut tx, &session, &payload.answers, Utc::now()).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Submits a session: applies the optional final answer batch, grades the
/// full record set and flips the session to COMPLETED, all in one
/// transaction, so grading never observes a half-applied save.
///
/// Submission is idempotent with an explicit error: a second submit fails
/// with Conflict and the stored grade is untouched.
pub async fn submit(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<i64>,
    Json(payload): Json<SubmitRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = fetch_owned_session(&pool, session_id, claims.user_id()).await?;
    ensure_mutable(&session, Utc::now())?;

    let now = Utc::now();
    let mut tx = pool.begin().await?;

    apply_answer_entries(&mut tx, &session, &payload.answers, now).await?;

    let finalized =
        grade_and_finalize(&mut tx, &session, SessionStatus::Completed, now).await?;
    if !finalized {
        // Lost the race against another submit or the sweeper; the dropped
        // transaction rolls the answer batch back.
        return Err(AppError::Conflict(
            "Session is already finalized".to_string(),
        ));
    }

    tx.commit().await?;

    let session = fetch_session(&pool, session_id).await?;
    let view = render_result_view(&pool, &session).await?;
    Ok(Json(view))
}

/// Abandons a running session: terminal, but no grading; counts stay
/// whatever they were. Mirrors "the user quit", not "the user finished".
pub async fn abandon(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let session = fetch_owned_session(&pool, session_id, claims.user_id()).await?;
    ensure_mutable(&session, Utc::now())?;

    let result = sqlx::query(
        "UPDATE exam_sessions SET status = ?, finished_at = ? WHERE id = ? AND status = 'in_progress'",
    )
    .bind(SessionStatus::Abandoned.as_str())
    .bind(Utc::now())
    .bind(session_id)
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Conflict(
            "Session is already finalized".to_string(),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Returns the graded outcome of a terminal session, fully disclosed.
pub async fn get_result(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let session = fetch_owned_session(&pool, session_id, claims.user_id()).await?;

    if !session.status().is_terminal() {
        return Err(AppError::Conflict(
            "Session is not finalized yet".to_string(),
        ));
    }

    let view = render_result_view(&pool, &session).await?;
    Ok(Json(view))
}

/// Resume support: the caller's most recent live session, or null.
pub async fn get_active_session(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let session = sqlx::query_as::<_, ExamSession>(
        r#"
        SELECT * FROM exam_sessions
        WHERE user_id = ? AND status = 'in_progress' AND expires_at > ?
        ORDER BY started_at DESC
        LIMIT 1
        "#,
    )
    .bind(claims.user_id())
    .bind(Utc::now())
    .fetch_optional(&pool)
    .await?;

    match session {
        Some(session) => {
            let view = render_session_view(&pool, &session).await?;
            Ok(Json(Some(view)).into_response())
        }
        None => Ok(Json(None::<SessionView>).into_response()),
    }
}

/// Finalizes one overdue session through the expiry path: grade whatever
/// answers exist, then transition to EXPIRED. Used by the sweeper; a session
/// that something else finalized in the meantime is left alone.
pub async fn finalize_expired(pool: &SqlitePool, session_id: i64) -> Result<bool, AppError> {
    let session = fetch_session(pool, session_id).await?;

    if session.status() != SessionStatus::InProgress {
        return Ok(false);
    }

    let mut tx = pool.begin().await?;
    // The attempt ended when the budget ran out, not when the sweep noticed.
    let finalized =
        grade_and_finalize(&mut tx, &session, SessionStatus::Expired, session.expires_at).await?;
    tx.commit().await?;

    Ok(finalized)
}

async fn fetch_session(pool: &SqlitePool, session_id: i64) -> Result<ExamSession, AppError> {
    sqlx::query_as::<_, ExamSession>("SELECT * FROM exam_sessions WHERE id = ?")
        .bind(session_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Session not found".to_string()))
}

/// Fetches a session and enforces ownership.
async fn fetch_owned_session(
    pool: &SqlitePool,
    session_id: i64,
    user_id: i64,
) -> Result<ExamSession, AppError> {
    let session = fetch_session(pool, session_id).await?;

    if session.user_id != user_id {
        return Err(AppError::Forbidden(
            "Session belongs to another user".to_string(),
        ));
    }

    Ok(session)
}

/// Rejects any mutation of a session that is terminal or past its deadline.
/// A logically-expired session answers exactly like a swept one, just with a
/// distinguishable kind for messaging.
fn ensure_mutable(session: &ExamSession, now: DateTime<Utc>) -> Result<(), AppError> {
    match session.status() {
        SessionStatus::InProgress => {
            if session.is_expired(now) {
                Err(AppError::Expired("Session time has run out".to_string()))
            } else {
                Ok(())
            }
        }
        _ => Err(AppError::Conflict(
            "Session is already finalized".to_string(),
        )),
    }
}

/// Applies an answer batch with last-write-wins semantics. An entry naming a
/// question outside the session fails the whole batch.
async fn apply_answer_entries(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    session: &ExamSession,
    entries: &[AnswerEntry],
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    for entry in entries {
        let answered_at = entry.selected_option_index.map(|_| now);

        let result = sqlx::query(
            r#"
            UPDATE answer_records
            SET selected_option_index = ?, time_spent_seconds = ?, answered_at = ?
            WHERE session_id = ? AND question_id = ?
            "#,
        )
        .bind(entry.selected_option_index)
        .bind(entry.time_spent_seconds)
        .bind(answered_at)
        .bind(session.id)
        .bind(entry.question_id)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Question {} is not part of this session",
                entry.question_id
            )));
        }
    }

    Ok(())
}

/// Grades the record set and performs the terminal transition. The
/// conditional UPDATE on status is the single idempotency gate: it returns
/// false when someone else already finalized the session.
async fn grade_and_finalize(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    session: &ExamSession,
    terminal: SessionStatus,
    finished_at: DateTime<Utc>,
) -> Result<bool, AppError> {
    let records = sqlx::query_as::<_, AnswerRecord>(
        "SELECT * FROM answer_records WHERE session_id = ? ORDER BY question_order",
    )
    .bind(session.id)
    .fetch_all(&mut **tx)
    .await?;

    let outcome: GradeOutcome = grade(&records, session.passing_score);

    for (record, is_correct) in records.iter().zip(outcome.per_record.iter()) {
        sqlx::query("UPDATE answer_records SET is_correct = ? WHERE id = ?")
            .bind(is_correct)
            .bind(record.id)
            .execute(&mut **tx)
            .await?;
    }

    let result = sqlx::query(
        r#"
        UPDATE exam_sessions
        SET status = ?, answered_count = ?, correct_count = ?, wrong_count = ?,
            score = ?, percentage = ?, is_passed = ?, finished_at = ?
        WHERE id = ? AND status = 'in_progress'
        "#,
    )
    .bind(terminal.as_str())
    .bind(outcome.answered_count)
    .bind(outcome.correct_count)
    .bind(outcome.wrong_count)
    .bind(outcome.score)
    .bind(outcome.percentage)
    .bind(outcome.is_passed)
    .bind(finished_at)
    .bind(session.id)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Loads the question rows behind a record set, keyed by id.
async fn fetch_questions_by_ids(
    pool: &SqlitePool,
    ids: &[i64],
) -> Result<HashMap<i64, Question>, AppError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    // Dynamic IN clause via QueryBuilder.
    let mut query_builder =
        sqlx::QueryBuilder::<Sqlite>::new("SELECT * FROM questions WHERE id IN (");
    let mut separated = query_builder.separated(",");
    for id in ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(")");

    let questions: Vec<Question> = query_builder.build_query_as().fetch_all(pool).await?;

    Ok(questions.into_iter().map(|q| (q.id, q)).collect())
}

/// Renders a running session in its captured language. Secure mode strips
/// the correct index and explanation from every question payload.
async fn render_session_view(
    pool: &SqlitePool,
    session: &ExamSession,
) -> Result<SessionView, AppError> {
    let lang = Lang::parse(&session.language);
    let disclose = session.mode() == DisclosureMode::Visible;

    let records = sqlx::query_as::<_, AnswerRecord>(
        "SELECT * FROM answer_records WHERE session_id = ? ORDER BY question_order",
    )
    .bind(session.id)
    .fetch_all(pool)
    .await?;

    let ids: Vec<i64> = records.iter().map(|r| r.question_id).collect();
    let questions = fetch_questions_by_ids(pool, &ids).await?;

    let mut views = Vec::with_capacity(records.len());
    for record in &records {
        let question = questions.get(&record.question_id).ok_or_else(|| {
            AppError::InternalServerError(format!(
                "Question {} missing for session {}",
                record.question_id, session.id
            ))
        })?;

        views.push(SessionQuestionView {
            question_id: record.question_id,
            question_order: record.question_order,
            content: question.content(lang).to_string(),
            options: question.options(lang).to_vec(),
            image_url: question.image_url.clone(),
            selected_option_index: record.selected_option_index,
            correct_option_index: disclose.then_some(record.correct_option_index),
            explanation: if disclose {
                question.explanation(lang).map(str::to_string)
            } else {
                None
            },
        });
    }

    Ok(SessionView {
        session_id: session.id,
        source: session.source.clone(),
        package_id: session.package_id,
        ticket_id: session.ticket_id,
        status: session.status.clone(),
        mode: session.mode.clone(),
        language: session.language.clone(),
        total_questions: session.total_questions,
        duration_minutes: session.duration_minutes,
        passing_score: session.passing_score,
        started_at: session.started_at,
        expires_at: session.expires_at,
        questions: views,
    })
}

/// Renders a terminal session's full breakdown. Disclosure is unconditional
/// here: once a session is terminal the learner always sees what was right.
async fn render_result_view(
    pool: &SqlitePool,
    session: &ExamSession,
) -> Result<ResultView, AppError> {
    let lang = Lang::parse(&session.language);

    let records = sqlx::query_as::<_, AnswerRecord>(
        "SELECT * FROM answer_records WHERE session_id = ? ORDER BY question_order",
    )
    .bind(session.id)
    .fetch_all(pool)
    .await?;

    let ids: Vec<i64> = records.iter().map(|r| r.question_id).collect();
    let questions = fetch_questions_by_ids(pool, &ids).await?;

    let mut views = Vec::with_capacity(records.len());
    for record in &records {
        let question = questions.get(&record.question_id).ok_or_else(|| {
            AppError::InternalServerError(format!(
                "Question {} missing for session {}",
                record.question_id, session.id
            ))
        })?;

        views.push(ResultQuestionView {
            question_id: record.question_id,
            question_order: record.question_order,
            content: question.content(lang).to_string(),
            options: question.options(lang).to_vec(),
            image_url: question.image_url.clone(),
            selected_option_index: record.selected_option_index,
            correct_option_index: record.correct_option_index,
            is_correct: record.is_correct,
            explanation: question.explanation(lang).map(str::to_string),
        });
    }

    let duration_seconds = session
        .finished_at
        .map(|finished| (finished - session.started_at).num_seconds());

    Ok(ResultView {
        session_id: session.id,
        source: session.source.clone(),
        status: session.status.clone(),
        total_questions: session.total_questions,
        answered_count: session.answered_count,
        correct_count: session.correct_count,
        wrong_count: session.wrong_count,
        score: session.score,
        percentage: session.percentage,
        is_passed: session.is_passed,
        passing_score: session.passing_score,
        started_at: session.started_at,
        finished_at: session.finished_at,
        duration_seconds,
        questions: views,
    })
}
