// src/handlers/admin.rs

use std::collections::HashSet;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use validator::Validate;

use crate::{
    config::TICKET_MIN_QUESTIONS,
    error::AppError,
    models::{
        package::{CreatePackageRequest, UpdatePackageRequest},
        question::{CreateQuestionRequest, UpdateQuestionRequest},
        ticket::CreateTicketRequest,
        topic::{CreateTopicRequest, UpdateTopicRequest},
        user::User,
    },
    utils::{hash::hash_password, html::clean_html},
};

// ---------------------------------------------------------------------------
// Users

/// Lists all users in the system.
/// Admin only.
pub async fn list_users(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id DESC")
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list users: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok(Json(users))
}

/// DTO for Admin creating a user (can specify role).
#[derive(Debug, Deserialize, Validate)]
pub struct AdminCreateUserRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username length must be between 3 and 50 characters."
    ))]
    pub username: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
    pub role: String, // 'user' or 'admin'
}

/// Creates a new user with specific role.
/// Admin only.
pub async fn create_user(
    State(pool): State<SqlitePool>,
    Json(payload): Json<AdminCreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if payload.role != "user" && payload.role != "admin" {
        return Err(AppError::BadRequest("Role must be 'user' or 'admin'".to_string()));
    }

    let hashed_password = hash_password(&payload.password)?;

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (username, password, role) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(&payload.username)
    .bind(&hashed_password)
    .bind(&payload.role)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint") {
            AppError::Conflict(format!("Username '{}' already exists", payload.username))
        } else {
            tracing::error!("Failed to create user: {:?}", e);
            AppError::InternalServerError(e.to_string())
        }
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// DTO for updating a user. Fields are optional.
#[derive(Debug, Deserialize)]
pub struct AdminUpdateUserRequest {
    pub username: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
    pub language: Option<String>,
}

/// Updates user information.
/// Admin only.
pub async fn update_user(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<AdminUpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_exists(&pool, "users", id, "User").await?;

    if let Some(new_username) = payload.username {
        sqlx::query("UPDATE users SET username = ? WHERE id = ?")
            .bind(new_username)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    if let Some(new_role) = payload.role {
        if new_role != "user" && new_role != "admin" {
            return Err(AppError::BadRequest("Role must be 'user' or 'admin'".to_string()));
        }
        sqlx::query("UPDATE users SET role = ? WHERE id = ?")
            .bind(new_role)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    if let Some(new_password) = payload.password {
        let hashed = hash_password(&new_password)?;
        sqlx::query("UPDATE users SET password = ? WHERE id = ?")
            .bind(hashed)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    if let Some(new_language) = payload.language {
        sqlx::query("UPDATE users SET language = ? WHERE id = ?")
            .bind(new_language)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    Ok(Json(serde_json::json!({"message": "User updated"})))
}

/// Deletes a user.
/// Admin only.
pub async fn delete_user(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Device limits

#[derive(Debug, Deserialize, Validate)]
pub struct DeviceLimitRequest {
    #[validate(range(min = 1, max = 10))]
    pub max_devices: i64,
}

/// Sets a per-user device limit and marks the row customized, so later bulk
/// default changes leave it alone. Active devices above the new cap are
/// clamped to keep the counter invariant.
pub async fn set_user_device_limit(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<DeviceLimitRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let result = sqlx::query(
        r#"
        UPDATE users
        SET max_devices = ?, devices_customized = 1,
            active_devices = MIN(active_devices, ?)
        WHERE id = ?
        "#,
    )
    .bind(payload.max_devices)
    .bind(payload.max_devices)
    .bind(id)
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(Json(serde_json::json!({"message": "Device limit updated"})))
}

/// Sets the global default device limit. One UPDATE restricted to
/// non-customized rows; per-user overrides survive untouched.
pub async fn set_default_device_limit(
    State(pool): State<SqlitePool>,
    Json(payload): Json<DeviceLimitRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let result = sqlx::query(
        r#"
        UPDATE users
        SET max_devices = ?, active_devices = MIN(active_devices, ?)
        WHERE devices_customized = 0
        "#,
    )
    .bind(payload.max_devices)
    .bind(payload.max_devices)
    .execute(&pool)
    .await?;

    Ok(Json(serde_json::json!({
        "message": "Default device limit updated",
        "updated_users": result.rows_affected(),
    })))
}

// ---------------------------------------------------------------------------
// Topics

/// Creates a topic.
pub async fn create_topic(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateTopicRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO topics (name_uzl, name_uzc, name_ru, position)
        VALUES (?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&payload.name_uzl)
    .bind(&payload.name_uzc)
    .bind(&payload.name_ru)
    .bind(payload.position.unwrap_or(0))
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Updates topic fields.
pub async fn update_topic(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTopicRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_exists(&pool, "topics", id, "Topic").await?;

    if let Some(name) = payload.name_uzl {
        sqlx::query("UPDATE topics SET name_uzl = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&pool)
            .await?;
    }
    if let Some(name) = payload.name_uzc {
        sqlx::query("UPDATE topics SET name_uzc = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&pool)
            .await?;
    }
    if let Some(name) = payload.name_ru {
        sqlx::query("UPDATE topics SET name_ru = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&pool)
            .await?;
    }
    if let Some(position) = payload.position {
        sqlx::query("UPDATE topics SET position = ? WHERE id = ?")
            .bind(position)
            .bind(id)
            .execute(&pool)
            .await?;
    }
    if let Some(is_active) = payload.is_active {
        sqlx::query("UPDATE topics SET is_active = ? WHERE id = ?")
            .bind(is_active)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    Ok(Json(serde_json::json!({"message": "Topic updated"})))
}

/// Soft-deletes a topic. Questions under it stop being drawable but stay
/// renderable for historical sessions.
pub async fn delete_topic(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("UPDATE topics SET is_deleted = 1 WHERE id = ? AND is_deleted = 0")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Topic not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Questions

/// Creates a question. The correct index must address the base option list;
/// translated option lists must be index-aligned with it.
pub async fn create_question(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    validate_question_shape(
        &payload.options_uzl,
        payload.options_uzc.as_deref(),
        payload.options_ru.as_deref(),
        payload.correct_option_index,
        payload.image_url.as_deref(),
    )?;

    ensure_exists(&pool, "topics", payload.topic_id, "Topic").await?;

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO questions
            (topic_id, content_uzl, content_uzc, content_ru,
             options_uzl, options_uzc, options_ru, correct_option_index,
             explanation_uzl, explanation_uzc, explanation_ru, image_url)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(payload.topic_id)
    .bind(&payload.content_uzl)
    .bind(&payload.content_uzc)
    .bind(&payload.content_ru)
    .bind(serde_json::to_string(&payload.options_uzl)?)
    .bind(payload.options_uzc.as_ref().map(serde_json::to_string).transpose()?)
    .bind(payload.options_ru.as_ref().map(serde_json::to_string).transpose()?)
    .bind(payload.correct_option_index)
    .bind(payload.explanation_uzl.as_deref().map(clean_html))
    .bind(payload.explanation_uzc.as_deref().map(clean_html))
    .bind(payload.explanation_ru.as_deref().map(clean_html))
    .bind(&payload.image_url)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Updates a question. Option/index changes never touch running sessions:
/// those graded against the snapshot taken when they started.
pub async fn update_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_exists(&pool, "questions", id, "Question").await?;

    if let Some(topic_id) = payload.topic_id {
        ensure_exists(&pool, "topics", topic_id, "Topic").await?;
        sqlx::query("UPDATE questions SET topic_id = ? WHERE id = ?")
            .bind(topic_id)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    for (column, value) in [
        ("content_uzl", payload.content_uzl.as_deref()),
        ("content_uzc", payload.content_uzc.as_deref()),
        ("content_ru", payload.content_ru.as_deref()),
    ] {
        if let Some(value) = value {
            sqlx::query(&format!("UPDATE questions SET {} = ? WHERE id = ?", column))
                .bind(value)
                .bind(id)
                .execute(&pool)
                .await?;
        }
    }

    if let Some(options) = &payload.options_uzl {
        let correct = match payload.correct_option_index {
            Some(index) => index,
            None => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT correct_option_index FROM questions WHERE id = ?",
                )
                .bind(id)
                .fetch_one(&pool)
                .await?
            }
        };
        validate_question_shape(
            options,
            payload.options_uzc.as_deref(),
            payload.options_ru.as_deref(),
            correct,
            None,
        )?;
        sqlx::query("UPDATE questions SET options_uzl = ? WHERE id = ?")
            .bind(serde_json::to_string(options)?)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    for (column, value) in [
        ("options_uzc", payload.options_uzc.as_ref()),
        ("options_ru", payload.options_ru.as_ref()),
    ] {
        if let Some(list) = value {
            sqlx::query(&format!("UPDATE questions SET {} = ? WHERE id = ?", column))
                .bind(serde_json::to_string(list)?)
                .bind(id)
                .execute(&pool)
                .await?;
        }
    }

    if let Some(index) = payload.correct_option_index {
        let options: String =
            sqlx::query_scalar("SELECT options_uzl FROM questions WHERE id = ?")
                .bind(id)
                .fetch_one(&pool)
                .await?;
        let options: Vec<String> = serde_json::from_str(&options)?;
        if index < 0 || index as usize >= options.len() {
            return Err(AppError::BadRequest(
                "correct_option_index is out of bounds".to_string(),
            ));
        }
        sqlx::query("UPDATE questions SET correct_option_index = ? WHERE id = ?")
            .bind(index)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    for (column, value) in [
        ("explanation_uzl", payload.explanation_uzl.as_deref()),
        ("explanation_uzc", payload.explanation_uzc.as_deref()),
        ("explanation_ru", payload.explanation_ru.as_deref()),
    ] {
        if let Some(value) = value {
            sqlx::query(&format!("UPDATE questions SET {} = ? WHERE id = ?", column))
                .bind(clean_html(value))
                .bind(id)
                .execute(&pool)
                .await?;
        }
    }

    if let Some(image_url) = &payload.image_url {
        url::Url::parse(image_url)
            .map_err(|_| AppError::BadRequest("image_url is not a valid URL".to_string()))?;
        sqlx::query("UPDATE questions SET image_url = ? WHERE id = ?")
            .bind(image_url)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    if let Some(is_active) = payload.is_active {
        sqlx::query("UPDATE questions SET is_active = ? WHERE id = ?")
            .bind(is_active)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    Ok(Json(serde_json::json!({"message": "Question updated"})))
}

/// Soft-deletes a question: it leaves every eligible pool but remains
/// renderable, so historical sessions keep their text and explanations.
pub async fn delete_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result =
        sqlx::query("UPDATE questions SET is_deleted = 1 WHERE id = ? AND is_deleted = 0")
            .bind(id)
            .execute(&pool)
            .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Packages

/// Creates a package together with its ordered question association.
/// question_count is declared from the association so the two can only
/// drift if questions are deleted later; the starter checks for that.
pub async fn create_package(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreatePackageRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    ensure_distinct_questions(&pool, &payload.question_ids).await?;

    let mut tx = pool.begin().await?;

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO packages
            (title_uzl, title_uzc, title_ru, duration_minutes, passing_score, question_count)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&payload.title_uzl)
    .bind(&payload.title_uzc)
    .bind(&payload.title_ru)
    .bind(payload.duration_minutes)
    .bind(payload.passing_score.unwrap_or(crate::config::DEFAULT_PASSING_SCORE))
    .bind(payload.question_ids.len() as i64)
    .fetch_one(&mut *tx)
    .await?;

    insert_association(&mut tx, "package_questions", "package_id", id, &payload.question_ids)
        .await?;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Updates package metadata; replaces the question association when
/// question_ids is present.
pub async fn update_package(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePackageRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_exists(&pool, "packages", id, "Package").await?;

    for (column, value) in [
        ("title_uzl", payload.title_uzl.as_deref()),
        ("title_uzc", payload.title_uzc.as_deref()),
        ("title_ru", payload.title_ru.as_deref()),
    ] {
        if let Some(value) = value {
            sqlx::query(&format!("UPDATE packages SET {} = ? WHERE id = ?", column))
                .bind(value)
                .bind(id)
                .execute(&pool)
                .await?;
        }
    }

    if let Some(duration) = payload.duration_minutes {
        if !(1..=480).contains(&duration) {
            return Err(AppError::BadRequest(
                "duration_minutes must be between 1 and 480".to_string(),
            ));
        }
        sqlx::query("UPDATE packages SET duration_minutes = ? WHERE id = ?")
            .bind(duration)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    if let Some(passing_score) = payload.passing_score {
        if !(0.0..=100.0).contains(&passing_score) {
            return Err(AppError::BadRequest(
                "passing_score must be between 0 and 100".to_string(),
            ));
        }
        sqlx::query("UPDATE packages SET passing_score = ? WHERE id = ?")
            .bind(passing_score)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    if let Some(question_ids) = &payload.question_ids {
        if question_ids.is_empty() {
            return Err(AppError::BadRequest(
                "A package needs at least one question".to_string(),
            ));
        }
        ensure_distinct_questions(&pool, question_ids).await?;

        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM package_questions WHERE package_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_association(&mut tx, "package_questions", "package_id", id, question_ids).await?;
        sqlx::query("UPDATE packages SET question_count = ? WHERE id = ?")
            .bind(question_ids.len() as i64)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
    }

    if let Some(is_active) = payload.is_active {
        sqlx::query("UPDATE packages SET is_active = ? WHERE id = ?")
            .bind(is_active)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    Ok(Json(serde_json::json!({"message": "Package updated"})))
}

/// Soft-deletes a package. Past sessions keep their package_id reference.
pub async fn delete_package(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result =
        sqlx::query("UPDATE packages SET is_deleted = 1 WHERE id = ? AND is_deleted = 0")
            .bind(id)
            .execute(&pool)
            .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Package not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Tickets

/// Creates a ticket with its fixed, ordered question set (at least 10).
pub async fn create_ticket(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateTicketRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if payload.question_ids.len() < TICKET_MIN_QUESTIONS {
        return Err(AppError::BadRequest(format!(
            "A ticket needs at least {} questions",
            TICKET_MIN_QUESTIONS
        )));
    }

    ensure_distinct_questions(&pool, &payload.question_ids).await?;

    let mut tx = pool.begin().await?;

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO tickets (number, duration_minutes, passing_score)
        VALUES (?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(payload.number)
    .bind(payload.duration_minutes.unwrap_or(15))
    .bind(payload.passing_score.unwrap_or(crate::config::DEFAULT_PASSING_SCORE))
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint") {
            AppError::Conflict(format!("Ticket number {} already exists", payload.number))
        } else {
            AppError::from(e)
        }
    })?;

    insert_association(&mut tx, "ticket_questions", "ticket_id", id, &payload.question_ids)
        .await?;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Deactivates a ticket. The row and its association stay: past sessions
/// reference them.
pub async fn delete_ticket(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("UPDATE tickets SET is_active = 0 WHERE id = ? AND is_active = 1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Ticket not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers

/// Validates the language-independent shape of a question: the correct index
/// must address the base option list, translated lists must be index-aligned
/// with it, and the image URL (when given) must parse.
fn validate_question_shape(
    options_uzl: &[String],
    options_uzc: Option<&[String]>,
    options_ru: Option<&[String]>,
    correct_option_index: i64,
    image_url: Option<&str>,
) -> Result<(), AppError> {
    if correct_option_index < 0 || correct_option_index as usize >= options_uzl.len() {
        return Err(AppError::BadRequest(
            "correct_option_index is out of bounds".to_string(),
        ));
    }

    for translated in [options_uzc, options_ru].into_iter().flatten() {
        if translated.len() != options_uzl.len() {
            return Err(AppError::BadRequest(
                "Translated option lists must match the base list length".to_string(),
            ));
        }
    }

    if let Some(image_url) = image_url {
        url::Url::parse(image_url)
            .map_err(|_| AppError::BadRequest("image_url is not a valid URL".to_string()))?;
    }

    Ok(())
}

/// Generic existence check on an id column, honoring soft deletion where the
/// table has it.
async fn ensure_exists(
    pool: &SqlitePool,
    table: &str,
    id: i64,
    label: &str,
) -> Result<(), AppError> {
    let sql = match table {
        "users" => "SELECT id FROM users WHERE id = ?".to_string(),
        _ => format!("SELECT id FROM {} WHERE id = ? AND is_deleted = 0", table),
    };

    sqlx::query_scalar::<_, i64>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound(format!("{} not found", label)))?;

    Ok(())
}

/// Verifies an id list is duplicate-free and every id names a live question.
async fn ensure_distinct_questions(pool: &SqlitePool, ids: &[i64]) -> Result<(), AppError> {
    let distinct: HashSet<i64> = ids.iter().copied().collect();
    if distinct.len() != ids.len() {
        return Err(AppError::BadRequest(
            "question_ids contains duplicates".to_string(),
        ));
    }

    let mut query_builder =
        QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM questions WHERE is_deleted = 0 AND id IN (");
    let mut separated = query_builder.separated(",");
    for id in ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(")");

    let found: i64 = query_builder.build_query_scalar().fetch_one(pool).await?;

    if found as usize != ids.len() {
        return Err(AppError::BadRequest(
            "question_ids references unknown or deleted questions".to_string(),
        ));
    }

    Ok(())
}

/// Writes ordered association rows for a package or ticket.
async fn insert_association(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    table: &str,
    owner_column: &str,
    owner_id: i64,
    question_ids: &[i64],
) -> Result<(), AppError> {
    for (index, question_id) in question_ids.iter().enumerate() {
        sqlx::query(&format!(
            "INSERT INTO {} ({}, question_id, position) VALUES (?, ?, ?)",
            table, owner_column
        ))
        .bind(owner_id)
        .bind(question_id)
        .bind((index + 1) as i64)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}
