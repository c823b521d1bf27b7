// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::{Config, DEFAULT_MAX_DEVICES},
    error::AppError,
    models::user::{CreateUserRequest, LoginRequest, User},
    utils::{
        hash::{hash_password, verify_password},
        i18n::Lang,
        jwt::{Claims, sign_jwt},
    },
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and the user object (excluding password).
pub async fn register(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let hashed_password = hash_password(&payload.password)?;
    let language = Lang::parse(payload.language.as_deref().unwrap_or("uzl"));

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, password, language, max_devices)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&payload.username)
    .bind(&hashed_password)
    .bind(language.as_str())
    .bind(DEFAULT_MAX_DEVICES)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint") {
            AppError::Conflict(format!("Username '{}' already exists", payload.username))
        } else {
            tracing::error!("Failed to register user: {:?}", e);
            AppError::from(e)
        }
    })?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticates a user and returns a JWT token.
///
/// Verifies the credentials, then claims a device slot with a single
/// conditional UPDATE, so two racing logins can never both squeeze past a
/// "slot available" check. Fails with Conflict once every slot is taken.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(&payload.username)
        .fetch_optional(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Login DB error: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    let user = user.ok_or(AppError::AuthError("User not found".to_string()))?;

    let is_valid = verify_password(&payload.password, &user.password)?;

    if !is_valid {
        return Err(AppError::AuthError("Invalid password".to_string()));
    }

    let claimed = sqlx::query(
        "UPDATE users SET active_devices = active_devices + 1 WHERE id = ? AND active_devices < max_devices",
    )
    .bind(user.id)
    .execute(&pool)
    .await?;

    if claimed.rows_affected() == 0 {
        return Err(AppError::Conflict(format!(
            "Device limit reached ({} devices)",
            user.max_devices
        )));
    }

    let token = sign_jwt(user.id, &user.role, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "language": user.language,
    })))
}

/// Releases the caller's device slot. Floors at zero so a duplicate logout
/// can never underflow the counter.
pub async fn logout(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    sqlx::query("UPDATE users SET active_devices = MAX(active_devices - 1, 0) WHERE id = ?")
        .bind(claims.user_id())
        .execute(&pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
