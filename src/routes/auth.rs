//! Authentication routes: login, admin-driven registration, password change

use axum::{Extension, Json, extract::State};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::prelude::FromRow;
use validator::Validate;

use crate::auth::{generate_token, hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::routes::AppState;

#[derive(Debug, Serialize)]
pub struct TokenOut {
    pub access_token: String,
    pub token_type: &'static str,
}

impl TokenOut {
    fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer",
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterIn {
    pub name: Option<String>,
    pub lastname: Option<String>,
    pub patronymic: String,
    pub age: i64,
    pub class_id: i64,
    pub phone_number: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub avatar_url: String,
    pub user_rate: i64,
    pub role_id: i64,
    pub is_complex: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginIn {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordIn {
    pub current_password: String,
    #[validate(length(min = 8))]
    pub new_password: String,
}

#[derive(Debug, FromRow)]
struct CredentialRow {
    id: i64,
    password_hash: Option<String>,
    role: String,
}

/// POST /auth/register (admin) - create an account and return its token
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterIn>,
) -> AppResult<Json<TokenOut>> {
    payload.validate()?;

    let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = ?1")
        .bind(&payload.email)
        .fetch_optional(&state.pool)
        .await?;
    if exists.is_some() {
        return Err(AppError::BadRequest("Email already registered".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    let created_at: NaiveDate = Local::now().date_naive();

    let user_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users
            (name, lastname, patronymic, age, class_id, phone_number, email,
             created_at, avatar_url, user_rate, role_id, is_complex, password_hash)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
         RETURNING id",
    )
    .bind(&payload.name)
    .bind(&payload.lastname)
    .bind(&payload.patronymic)
    .bind(payload.age)
    .bind(payload.class_id)
    .bind(&payload.phone_number)
    .bind(&payload.email)
    .bind(created_at)
    .bind(&payload.avatar_url)
    .bind(payload.user_rate)
    .bind(payload.role_id)
    .bind(payload.is_complex)
    .bind(&password_hash)
    .fetch_one(&state.pool)
    .await?;

    let role = sqlx::query_scalar::<_, String>("SELECT name FROM users_roles WHERE id = ?1")
        .bind(payload.role_id)
        .fetch_optional(&state.pool)
        .await?;
    let is_admin = role.as_deref() == Some("admin");

    tracing::info!(user_id, email = %payload.email, "User registered");

    let token = generate_token(
        user_id,
        is_admin,
        &state.config.jwt.secret,
        state.config.jwt.expiration_seconds(),
    )?;
    Ok(Json(TokenOut::bearer(token)))
}

/// POST /auth/login - email/password to bearer token
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginIn>,
) -> AppResult<Json<TokenOut>> {
    let user = sqlx::query_as::<_, CredentialRow>(
        "SELECT users.id, users.password_hash, users_roles.name AS role
         FROM users
         JOIN users_roles ON users_roles.id = users.role_id
         WHERE users.email = ?1",
    )
    .bind(&payload.email)
    .fetch_optional(&state.pool)
    .await?;

    let invalid = || AppError::BadRequest("Invalid credentials".to_string());

    let user = user.ok_or_else(invalid)?;
    let hash = user.password_hash.as_deref().ok_or_else(invalid)?;
    if !verify_password(&payload.password, hash)? {
        tracing::warn!(email = %payload.email, "Failed login attempt");
        return Err(invalid());
    }

    let token = generate_token(
        user.id,
        user.role == "admin",
        &state.config.jwt.secret,
        state.config.jwt.expiration_seconds(),
    )?;
    Ok(Json(TokenOut::bearer(token)))
}

/// POST /auth/change-password - verify the current password, set a new one
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<ChangePasswordIn>,
) -> AppResult<Json<Value>> {
    payload.validate()?;

    let hash = sqlx::query_scalar::<_, Option<String>>(
        "SELECT password_hash FROM users WHERE id = ?1",
    )
    .bind(current.id)
    .fetch_one(&state.pool)
    .await?;

    let valid = match hash.as_deref() {
        Some(hash) => verify_password(&payload.current_password, hash)?,
        None => false,
    };
    if !valid {
        return Err(AppError::BadRequest("Invalid current password".to_string()));
    }

    let new_hash = hash_password(&payload.new_password)?;
    sqlx::query("UPDATE users SET password_hash = ?1 WHERE id = ?2")
        .bind(&new_hash)
        .bind(current.id)
        .execute(&state.pool)
        .await?;

    tracing::info!(user_id = current.id, "Password changed");

    Ok(Json(json!({"status": "password_changed"})))
}
