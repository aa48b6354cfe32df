//! User CRUD routes

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::prelude::FromRow;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::routes::AppState;

const USER_COLUMNS: &str = "id, name, lastname, patronymic, age, class_id, phone_number, email,
     created_at, avatar_url, user_rate, role_id, is_complex";

#[derive(Debug, Serialize, FromRow)]
pub struct UserOut {
    pub id: i64,
    pub name: Option<String>,
    pub lastname: Option<String>,
    pub patronymic: String,
    pub age: i64,
    pub class_id: i64,
    pub phone_number: String,
    pub email: String,
    pub created_at: NaiveDate,
    pub avatar_url: String,
    pub user_rate: i64,
    pub role_id: i64,
    pub is_complex: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UserCreate {
    pub name: Option<String>,
    pub lastname: Option<String>,
    pub patronymic: String,
    pub age: i64,
    pub class_id: i64,
    pub phone_number: String,
    #[validate(email)]
    pub email: String,
    pub created_at: NaiveDate,
    pub avatar_url: String,
    pub user_rate: i64,
    pub role_id: i64,
    pub is_complex: bool,
}

/// Absent fields keep their stored value; email is not updatable.
#[derive(Debug, Deserialize, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub lastname: Option<String>,
    pub patronymic: Option<String>,
    pub age: Option<i64>,
    pub class_id: Option<i64>,
    pub phone_number: Option<String>,
    pub avatar_url: Option<String>,
    pub user_rate: Option<i64>,
    pub role_id: Option<i64>,
    pub is_complex: Option<bool>,
}

pub(crate) async fn fetch_user(state: &AppState, user_id: i64) -> AppResult<UserOut> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
    sqlx::query_as::<_, UserOut>(&query)
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::NotFound("User not found"))
}

/// POST /users (admin)
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<UserOut>> {
    payload.validate()?;

    let query = format!(
        "INSERT INTO users
            (name, lastname, patronymic, age, class_id, phone_number, email,
             created_at, avatar_url, user_rate, role_id, is_complex)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
         RETURNING {USER_COLUMNS}"
    );
    let user = sqlx::query_as::<_, UserOut>(&query)
        .bind(&payload.name)
        .bind(&payload.lastname)
        .bind(&payload.patronymic)
        .bind(payload.age)
        .bind(payload.class_id)
        .bind(&payload.phone_number)
        .bind(&payload.email)
        .bind(payload.created_at)
        .bind(&payload.avatar_url)
        .bind(payload.user_rate)
        .bind(payload.role_id)
        .bind(payload.is_complex)
        .fetch_one(&state.pool)
        .await?;

    Ok(Json(user))
}

/// GET /users/{user_id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<UserOut>> {
    Ok(Json(fetch_user(&state, user_id).await?))
}

/// GET /users (admin)
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserOut>>> {
    let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
    let users = sqlx::query_as::<_, UserOut>(&query)
        .fetch_all(&state.pool)
        .await?;
    Ok(Json(users))
}

/// PUT /users/{user_id} - allowed for the user themselves or an admin
pub async fn update_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<UserOut>> {
    if !current.is_admin() && current.id != user_id {
        return Err(AppError::Forbidden("Forbidden"));
    }

    let user = fetch_user(&state, user_id).await?;

    let query = format!(
        "UPDATE users
         SET name = ?1, lastname = ?2, patronymic = ?3, age = ?4, class_id = ?5,
             phone_number = ?6, avatar_url = ?7, user_rate = ?8, role_id = ?9,
             is_complex = ?10
         WHERE id = ?11
         RETURNING {USER_COLUMNS}"
    );
    let user = sqlx::query_as::<_, UserOut>(&query)
        .bind(payload.name.or(user.name))
        .bind(payload.lastname.or(user.lastname))
        .bind(payload.patronymic.unwrap_or(user.patronymic))
        .bind(payload.age.unwrap_or(user.age))
        .bind(payload.class_id.unwrap_or(user.class_id))
        .bind(payload.phone_number.unwrap_or(user.phone_number))
        .bind(payload.avatar_url.unwrap_or(user.avatar_url))
        .bind(payload.user_rate.unwrap_or(user.user_rate))
        .bind(payload.role_id.unwrap_or(user.role_id))
        .bind(payload.is_complex.unwrap_or(user.is_complex))
        .bind(user_id)
        .fetch_one(&state.pool)
        .await?;

    Ok(Json(user))
}

/// DELETE /users/{user_id} (admin)
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Value>> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?1")
        .bind(user_id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found"));
    }
    Ok(Json(json!({"status": "deleted"})))
}
