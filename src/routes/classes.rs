//! Class CRUD and class-membership routes

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::prelude::FromRow;

use crate::error::{AppError, AppResult};
use crate::routes::AppState;

#[derive(Debug, Serialize, FromRow)]
pub struct ClassOut {
    pub id: i64,
    pub number: Option<i64>,
    pub letter: Option<String>,
    pub year: i64,
    pub is_active: bool,
    pub class_rate: i64,
}

#[derive(Debug, Deserialize)]
pub struct ClassCreate {
    pub number: Option<i64>,
    pub letter: Option<String>,
    pub year: i64,
    pub is_active: bool,
    pub class_rate: i64,
}

#[derive(Debug, Deserialize, Default)]
pub struct ClassUpdate {
    pub number: Option<i64>,
    pub letter: Option<String>,
    pub year: Option<i64>,
    pub is_active: Option<bool>,
    pub class_rate: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ClassAddStudentsIn {
    pub user_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveStudentParams {
    pub to_class_id: Option<i64>,
}

async fn fetch_class(state: &AppState, class_id: i64) -> AppResult<ClassOut> {
    sqlx::query_as::<_, ClassOut>(
        "SELECT id, number, letter, year, is_active, class_rate FROM classes WHERE id = ?1",
    )
    .bind(class_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::NotFound("Class not found"))
}

/// POST /classes (admin)
pub async fn create_class(
    State(state): State<AppState>,
    Json(payload): Json<ClassCreate>,
) -> AppResult<Json<ClassOut>> {
    let class = sqlx::query_as::<_, ClassOut>(
        "INSERT INTO classes (number, letter, year, is_active, class_rate)
         VALUES (?1, ?2, ?3, ?4, ?5)
         RETURNING id, number, letter, year, is_active, class_rate",
    )
    .bind(payload.number)
    .bind(&payload.letter)
    .bind(payload.year)
    .bind(payload.is_active)
    .bind(payload.class_rate)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(class))
}

/// GET /classes/{class_id}
pub async fn get_class(
    State(state): State<AppState>,
    Path(class_id): Path<i64>,
) -> AppResult<Json<ClassOut>> {
    Ok(Json(fetch_class(&state, class_id).await?))
}

/// GET /classes
pub async fn list_classes(State(state): State<AppState>) -> AppResult<Json<Vec<ClassOut>>> {
    let classes = sqlx::query_as::<_, ClassOut>(
        "SELECT id, number, letter, year, is_active, class_rate FROM classes ORDER BY id",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(classes))
}

/// PUT /classes/{class_id} (admin)
pub async fn update_class(
    State(state): State<AppState>,
    Path(class_id): Path<i64>,
    Json(payload): Json<ClassUpdate>,
) -> AppResult<Json<ClassOut>> {
    let class = fetch_class(&state, class_id).await?;

    let class = sqlx::query_as::<_, ClassOut>(
        "UPDATE classes
         SET number = ?1, letter = ?2, year = ?3, is_active = ?4, class_rate = ?5
         WHERE id = ?6
         RETURNING id, number, letter, year, is_active, class_rate",
    )
    .bind(payload.number.or(class.number))
    .bind(payload.letter.or(class.letter))
    .bind(payload.year.unwrap_or(class.year))
    .bind(payload.is_active.unwrap_or(class.is_active))
    .bind(payload.class_rate.unwrap_or(class.class_rate))
    .bind(class_id)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(class))
}

/// DELETE /classes/{class_id} (admin)
pub async fn delete_class(
    State(state): State<AppState>,
    Path(class_id): Path<i64>,
) -> AppResult<Json<Value>> {
    let result = sqlx::query("DELETE FROM classes WHERE id = ?1")
        .bind(class_id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Class not found"));
    }
    Ok(Json(json!({"status": "deleted"})))
}

/// POST /classes/{class_id}/students (admin) - assign the listed users
pub async fn add_students(
    State(state): State<AppState>,
    Path(class_id): Path<i64>,
    Json(payload): Json<ClassAddStudentsIn>,
) -> AppResult<Json<Value>> {
    fetch_class(&state, class_id).await?;

    let mut tx = state.pool.begin().await?;
    let mut count = 0u64;
    for user_id in &payload.user_ids {
        let result = sqlx::query("UPDATE users SET class_id = ?1 WHERE id = ?2")
            .bind(class_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        count += result.rows_affected();
    }
    tx.commit().await?;

    Ok(Json(json!({"status": "added", "count": count})))
}

/// DELETE /classes/{class_id}/students/{user_id} (admin)
///
/// `class_id` is NOT NULL, so removing a student means moving them; the
/// target class comes from `?to_class_id=`.
pub async fn remove_student(
    State(state): State<AppState>,
    Path((class_id, user_id)): Path<(i64, i64)>,
    Query(params): Query<RemoveStudentParams>,
) -> AppResult<Json<Value>> {
    fetch_class(&state, class_id).await?;

    let current_class = sqlx::query_scalar::<_, i64>("SELECT class_id FROM users WHERE id = ?1")
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::NotFound("User not found"))?;

    if current_class != class_id {
        return Err(AppError::BadRequest("User is not in this class".to_string()));
    }

    let Some(to_class_id) = params.to_class_id else {
        return Err(AppError::BadRequest(
            "to_class_id is required to reassign student".to_string(),
        ));
    };

    sqlx::query_scalar::<_, i64>("SELECT id FROM classes WHERE id = ?1")
        .bind(to_class_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::NotFound("Target class not found"))?;

    sqlx::query("UPDATE users SET class_id = ?1 WHERE id = ?2")
        .bind(to_class_id)
        .bind(user_id)
        .execute(&state.pool)
        .await?;

    Ok(Json(json!({
        "status": "moved",
        "user_id": user_id,
        "from": class_id,
        "to": to_class_id,
    })))
}
