//! Order CRUD routes

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::prelude::FromRow;

use crate::error::{AppError, AppResult};
use crate::routes::AppState;

#[derive(Debug, Serialize, FromRow)]
pub struct OrderOut {
    pub id: i64,
    pub order_name: String,
    pub user_id: i64,
    pub product_id: i64,
    pub created_at: NaiveDateTime,
    pub status_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct OrderCreate {
    pub order_name: String,
    pub user_id: i64,
    pub product_id: i64,
    pub created_at: NaiveDateTime,
    pub status_id: i64,
}

#[derive(Debug, Deserialize, Default)]
pub struct OrderUpdate {
    pub order_name: Option<String>,
    pub status_id: Option<i64>,
}

async fn fetch_order(state: &AppState, order_id: i64) -> AppResult<OrderOut> {
    sqlx::query_as::<_, OrderOut>(
        "SELECT id, order_name, user_id, product_id, created_at, status_id
         FROM orders WHERE id = ?1",
    )
    .bind(order_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::NotFound("Order not found"))
}

/// POST /orders (admin)
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<OrderOut>> {
    let order = sqlx::query_as::<_, OrderOut>(
        "INSERT INTO orders (order_name, user_id, product_id, created_at, status_id)
         VALUES (?1, ?2, ?3, ?4, ?5)
         RETURNING id, order_name, user_id, product_id, created_at, status_id",
    )
    .bind(&payload.order_name)
    .bind(payload.user_id)
    .bind(payload.product_id)
    .bind(payload.created_at)
    .bind(payload.status_id)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(order))
}

/// GET /orders
pub async fn list_orders(State(state): State<AppState>) -> AppResult<Json<Vec<OrderOut>>> {
    let orders = sqlx::query_as::<_, OrderOut>(
        "SELECT id, order_name, user_id, product_id, created_at, status_id
         FROM orders ORDER BY id",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(orders))
}

/// GET /orders/{order_id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
) -> AppResult<Json<OrderOut>> {
    Ok(Json(fetch_order(&state, order_id).await?))
}

/// PUT /orders/{order_id} (admin)
pub async fn update_order(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
    Json(payload): Json<OrderUpdate>,
) -> AppResult<Json<OrderOut>> {
    let order = fetch_order(&state, order_id).await?;

    let order = sqlx::query_as::<_, OrderOut>(
        "UPDATE orders SET order_name = ?1, status_id = ?2 WHERE id = ?3
         RETURNING id, order_name, user_id, product_id, created_at, status_id",
    )
    .bind(payload.order_name.unwrap_or(order.order_name))
    .bind(payload.status_id.unwrap_or(order.status_id))
    .bind(order_id)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(order))
}

/// DELETE /orders/{order_id} (admin)
pub async fn delete_order(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
) -> AppResult<Json<Value>> {
    let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
        .bind(order_id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Order not found"));
    }
    Ok(Json(json!({"status": "deleted"})))
}
