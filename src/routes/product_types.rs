//! Product type reference CRUD

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::prelude::FromRow;

use crate::error::{AppError, AppResult};
use crate::routes::AppState;

#[derive(Debug, Serialize, FromRow)]
pub struct ProductTypeOut {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ProductTypeIn {
    pub name: String,
}

/// GET /product-types
pub async fn list_product_types(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProductTypeOut>>> {
    let types = sqlx::query_as::<_, ProductTypeOut>(
        "SELECT id, name FROM product_types ORDER BY id",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(types))
}

/// GET /product-types/{product_type_id}
pub async fn get_product_type(
    State(state): State<AppState>,
    Path(product_type_id): Path<i64>,
) -> AppResult<Json<ProductTypeOut>> {
    let product_type =
        sqlx::query_as::<_, ProductTypeOut>("SELECT id, name FROM product_types WHERE id = ?1")
            .bind(product_type_id)
            .fetch_optional(&state.pool)
            .await?
            .ok_or(AppError::NotFound("Product type not found"))?;
    Ok(Json(product_type))
}

/// POST /product-types (admin)
pub async fn create_product_type(
    State(state): State<AppState>,
    Json(payload): Json<ProductTypeIn>,
) -> AppResult<Json<ProductTypeOut>> {
    let product_type = sqlx::query_as::<_, ProductTypeOut>(
        "INSERT INTO product_types (name) VALUES (?1) RETURNING id, name",
    )
    .bind(&payload.name)
    .fetch_one(&state.pool)
    .await?;
    Ok(Json(product_type))
}

/// PUT /product-types/{product_type_id} (admin)
pub async fn update_product_type(
    State(state): State<AppState>,
    Path(product_type_id): Path<i64>,
    Json(payload): Json<ProductTypeIn>,
) -> AppResult<Json<ProductTypeOut>> {
    let product_type = sqlx::query_as::<_, ProductTypeOut>(
        "UPDATE product_types SET name = ?1 WHERE id = ?2 RETURNING id, name",
    )
    .bind(&payload.name)
    .bind(product_type_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::NotFound("Product type not found"))?;
    Ok(Json(product_type))
}

/// DELETE /product-types/{product_type_id} (admin)
pub async fn delete_product_type(
    State(state): State<AppState>,
    Path(product_type_id): Path<i64>,
) -> AppResult<Json<Value>> {
    let result = sqlx::query("DELETE FROM product_types WHERE id = ?1")
        .bind(product_type_id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Product type not found"));
    }
    Ok(Json(json!({"status": "deleted"})))
}
