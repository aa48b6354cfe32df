//! Product CRUD routes

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::prelude::FromRow;

use crate::error::{AppError, AppResult};
use crate::routes::AppState;

const PRODUCT_COLUMNS: &str = "id, name, blc, mass, rate, picture_url, price, compound,
     is_hidden, is_complex, product_type_id";

#[derive(Debug, Serialize, FromRow)]
pub struct ProductOut {
    pub id: i64,
    pub name: String,
    /// Protein/fat/carbohydrate index carried over from the menu card.
    pub blc: i64,
    pub mass: i64,
    pub rate: i64,
    pub picture_url: String,
    pub price: f64,
    pub compound: String,
    pub is_hidden: bool,
    pub is_complex: bool,
    pub product_type_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub blc: i64,
    pub mass: i64,
    pub rate: i64,
    pub picture_url: String,
    pub price: f64,
    pub compound: String,
    pub is_hidden: bool,
    pub is_complex: bool,
    pub product_type_id: i64,
}

#[derive(Debug, Deserialize, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub blc: Option<i64>,
    pub mass: Option<i64>,
    pub rate: Option<i64>,
    pub picture_url: Option<String>,
    pub price: Option<f64>,
    pub compound: Option<String>,
    pub is_hidden: Option<bool>,
    pub is_complex: Option<bool>,
    pub product_type_id: Option<i64>,
}

async fn fetch_product(state: &AppState, product_id: i64) -> AppResult<ProductOut> {
    let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
    sqlx::query_as::<_, ProductOut>(&query)
        .bind(product_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::NotFound("Product not found"))
}

/// POST /products (admin)
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<ProductOut>> {
    let query = format!(
        "INSERT INTO products
            (name, blc, mass, rate, picture_url, price, compound, is_hidden,
             is_complex, product_type_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         RETURNING {PRODUCT_COLUMNS}"
    );
    let product = sqlx::query_as::<_, ProductOut>(&query)
        .bind(&payload.name)
        .bind(payload.blc)
        .bind(payload.mass)
        .bind(payload.rate)
        .bind(&payload.picture_url)
        .bind(payload.price)
        .bind(&payload.compound)
        .bind(payload.is_hidden)
        .bind(payload.is_complex)
        .bind(payload.product_type_id)
        .fetch_one(&state.pool)
        .await?;

    Ok(Json(product))
}

/// GET /products/{product_id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> AppResult<Json<ProductOut>> {
    Ok(Json(fetch_product(&state, product_id).await?))
}

/// GET /products
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<ProductOut>>> {
    let query = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id");
    let products = sqlx::query_as::<_, ProductOut>(&query)
        .fetch_all(&state.pool)
        .await?;
    Ok(Json(products))
}

/// PUT /products/{product_id} (admin)
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<ProductOut>> {
    let product = fetch_product(&state, product_id).await?;

    let query = format!(
        "UPDATE products
         SET name = ?1, blc = ?2, mass = ?3, rate = ?4, picture_url = ?5,
             price = ?6, compound = ?7, is_hidden = ?8, is_complex = ?9,
             product_type_id = ?10
         WHERE id = ?11
         RETURNING {PRODUCT_COLUMNS}"
    );
    let product = sqlx::query_as::<_, ProductOut>(&query)
        .bind(payload.name.unwrap_or(product.name))
        .bind(payload.blc.unwrap_or(product.blc))
        .bind(payload.mass.unwrap_or(product.mass))
        .bind(payload.rate.unwrap_or(product.rate))
        .bind(payload.picture_url.unwrap_or(product.picture_url))
        .bind(payload.price.unwrap_or(product.price))
        .bind(payload.compound.unwrap_or(product.compound))
        .bind(payload.is_hidden.unwrap_or(product.is_hidden))
        .bind(payload.is_complex.unwrap_or(product.is_complex))
        .bind(payload.product_type_id.unwrap_or(product.product_type_id))
        .bind(product_id)
        .fetch_one(&state.pool)
        .await?;

    Ok(Json(product))
}

/// DELETE /products/{product_id} (admin)
pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> AppResult<Json<Value>> {
    let result = sqlx::query("DELETE FROM products WHERE id = ?1")
        .bind(product_id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Product not found"));
    }
    Ok(Json(json!({"status": "deleted"})))
}
