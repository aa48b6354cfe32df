//! Complex CRUD, weekly offering views and per-user weekly choices
//!
//! A complex is a named meal bundle assembled from products and offered on
//! specific weekdays. Closing a complex retires it from every weekly view
//! while keeping it for history.

use std::collections::BTreeMap;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use canteen_week::{current_monday, next_monday};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::prelude::FromRow;

use super::products::ProductOut;
use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::routes::AppState;

#[derive(Debug, Serialize, FromRow)]
pub struct ComplexRow {
    pub id: i64,
    pub name: String,
    pub creation_date: NaiveDate,
    pub is_closed: bool,
}

#[derive(Debug, Serialize)]
pub struct ComplexOut {
    pub id: i64,
    pub name: String,
    pub creation_date: NaiveDate,
    pub is_closed: bool,
    pub products: Vec<ProductOut>,
    pub weekday_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ComplexCreate {
    pub name: String,
    pub creation_date: NaiveDate,
    #[serde(default)]
    pub is_closed: bool,
    #[serde(default)]
    pub product_ids: Vec<i64>,
    #[serde(default)]
    pub weekday_ids: Vec<i64>,
}

/// Absent association lists leave the associations untouched; present ones
/// replace them wholesale.
#[derive(Debug, Deserialize, Default)]
pub struct ComplexUpdate {
    pub name: Option<String>,
    pub creation_date: Option<NaiveDate>,
    pub is_closed: Option<bool>,
    pub product_ids: Option<Vec<i64>>,
    pub weekday_ids: Option<Vec<i64>>,
}

#[derive(Debug, Deserialize)]
pub struct CloseParams {
    pub is_closed: bool,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ChoiceItem {
    pub weekday_id: i64,
    pub complex_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ChoicesSetIn {
    pub items: Vec<ChoiceItem>,
}

async fn fetch_complex_row(state: &AppState, complex_id: i64) -> AppResult<ComplexRow> {
    sqlx::query_as::<_, ComplexRow>(
        "SELECT id, name, creation_date, is_closed FROM complexes WHERE id = ?1",
    )
    .bind(complex_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::NotFound("Complex not found"))
}

async fn fetch_complex_out(state: &AppState, complex_id: i64) -> AppResult<ComplexOut> {
    let row = fetch_complex_row(state, complex_id).await?;

    let products = sqlx::query_as::<_, ProductOut>(
        "SELECT products.id, products.name, products.blc, products.mass, products.rate,
                products.picture_url, products.price, products.compound,
                products.is_hidden, products.is_complex, products.product_type_id
         FROM complex_products
         JOIN products ON products.id = complex_products.product_id
         WHERE complex_products.complex_id = ?1
         ORDER BY products.id",
    )
    .bind(complex_id)
    .fetch_all(&state.pool)
    .await?;

    let weekday_ids = sqlx::query_scalar::<_, i64>(
        "SELECT weekday_id FROM complex_weekdays WHERE complex_id = ?1 ORDER BY weekday_id",
    )
    .bind(complex_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(ComplexOut {
        id: row.id,
        name: row.name,
        creation_date: row.creation_date,
        is_closed: row.is_closed,
        products,
        weekday_ids,
    })
}

/// POST /complexes (admin) - create with product and weekday associations
pub async fn create_complex(
    State(state): State<AppState>,
    Json(payload): Json<ComplexCreate>,
) -> AppResult<Json<ComplexOut>> {
    let mut tx = state.pool.begin().await?;

    let complex_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO complexes (name, creation_date, is_closed) VALUES (?1, ?2, ?3) RETURNING id",
    )
    .bind(&payload.name)
    .bind(payload.creation_date)
    .bind(payload.is_closed)
    .fetch_one(&mut *tx)
    .await?;

    for product_id in &payload.product_ids {
        sqlx::query("INSERT INTO complex_products (complex_id, product_id) VALUES (?1, ?2)")
            .bind(complex_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
    }
    for weekday_id in &payload.weekday_ids {
        sqlx::query("INSERT INTO complex_weekdays (complex_id, weekday_id) VALUES (?1, ?2)")
            .bind(complex_id)
            .bind(weekday_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    Ok(Json(fetch_complex_out(&state, complex_id).await?))
}

/// GET /complexes/{complex_id}
pub async fn get_complex(
    State(state): State<AppState>,
    Path(complex_id): Path<i64>,
) -> AppResult<Json<ComplexOut>> {
    Ok(Json(fetch_complex_out(&state, complex_id).await?))
}

/// PUT /complexes/{complex_id} (admin)
pub async fn update_complex(
    State(state): State<AppState>,
    Path(complex_id): Path<i64>,
    Json(payload): Json<ComplexUpdate>,
) -> AppResult<Json<ComplexOut>> {
    let row = fetch_complex_row(&state, complex_id).await?;

    let mut tx = state.pool.begin().await?;

    sqlx::query("UPDATE complexes SET name = ?1, creation_date = ?2, is_closed = ?3 WHERE id = ?4")
        .bind(payload.name.unwrap_or(row.name))
        .bind(payload.creation_date.unwrap_or(row.creation_date))
        .bind(payload.is_closed.unwrap_or(row.is_closed))
        .bind(complex_id)
        .execute(&mut *tx)
        .await?;

    if let Some(product_ids) = &payload.product_ids {
        sqlx::query("DELETE FROM complex_products WHERE complex_id = ?1")
            .bind(complex_id)
            .execute(&mut *tx)
            .await?;
        for product_id in product_ids {
            sqlx::query("INSERT INTO complex_products (complex_id, product_id) VALUES (?1, ?2)")
                .bind(complex_id)
                .bind(product_id)
                .execute(&mut *tx)
                .await?;
        }
    }

    if let Some(weekday_ids) = &payload.weekday_ids {
        sqlx::query("DELETE FROM complex_weekdays WHERE complex_id = ?1")
            .bind(complex_id)
            .execute(&mut *tx)
            .await?;
        for weekday_id in weekday_ids {
            sqlx::query("INSERT INTO complex_weekdays (complex_id, weekday_id) VALUES (?1, ?2)")
                .bind(complex_id)
                .bind(weekday_id)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;

    Ok(Json(fetch_complex_out(&state, complex_id).await?))
}

/// DELETE /complexes/{complex_id} (admin)
pub async fn delete_complex(
    State(state): State<AppState>,
    Path(complex_id): Path<i64>,
) -> AppResult<Json<Value>> {
    let result = sqlx::query("DELETE FROM complexes WHERE id = ?1")
        .bind(complex_id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Complex not found"));
    }
    Ok(Json(json!({"status": "deleted"})))
}

/// PATCH /complexes/{complex_id}/close?is_closed= (admin)
pub async fn set_complex_closed(
    State(state): State<AppState>,
    Path(complex_id): Path<i64>,
    Query(params): Query<CloseParams>,
) -> AppResult<Json<Value>> {
    let result = sqlx::query("UPDATE complexes SET is_closed = ?1 WHERE id = ?2")
        .bind(params.is_closed)
        .bind(complex_id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Complex not found"));
    }

    tracing::info!(complex_id, is_closed = params.is_closed, "Complex lifecycle changed");

    Ok(Json(json!({"id": complex_id, "is_closed": params.is_closed})))
}

#[derive(Debug, FromRow)]
struct OfferingRow {
    weekday_id: i64,
    #[sqlx(flatten)]
    complex: ComplexRow,
}

/// Non-closed complexes grouped by weekday id. Offerings are not week-scoped,
/// so the current and next week views share this query.
async fn weekday_offerings(state: &AppState) -> AppResult<BTreeMap<i64, Vec<ComplexRow>>> {
    let rows = sqlx::query_as::<_, OfferingRow>(
        "SELECT complex_weekdays.weekday_id,
                complexes.id, complexes.name, complexes.creation_date, complexes.is_closed
         FROM complex_weekdays
         JOIN complexes ON complexes.id = complex_weekdays.complex_id
         WHERE NOT complexes.is_closed
         ORDER BY complex_weekdays.weekday_id, complexes.id",
    )
    .fetch_all(&state.pool)
    .await?;

    let mut grouped: BTreeMap<i64, Vec<ComplexRow>> = BTreeMap::new();
    for row in rows {
        grouped.entry(row.weekday_id).or_default().push(row.complex);
    }
    Ok(grouped)
}

/// GET /complexes/week/current
pub async fn current_week_complexes(
    State(state): State<AppState>,
) -> AppResult<Json<BTreeMap<i64, Vec<ComplexRow>>>> {
    Ok(Json(weekday_offerings(&state).await?))
}

/// GET /complexes/week/next
pub async fn next_week_complexes(
    State(state): State<AppState>,
) -> AppResult<Json<BTreeMap<i64, Vec<ComplexRow>>>> {
    Ok(Json(weekday_offerings(&state).await?))
}

/// POST /complexes/week/next/choices - replace the caller's choices for next
/// week
pub async fn set_next_week_choices(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<ChoicesSetIn>,
) -> AppResult<Json<Value>> {
    let week_start = next_monday(Local::now().date_naive());

    let mut tx = state.pool.begin().await?;

    sqlx::query("DELETE FROM user_complex_choices WHERE user_id = ?1 AND week_start = ?2")
        .bind(current.id)
        .bind(week_start)
        .execute(&mut *tx)
        .await?;

    for item in &payload.items {
        let weekday = sqlx::query_scalar::<_, i64>("SELECT id FROM weekdays WHERE id = ?1")
            .bind(item.weekday_id)
            .fetch_optional(&mut *tx)
            .await?;
        let complex = sqlx::query_scalar::<_, i64>("SELECT id FROM complexes WHERE id = ?1")
            .bind(item.complex_id)
            .fetch_optional(&mut *tx)
            .await?;
        if weekday.is_none() || complex.is_none() {
            return Err(AppError::BadRequest("Invalid weekday or complex".to_string()));
        }

        sqlx::query(
            "INSERT INTO user_complex_choices (user_id, weekday_id, week_start, complex_id)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(current.id)
        .bind(item.weekday_id)
        .bind(week_start)
        .bind(item.complex_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        user_id = current.id,
        %week_start,
        count = payload.items.len(),
        "Weekly choices saved"
    );

    Ok(Json(json!({"status": "saved", "week_start": week_start.to_string()})))
}

async fn week_choices(
    state: &AppState,
    user_id: i64,
    week_start: NaiveDate,
) -> AppResult<Json<Value>> {
    let items = sqlx::query_as::<_, ChoiceItem>(
        "SELECT weekday_id, complex_id FROM user_complex_choices
         WHERE user_id = ?1 AND week_start = ?2
         ORDER BY weekday_id",
    )
    .bind(user_id)
    .bind(week_start)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(json!({
        "week_start": week_start.to_string(),
        "items": items,
    })))
}

/// GET /complexes/week/next/choices
pub async fn next_week_choices(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<Value>> {
    let week_start = next_monday(Local::now().date_naive());
    week_choices(&state, current.id, week_start).await
}

/// GET /complexes/week/current/choices
pub async fn current_week_choices(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<Value>> {
    let week_start = current_monday(Local::now().date_naive());
    week_choices(&state, current.id, week_start).await
}
