//! Weekday reference listing

use axum::{Json, extract::State};
use serde::Serialize;
use sqlx::prelude::FromRow;

use crate::error::AppResult;
use crate::routes::AppState;

#[derive(Debug, Serialize, FromRow)]
pub struct WeekdayOut {
    pub id: i64,
    pub name: String,
}

/// GET /weekdays - seeded Monday..Sunday rows, for id/name mapping
pub async fn list_weekdays(State(state): State<AppState>) -> AppResult<Json<Vec<WeekdayOut>>> {
    let weekdays = sqlx::query_as::<_, WeekdayOut>("SELECT id, name FROM weekdays ORDER BY id")
        .fetch_all(&state.pool)
        .await?;
    Ok(Json(weekdays))
}
