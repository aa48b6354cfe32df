//! Weekly choice export route

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use canteen_week::{
    ChoiceRow, UNASSIGNED_CLASS_ID, WeekSelector, build_roster, first_offer_fallbacks,
    weekday_slots,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use sqlx::prelude::FromRow;

use crate::error::AppResult;
use crate::export::{XLSX_CONTENT_TYPE, render_workbook};
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    /// Named mode: last | current | next | latest (default).
    pub week: Option<String>,
    /// Explicit week start; wins over `week` when both are given.
    pub week_start: Option<NaiveDate>,
}

#[derive(Debug, FromRow)]
struct ChoiceRecord {
    class_id: i64,
    class_number: Option<i64>,
    class_letter: Option<String>,
    user_id: i64,
    lastname: Option<String>,
    name: Option<String>,
    patronymic: String,
    weekday_id: Option<i64>,
    complex_name: Option<String>,
}

impl From<ChoiceRecord> for ChoiceRow {
    fn from(r: ChoiceRecord) -> Self {
        ChoiceRow {
            class_id: r.class_id,
            class_number: r.class_number,
            class_letter: r.class_letter,
            user_id: r.user_id,
            lastname: r.lastname,
            name: r.name,
            patronymic: r.patronymic,
            weekday_id: r.weekday_id,
            complex_name: r.complex_name,
        }
    }
}

/// GET /exports/choices/last-week.xlsx (admin)
///
/// One sheet per class, one row per student, one column per weekday slot.
/// Cells hold the student's explicit choice for the resolved week, else the
/// weekday's first non-closed complex, else nothing.
pub async fn export_week_choices(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> AppResult<Response> {
    let selector = WeekSelector::parse(params.week.as_deref(), params.week_start)?;

    let latest_in_data = sqlx::query_scalar::<_, NaiveDate>(
        "SELECT DISTINCT week_start FROM user_complex_choices
         ORDER BY week_start DESC LIMIT 1",
    )
    .fetch_optional(&state.pool)
    .await?;

    let week_start = selector.resolve(Local::now().date_naive(), latest_in_data);
    let slots = weekday_slots(state.config.export.include_weekend);
    let last_slot_id = slots.last().map(|slot| slot.id).unwrap_or(5);

    // First non-closed complex per weekday, substituted where a student made
    // no choice.
    let fallback_rows = sqlx::query_as::<_, (i64, String)>(
        "SELECT complex_weekdays.weekday_id, complexes.name
         FROM complex_weekdays
         JOIN complexes ON complexes.id = complex_weekdays.complex_id
         WHERE complex_weekdays.weekday_id <= ?1 AND NOT complexes.is_closed
         ORDER BY complex_weekdays.weekday_id, complexes.id",
    )
    .bind(last_slot_id)
    .fetch_all(&state.pool)
    .await?;
    let fallbacks = first_offer_fallbacks(fallback_rows);

    let records = sqlx::query_as::<_, ChoiceRecord>(
        "SELECT classes.id AS class_id, classes.number AS class_number,
                classes.letter AS class_letter,
                users.id AS user_id, users.lastname, users.name, users.patronymic,
                user_complex_choices.weekday_id, complexes.name AS complex_name
         FROM classes
         JOIN users ON users.class_id = classes.id
         LEFT JOIN user_complex_choices
             ON user_complex_choices.user_id = users.id
             AND user_complex_choices.week_start = ?1
             AND user_complex_choices.weekday_id <= ?2
         LEFT JOIN complexes ON complexes.id = user_complex_choices.complex_id
         WHERE classes.id != ?3
         ORDER BY classes.id, users.lastname, users.name, users.id",
    )
    .bind(week_start)
    .bind(last_slot_id)
    .bind(UNASSIGNED_CLASS_ID)
    .fetch_all(&state.pool)
    .await?;

    let rows: Vec<ChoiceRow> = records.into_iter().map(Into::into).collect();
    let roster = build_roster(week_start, slots, rows, &fallbacks);

    tracing::info!(
        %week_start,
        classes = roster.sheets.len(),
        "Rendering weekly choice export"
    );

    let bytes = render_workbook(&roster)?;
    let filename = format!("choices_{}.xlsx", week_start.format("%Y-%m-%d"));

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
