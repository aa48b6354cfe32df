//! Workbook rendering for the weekly choice export.

use std::collections::HashSet;

use canteen_week::{WeekRoster, roster::SHEET_NAME_MAX, sanitize_sheet_name};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const IDENTITY_HEADERS: [&str; 3] = ["Lastname", "Firstname", "Patronymic"];

/// Render one worksheet per class, identity columns followed by one column
/// per weekday slot. A roster with no qualifying classes still yields a
/// single explanatory sheet so the download is never an empty workbook.
pub fn render_workbook(roster: &WeekRoster) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();

    if roster.sheets.is_empty() {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("No data")?;
        worksheet.write_string(0, 0, "No choices recorded for week")?;
        worksheet.write_string(0, 1, roster.week_start.to_string())?;
        return workbook.save_to_buffer();
    }

    let header_format = Format::new().set_bold();
    let mut used_names: HashSet<String> = HashSet::new();

    for sheet in &roster.sheets {
        let worksheet = workbook.add_worksheet();

        let mut name = sanitize_sheet_name(&sheet.title);
        if !used_names.insert(name.clone()) {
            // Two classes can share a display title; the class id makes the
            // worksheet name unique.
            let tag = format!("_{}", sheet.class_id);
            let keep = SHEET_NAME_MAX.saturating_sub(tag.chars().count());
            name = format!("{}{}", name.chars().take(keep).collect::<String>(), tag);
            used_names.insert(name.clone());
        }
        worksheet.set_name(&name)?;

        for (col, header) in IDENTITY_HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
        }
        for (offset, slot) in roster.slots.iter().enumerate() {
            let col = (IDENTITY_HEADERS.len() + offset) as u16;
            worksheet.write_string_with_format(0, col, slot.label, &header_format)?;
        }

        for col in 0..IDENTITY_HEADERS.len() as u16 {
            worksheet.set_column_width(col, 20)?;
        }
        for offset in 0..roster.slots.len() {
            worksheet.set_column_width((IDENTITY_HEADERS.len() + offset) as u16, 18)?;
        }

        for (idx, user) in sheet.users.iter().enumerate() {
            let row = (idx + 1) as u32;
            worksheet.write_string(row, 0, &user.lastname)?;
            worksheet.write_string(row, 1, &user.name)?;
            worksheet.write_string(row, 2, &user.patronymic)?;
            for (offset, cell) in user.cells.iter().enumerate() {
                worksheet.write_string(row, (IDENTITY_HEADERS.len() + offset) as u16, cell)?;
            }
        }
    }

    workbook.save_to_buffer()
}
