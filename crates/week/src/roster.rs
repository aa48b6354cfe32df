//! Pivot of weekly choice rows into per-class roster sheets.
//!
//! The export query left-joins every student of every real class against the
//! choices stored for one week. A student with no row for a weekday has made
//! no choice there; that is not the same as an empty choice, so the pivot
//! substitutes the weekday's fallback complex only for *absent* cells.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

/// Class id 1 is the seeded "unassigned" placeholder; its members never
/// appear in exports.
pub const UNASSIGNED_CLASS_ID: i64 = 1;

/// Excel refuses worksheet names longer than this.
pub const SHEET_NAME_MAX: usize = 31;

/// One reported weekday column. Ids follow the seeded `weekdays` table,
/// 1 = Monday .. 7 = Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekdaySlot {
    pub id: i64,
    pub label: &'static str,
}

const ALL_SLOTS: [WeekdaySlot; 7] = [
    WeekdaySlot { id: 1, label: "Mon" },
    WeekdaySlot { id: 2, label: "Tue" },
    WeekdaySlot { id: 3, label: "Wed" },
    WeekdaySlot { id: 4, label: "Thu" },
    WeekdaySlot { id: 5, label: "Fri" },
    WeekdaySlot { id: 6, label: "Sat" },
    WeekdaySlot { id: 7, label: "Sun" },
];

/// The weekday columns to report: Mon-Fri, or Mon-Sun for canteens that
/// serve on weekends.
pub fn weekday_slots(include_weekend: bool) -> &'static [WeekdaySlot] {
    if include_weekend {
        &ALL_SLOTS
    } else {
        &ALL_SLOTS[..5]
    }
}

/// One row of the class x user x choice left join. `weekday_id` and
/// `complex_name` are `None` when the user has no stored choice matched by
/// this row.
#[derive(Debug, Clone)]
pub struct ChoiceRow {
    pub class_id: i64,
    pub class_number: Option<i64>,
    pub class_letter: Option<String>,
    pub user_id: i64,
    pub lastname: Option<String>,
    pub name: Option<String>,
    pub patronymic: String,
    pub weekday_id: Option<i64>,
    pub complex_name: Option<String>,
}

/// One spreadsheet row: a student and one resolved cell per weekday slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterUser {
    pub user_id: i64,
    pub lastname: String,
    pub name: String,
    pub patronymic: String,
    /// Complex names in slot order; empty string when nothing is offered.
    pub cells: Vec<String>,
}

/// One worksheet: a class and its students.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSheet {
    pub class_id: i64,
    pub title: String,
    pub users: Vec<RosterUser>,
}

/// The full pivoted export for one week.
#[derive(Debug, Clone)]
pub struct WeekRoster {
    pub week_start: NaiveDate,
    pub slots: Vec<WeekdaySlot>,
    pub sheets: Vec<ClassSheet>,
}

/// Reduce `(weekday_id, complex_name)` offer rows, ordered by
/// `(weekday_id, complex_id)`, to the first non-closed complex per weekday.
pub fn first_offer_fallbacks(rows: Vec<(i64, String)>) -> BTreeMap<i64, String> {
    let mut fallbacks = BTreeMap::new();
    for (weekday_id, name) in rows {
        fallbacks.entry(weekday_id).or_insert(name);
    }
    fallbacks
}

/// Worksheet names: at most 31 characters, with the characters Excel
/// forbids replaced. Brackets become parentheses, the rest become dashes.
pub fn sanitize_sheet_name(title: &str) -> String {
    title
        .chars()
        .take(SHEET_NAME_MAX)
        .map(|c| match c {
            '/' | '\\' | '*' | ':' => '-',
            '[' => '(',
            ']' => ')',
            _ => c,
        })
        .collect()
}

struct UserAcc {
    lastname: String,
    name: String,
    patronymic: String,
    choices: BTreeMap<i64, String>,
}

/// Pivot the joined rows into per-class sheets.
///
/// For every user and every slot the reported cell is the user's explicit
/// choice if one exists, otherwise the slot's fallback, otherwise empty.
/// Users are sorted by (lastname, name, id), classes by id.
pub fn build_roster(
    week_start: NaiveDate,
    slots: &[WeekdaySlot],
    rows: Vec<ChoiceRow>,
    fallbacks: &BTreeMap<i64, String>,
) -> WeekRoster {
    let mut classes: BTreeMap<i64, (String, BTreeMap<i64, UserAcc>)> = BTreeMap::new();

    for row in rows {
        if row.class_id == UNASSIGNED_CLASS_ID {
            continue;
        }
        let title = class_title(row.class_id, row.class_number, row.class_letter.as_deref());
        let (_, users) = classes.entry(row.class_id).or_insert_with(|| (title, BTreeMap::new()));
        let user = users.entry(row.user_id).or_insert_with(|| UserAcc {
            lastname: row.lastname.unwrap_or_default(),
            name: row.name.unwrap_or_default(),
            patronymic: row.patronymic,
            choices: BTreeMap::new(),
        });
        if let Some(weekday_id) = row.weekday_id {
            user.choices
                .insert(weekday_id, row.complex_name.unwrap_or_default());
        }
    }

    let sheets = classes
        .into_iter()
        .map(|(class_id, (title, users))| {
            let mut users: Vec<RosterUser> = users
                .into_iter()
                .map(|(user_id, acc)| {
                    let cells = slots
                        .iter()
                        .map(|slot| {
                            match acc.choices.get(&slot.id).filter(|name| !name.is_empty()) {
                                Some(name) => name.clone(),
                                None => fallbacks.get(&slot.id).cloned().unwrap_or_default(),
                            }
                        })
                        .collect();
                    RosterUser {
                        user_id,
                        lastname: acc.lastname,
                        name: acc.name,
                        patronymic: acc.patronymic,
                        cells,
                    }
                })
                .collect();
            users.sort_by(|a, b| {
                (&a.lastname, &a.name, a.user_id).cmp(&(&b.lastname, &b.name, b.user_id))
            });
            ClassSheet {
                class_id,
                title,
                users,
            }
        })
        .collect();

    WeekRoster {
        week_start,
        slots: slots.to_vec(),
        sheets,
    }
}

fn class_title(class_id: i64, number: Option<i64>, letter: Option<&str>) -> String {
    let number = number.map(|n| n.to_string()).unwrap_or_default();
    let title = format!("{}{}", number, letter.unwrap_or("").trim());
    if title.trim().is_empty() {
        format!("class_{class_id}")
    } else {
        title.trim().to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
    }

    fn row(
        class_id: i64,
        user_id: i64,
        lastname: &str,
        weekday_id: Option<i64>,
        complex_name: Option<&str>,
    ) -> ChoiceRow {
        ChoiceRow {
            class_id,
            class_number: Some(5),
            class_letter: Some("A".to_owned()),
            user_id,
            lastname: Some(lastname.to_owned()),
            name: Some("Ivan".to_owned()),
            patronymic: "Ivanovich".to_owned(),
            weekday_id,
            complex_name: complex_name.map(str::to_owned),
        }
    }

    fn fallbacks() -> BTreeMap<i64, String> {
        first_offer_fallbacks(vec![
            (1, "Standard".to_owned()),
            (1, "Vegetarian".to_owned()),
            (2, "Standard".to_owned()),
        ])
    }

    #[test]
    fn first_offer_per_weekday_wins() {
        let fallbacks = fallbacks();
        assert_eq!(fallbacks.get(&1).map(String::as_str), Some("Standard"));
        assert_eq!(fallbacks.get(&2).map(String::as_str), Some("Standard"));
        assert_eq!(fallbacks.get(&3), None);
    }

    #[test]
    fn no_choices_means_fallback_everywhere() {
        let roster = build_roster(
            week(),
            weekday_slots(false),
            vec![row(2, 10, "Petrov", None, None)],
            &fallbacks(),
        );
        assert_eq!(roster.sheets.len(), 1);
        let user = &roster.sheets[0].users[0];
        // Mon and Tue have a fallback, Wed-Fri have no non-closed offer.
        assert_eq!(user.cells, vec!["Standard", "Standard", "", "", ""]);
    }

    #[test]
    fn explicit_choice_beats_fallback() {
        let rows = vec![
            row(2, 10, "Petrov", Some(1), Some("Vegetarian")),
            row(2, 10, "Petrov", Some(2), Some("Fish")),
        ];
        let roster = build_roster(week(), weekday_slots(false), rows, &fallbacks());
        let user = &roster.sheets[0].users[0];
        assert_eq!(user.cells[0], "Vegetarian");
        assert_eq!(user.cells[1], "Fish");
    }

    #[test]
    fn users_sorted_by_lastname_name_id() {
        let rows = vec![
            row(2, 30, "Sidorov", None, None),
            row(2, 10, "Petrov", None, None),
            row(2, 20, "Petrov", None, None),
        ];
        let roster = build_roster(week(), weekday_slots(false), rows, &BTreeMap::new());
        let ids: Vec<i64> = roster.sheets[0].users.iter().map(|u| u.user_id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[test]
    fn unassigned_class_is_skipped() {
        let roster = build_roster(
            week(),
            weekday_slots(false),
            vec![row(UNASSIGNED_CLASS_ID, 10, "Petrov", None, None)],
            &BTreeMap::new(),
        );
        assert!(roster.sheets.is_empty());
    }

    #[test]
    fn weekend_slots_are_opt_in() {
        assert_eq!(weekday_slots(false).len(), 5);
        assert_eq!(weekday_slots(true).len(), 7);
        assert_eq!(weekday_slots(true)[6].label, "Sun");
    }

    #[test]
    fn class_title_falls_back_to_id() {
        assert_eq!(class_title(7, Some(5), Some("A")), "5A");
        assert_eq!(class_title(7, Some(11), Some("  ")), "11");
        assert_eq!(class_title(7, None, None), "class_7");
    }

    #[test]
    fn sheet_names_are_truncated_and_cleaned() {
        let long = "x".repeat(60);
        assert_eq!(sanitize_sheet_name(&long).chars().count(), SHEET_NAME_MAX);

        let cleaned = sanitize_sheet_name("5/A \\ 6*B [x]: y");
        assert_eq!(cleaned, "5-A - 6-B (x)- y");
        for forbidden in ['/', '\\', '*', '[', ']', ':'] {
            assert!(!cleaned.contains(forbidden));
        }
    }
}
