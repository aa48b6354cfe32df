//! Weekly-choice domain logic for the canteen backend.
//!
//! Everything weekly in the system is keyed by a *week start*: the Monday
//! date of the calendar week a choice or export applies to. This crate owns
//! the Monday arithmetic, the precedence rules for picking which week an
//! export targets, and the pivot that turns choice rows into per-class
//! roster sheets. It performs no I/O; the web layer feeds it rows and
//! renders the result.

pub mod calendar;
pub mod roster;

pub use calendar::{WeekModeError, WeekSelector, current_monday, last_week_monday, next_monday};
pub use roster::{
    ChoiceRow, ClassSheet, RosterUser, UNASSIGNED_CLASS_ID, WeekRoster, WeekdaySlot,
    build_roster, first_offer_fallbacks, sanitize_sheet_name, weekday_slots,
};
