//! Per-date aggregation for the monthly per-employee reports.
//!
//! The Leistungsnachweis lists every calendar day of the month, whether or
//! not hours were booked. [`expand_calendar`] produces that scaffold;
//! [`hours_by_date`] and [`comments_by_date`] fill in the booked days.

use crate::resolve::{resolve, CodeTable};
use crate::{format_date, weekday_abbrev, TimeEntry};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// One scaffold row of the monthly report: weekday abbreviation and
/// formatted date.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub weekday: &'static str,
    pub formatted: String,
}

/// Every day of the given month in calendar order, paired with its German
/// weekday abbreviation and `dd.mm.yyyy` rendering.
pub fn expand_calendar(year: i32, month: u32) -> Vec<CalendarDay> {
    let mut days = Vec::new();
    let mut day = 1;
    while let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
        days.push(CalendarDay {
            date,
            weekday: weekday_abbrev(date),
            formatted: format_date(date),
        });
        day += 1;
    }
    days
}

/// Sum hours per date across all entries of a group. An employee booking
/// multiple times on the same date is folded into one total.
pub fn hours_by_date(entries: &[TimeEntry]) -> BTreeMap<NaiveDate, Decimal> {
    let mut hours: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for entry in entries {
        *hours.entry(entry.date).or_insert(Decimal::ZERO) += entry.hours;
    }
    hours
}

/// Resolve comments per date. Entries without a usable comment are skipped;
/// when two entries of the same date both carry one, the later entry
/// replaces the earlier unless its resolved string is strictly shorter.
/// That tie-break mirrors long-standing behavior and carries no business
/// meaning beyond "keep the more descriptive text".
pub fn comments_by_date(entries: &[TimeEntry], table: &CodeTable) -> BTreeMap<NaiveDate, String> {
    let mut comments: BTreeMap<NaiveDate, String> = BTreeMap::new();
    for entry in entries {
        let raw = match entry.comment.as_deref() {
            Some(c) if !c.trim().is_empty() => c,
            _ => continue,
        };
        let resolved = resolve(Some(raw), table);
        if resolved.trim().is_empty() {
            continue;
        }
        comments
            .entry(entry.date)
            .and_modify(|existing| {
                if resolved.len() >= existing.len() {
                    *existing = resolved.clone();
                }
            })
            .or_insert(resolved);
    }
    comments
}
