//! # zeitbericht-core
//!
//! Core domain model and aggregation logic for the zeitbericht report
//! generator.
//!
//! This crate provides:
//! - Domain types: [`TimeEntry`], [`CodeTable`], grouping passes
//! - Activity code resolution ([`resolve`])
//! - Calendar expansion and per-date aggregation ([`aggregate`])
//! - Task merging with per-client alias rules ([`merge`])
//! - Declarative run configuration ([`config`])
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//! use zeitbericht_core::{group_by, TimeEntry};
//!
//! let entries = vec![
//!     TimeEntry::new(
//!         NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
//!         "Max",
//!         "Mustermann",
//!         "ACME",
//!         "P-100",
//!         Decimal::new(8, 0),
//!     ),
//! ];
//! let by_client = group_by(entries, |e| e.client_name.clone());
//! assert_eq!(by_client.len(), 1);
//! ```

pub mod aggregate;
pub mod config;
pub mod merge;
pub mod resolve;

pub use config::{CellRef, CellRefs, ClientConfig, Config, ConfigError, HeaderCells, ReportKind};
pub use resolve::{resolve, CodeTable, MISSING_COMMENT};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Time Entry
// ============================================================================

/// One row of the Replicon timesheet export. Immutable once loaded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    /// Calendar date the hours were booked on
    pub date: NaiveDate,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub client_name: String,
    pub client_code: String,
    pub project_name: String,
    /// WBS code grouping entries by project
    pub project_code: String,
    /// Task name; blank in the export becomes `None` and is tracked separately
    pub task_name: Option<String>,
    pub task_code: Option<String>,
    /// Hours worked, non-negative
    pub hours: Decimal,
    /// Free-text comment, resolved against the activity code table
    pub comment: Option<String>,
}

impl TimeEntry {
    /// Create a minimal entry; the remaining fields default to empty.
    pub fn new(
        date: NaiveDate,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        client_name: impl Into<String>,
        project_code: impl Into<String>,
        hours: Decimal,
    ) -> Self {
        Self {
            date,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: String::new(),
            client_name: client_name.into(),
            client_code: String::new(),
            project_name: String::new(),
            project_code: project_code.into(),
            task_name: None,
            task_code: None,
            hours,
            comment: None,
        }
    }

    pub fn task(mut self, name: impl Into<String>) -> Self {
        self.task_name = Some(name.into());
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// "First Last", as used for grade lookups and sheet names
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// ============================================================================
// Grouping passes
// ============================================================================

/// Group entries by an ordered key. The nested client → project →
/// period/task passes are all expressed through this single helper.
pub fn group_by<K, F>(entries: Vec<TimeEntry>, key: F) -> BTreeMap<K, Vec<TimeEntry>>
where
    K: Ord,
    F: Fn(&TimeEntry) -> K,
{
    let mut groups: BTreeMap<K, Vec<TimeEntry>> = BTreeMap::new();
    for entry in entries {
        groups.entry(key(&entry)).or_default().push(entry);
    }
    groups
}

// ============================================================================
// German calendar formatting
// ============================================================================

/// German month names, indexed by `month0`
pub const MONTH_NAMES: [&str; 12] = [
    "Januar",
    "Februar",
    "März",
    "April",
    "Mai",
    "Juni",
    "Juli",
    "August",
    "September",
    "Oktober",
    "November",
    "Dezember",
];

/// German weekday abbreviations, Monday first
pub const WEEKDAY_ABBREV: [&str; 7] = ["Mo", "Di", "Mi", "Do", "Fr", "Sa", "So"];

/// Format a date the way the client templates expect it: `dd.mm.yyyy`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// German name of a month (1-based)
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[(month as usize - 1) % 12]
}

/// German weekday abbreviation for a date
pub fn weekday_abbrev(date: NaiveDate) -> &'static str {
    WEEKDAY_ABBREV[date.weekday().num_days_from_monday() as usize]
}

/// "Monat Jahr" label for report headers, e.g. "März 2024"
pub fn report_month_label(year: i32, month: u32) -> String {
    format!("{} {}", month_name(month), year)
}

// ============================================================================
// Tests
// ============================================================================
