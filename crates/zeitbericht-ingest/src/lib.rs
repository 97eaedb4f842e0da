//! # zeitbericht-ingest
//!
//! Reading and validation of the Replicon timesheet export.
//!
//! The export is one worksheet with a fixed English header row, one row per
//! time entry, and a trailing summary row. This crate turns that sheet into
//! [`TimeEntry`] values:
//!
//! - the header row must carry the expected English column names, exactly;
//! - the trailing summary row is discarded;
//! - `< None >` placeholder cells become missing values;
//! - rows without a Client Name are dropped (and counted);
//! - rows with a blank Task Name are kept — the task merge reports them
//!   separately;
//! - numeric comment cells are normalized to their integer string form so
//!   the zero-pad code coercion applies downstream.

use calamine::{open_workbook, Data, Reader, Xlsx, XlsxError};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use zeitbericht_core::TimeEntry;

/// Marker in the export file name used for auto-discovery
pub const EXPORT_NAME_MARKER: &str = "Timesheet Hours";

/// Every column of a well-formed export, in order
pub const EXPECTED_COLUMNS: [&str; 20] = [
    "Entry Date",
    "First Name",
    "Last Name",
    "Email",
    "Client Name",
    "Client Code",
    "Project Name",
    "Project Code",
    "Task Name",
    "Task Code",
    "Hours",
    "Comments",
    "Supervisor Name (Current)",
    "Time Off Type",
    "Work Type (AUT)",
    "Work Type (DEU)",
    "Work Type (CHE)",
    "Work Location",
    "Time Entry Approval Status",
    "Timesheet Approval Status",
];

/// Columns the core actually transforms; the header must carry at least
/// these, in this order. The approval/work-type metadata behind them is
/// never interpreted and not carried past ingestion.
pub const REQUIRED_COLUMNS: usize = 12;

/// Ingest error
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("cannot open export file {}: {message}", path.display())]
    Open { path: PathBuf, message: String },

    #[error("export file has no worksheets")]
    NoWorksheet,

    #[error(
        "export column names do not match the expected English headers \
         (found: {found:?}); re-export with English labels or rename the columns"
    )]
    HeaderMismatch { found: Vec<String> },

    #[error("export row {row}: invalid {column} cell: {message}")]
    InvalidCell {
        row: usize,
        column: &'static str,
        message: String,
    },

    #[error("no export matching '{EXPORT_NAME_MARKER}' found in {}", dir.display())]
    NoExportFound { dir: PathBuf },

    #[error("multiple exports found in {}: {candidates:?}; pass one explicitly", dir.display())]
    AmbiguousExports {
        dir: PathBuf,
        candidates: Vec<PathBuf>,
    },
}

/// Read and validate a Replicon export.
///
/// Returns the entries in file order. Rows without a Client Name are
/// dropped; blank Task Names survive as `None`.
pub fn read_export(path: &Path) -> Result<Vec<TimeEntry>, IngestError> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e: XlsxError| IngestError::Open {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(IngestError::NoWorksheet)?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| IngestError::Open {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let rows: Vec<_> = range.rows().collect();
    let Some((header, data_rows)) = rows.split_first() else {
        return Err(IngestError::HeaderMismatch { found: Vec::new() });
    };
    validate_header(header)?;

    // The export always ends with a summary row; drop it.
    let data_rows = &data_rows[..data_rows.len().saturating_sub(1)];

    let mut entries = Vec::with_capacity(data_rows.len());
    let mut dropped = 0usize;
    for (i, row) in data_rows.iter().enumerate() {
        // 1-based sheet row, behind the header
        let sheet_row = i + 2;
        let Some(client_name) = cell_string(row.get(4)) else {
            dropped += 1;
            continue;
        };

        entries.push(TimeEntry {
            date: cell_date(row.first(), sheet_row)?,
            first_name: cell_string(row.get(1)).unwrap_or_default(),
            last_name: cell_string(row.get(2)).unwrap_or_default(),
            email: cell_string(row.get(3)).unwrap_or_default(),
            client_name,
            client_code: cell_string(row.get(5)).unwrap_or_default(),
            project_name: cell_string(row.get(6)).unwrap_or_default(),
            project_code: cell_string(row.get(7)).unwrap_or_default(),
            task_name: cell_string(row.get(8)),
            task_code: cell_string(row.get(9)),
            hours: cell_hours(row.get(10), sheet_row)?,
            comment: cell_string(row.get(11)),
        });
    }

    if dropped > 0 {
        warn!(dropped, "dropped rows without a client name");
    }
    debug!(entries = entries.len(), path = %path.display(), "export loaded");
    Ok(entries)
}

/// Find the one export in a directory by its naming convention. Zero or
/// several matches are errors listing what was (not) found.
pub fn discover_export(dir: &Path) -> Result<PathBuf, IngestError> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| IngestError::Open {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.extension().and_then(|e| e.to_str()) == Some("xlsx")
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.contains(EXPORT_NAME_MARKER))
        })
        .collect();
    candidates.sort();

    match candidates.len() {
        0 => Err(IngestError::NoExportFound {
            dir: dir.to_path_buf(),
        }),
        1 => Ok(candidates.remove(0)),
        _ => Err(IngestError::AmbiguousExports {
            dir: dir.to_path_buf(),
            candidates,
        }),
    }
}

fn validate_header(header: &[Data]) -> Result<(), IngestError> {
    let found: Vec<String> = header
        .iter()
        .take(REQUIRED_COLUMNS)
        .map(|c| c.to_string())
        .collect();
    let expected = &EXPECTED_COLUMNS[..REQUIRED_COLUMNS];
    if found.len() != expected.len() || found.iter().map(String::as_str).ne(expected.iter().copied())
    {
        return Err(IngestError::HeaderMismatch { found });
    }
    Ok(())
}

/// A trimmed cell string, with empty cells and the `< None >` placeholder
/// mapped to `None`. Integral numeric cells become their integer string
/// form ("5", not "5.0") so comment codes survive numeric typing.
fn cell_string(cell: Option<&Data>) -> Option<String> {
    let text = match cell? {
        Data::Empty => return None,
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Int(i) => i.to_string(),
        other => other.to_string().trim().to_string(),
    };
    if text.is_empty() || text == "< None >" {
        None
    } else {
        Some(text)
    }
}

fn cell_date(cell: Option<&Data>, row: usize) -> Result<NaiveDate, IngestError> {
    let invalid = |message: String| IngestError::InvalidCell {
        row,
        column: "Entry Date",
        message,
    };

    match cell {
        Some(Data::DateTime(dt)) => dt
            .as_datetime()
            .map(|dt| dt.date())
            .ok_or_else(|| invalid("not a calendar date".to_string())),
        Some(Data::DateTimeIso(s)) => NaiveDate::parse_from_str(&s[..10.min(s.len())], "%Y-%m-%d")
            .map_err(|e| invalid(e.to_string())),
        Some(Data::String(s)) => {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| invalid(e.to_string()))
        }
        other => Err(invalid(format!("unexpected cell {other:?}"))),
    }
}

fn cell_hours(cell: Option<&Data>, row: usize) -> Result<Decimal, IngestError> {
    let invalid = |message: String| IngestError::InvalidCell {
        row,
        column: "Hours",
        message,
    };

    match cell {
        Some(Data::Float(f)) => Decimal::try_from(*f).map_err(|e| invalid(e.to_string())),
        Some(Data::Int(i)) => Ok(Decimal::from(*i)),
        Some(Data::String(s)) => s.trim().parse().map_err(|e: rust_decimal::Error| {
            invalid(e.to_string())
        }),
        other => Err(invalid(format!("unexpected cell {other:?}"))),
    }
}
