//! Helper workbooks built from scratch.
//!
//! Two small operator-facing files accompany a run when needed:
//!
//! - `column_names.xlsx` — the expected English header row, written when the
//!   export was validated with foreign column names so the operator can copy
//!   the correct labels into their export.
//! - `no_tasks.xlsx` — entries that carry no task name and were therefore
//!   excluded from the Stundenaufstellung; exported on request so the
//!   operator can fix the source data and re-run.

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::Workbook;
use std::path::Path;
use zeitbericht_core::TimeEntry;

use crate::ReportError;

/// Write a single-row workbook carrying the expected header names.
pub fn write_column_names(path: &Path, columns: &[&str]) -> Result<(), ReportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in columns.iter().enumerate() {
        sheet
            .write(0, col as u16, *name)
            .map_err(|e| write_error(path, e))?;
    }
    workbook.save(path).map_err(|e| write_error(path, e))?;
    Ok(())
}

/// Export entries without a task name: header row plus one row per entry.
pub fn write_no_tasks(
    path: &Path,
    columns: &[&str],
    entries: &[TimeEntry],
) -> Result<(), ReportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in columns.iter().enumerate() {
        sheet
            .write(0, col as u16, *name)
            .map_err(|e| write_error(path, e))?;
    }

    for (i, entry) in entries.iter().enumerate() {
        let row = (i + 1) as u32;
        let date = entry.date.format("%Y-%m-%d").to_string();
        let fields: [&str; 10] = [
            &date,
            &entry.first_name,
            &entry.last_name,
            &entry.email,
            &entry.client_name,
            &entry.client_code,
            &entry.project_name,
            &entry.project_code,
            entry.task_name.as_deref().unwrap_or(""),
            entry.task_code.as_deref().unwrap_or(""),
        ];
        for (col, value) in fields.iter().enumerate() {
            sheet
                .write(row, col as u16, *value)
                .map_err(|e| write_error(path, e))?;
        }
        sheet
            .write(row, 10, entry.hours.to_f64().unwrap_or_default())
            .map_err(|e| write_error(path, e))?;
        sheet
            .write(row, 11, entry.comment.as_deref().unwrap_or(""))
            .map_err(|e| write_error(path, e))?;
    }

    workbook.save(path).map_err(|e| write_error(path, e))?;
    Ok(())
}

fn write_error(path: &Path, error: rust_xlsxwriter::XlsxError) -> ReportError {
    ReportError::WorkbookWrite {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    const COLUMNS: [&str; 12] = [
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
    ];

    #[test]
    fn column_names_workbook_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("column_names.xlsx");
        write_column_names(&path, &COLUMNS).unwrap();

        let book = umya_spreadsheet::reader::xlsx::read(&path).unwrap();
        let sheet = book.get_sheet(&0).unwrap();
        assert_eq!(sheet.get_value((1u32, 1u32)), "Entry Date");
        assert_eq!(sheet.get_value((12u32, 1u32)), "Comments");
    }

    #[test]
    fn no_tasks_workbook_lists_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_tasks.xlsx");

        let mut entry = TimeEntry::new(
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            "Max",
            "Mustermann",
            "ACME",
            "WBS-100",
            dec!(8),
        );
        entry.comment = Some("003 follow-up".to_string());
        write_no_tasks(&path, &COLUMNS, &[entry]).unwrap();

        let book = umya_spreadsheet::reader::xlsx::read(&path).unwrap();
        let sheet = book.get_sheet(&0).unwrap();
        assert_eq!(sheet.get_value((1u32, 2u32)), "2024-03-04");
        assert_eq!(sheet.get_value((5u32, 2u32)), "ACME");
        assert_eq!(sheet.get_value((11u32, 2u32)), "8");
        assert_eq!(sheet.get_value((12u32, 2u32)), "003 follow-up");
    }
}
