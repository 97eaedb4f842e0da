//! The two report writers.
//!
//! Every client gets exactly one of two output shapes, selected once per run
//! from the configuration:
//!
//! - [`MonthlyReport`] — the Leistungsnachweis: one sheet per employee, one
//!   row per calendar day of the month, hours and resolved comments on the
//!   days that were booked.
//! - [`TaskReport`] — the Stundenaufstellung: one pre-existing sheet per
//!   task, one row per entry, plus the task total on the overview sheet.
//!
//! Writers only append or overwrite cells; they never read back previously
//! written state. Filling the same group into a freshly cloned sheet twice
//! therefore produces identical contents.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;
use umya_spreadsheet::{Spreadsheet, Worksheet};
use zeitbericht_core::aggregate::{comments_by_date, expand_calendar, hours_by_date};
use zeitbericht_core::{
    format_date, report_month_label, resolve, CellRefs, CodeTable, HeaderCells, TimeEntry,
};

use crate::ReportError;

/// A report unit ready to be written into a workbook. Closed set: one
/// variant per output shape.
pub enum Report<'a> {
    Monthly(MonthlyReport<'a>),
    Task(TaskReport<'a>),
}

impl Report<'_> {
    /// Write worksheet and header block into the workbook. The target
    /// sheets must already exist (created and layout-cloned for the monthly
    /// report, part of the template for the task report).
    pub fn fill(
        &self,
        book: &mut Spreadsheet,
        table: &CodeTable,
        today: NaiveDate,
    ) -> Result<(), ReportError> {
        match self {
            Report::Monthly(report) => {
                let sheet = book
                    .get_sheet_by_name_mut(&report.employee_name)
                    .ok_or_else(|| ReportError::MissingSheet {
                        sheet: report.employee_name.clone(),
                        unit: report.unit.clone(),
                    })?;
                report.fill_worksheet(sheet, table)?;
                report.fill_header(sheet, today)
            }
            Report::Task(report) => {
                let sheet = book
                    .get_sheet_by_name_mut(&report.task_name)
                    .ok_or_else(|| ReportError::MissingSheet {
                        sheet: report.task_name.clone(),
                        unit: report.unit.clone(),
                    })?;
                report.fill_worksheet(sheet, table)?;

                let total_cell =
                    report
                        .total_cell
                        .as_deref()
                        .ok_or_else(|| ReportError::MissingTotalCell {
                            task: report.task_name.clone(),
                            unit: report.unit.clone(),
                        })?;
                let overview = book
                    .get_sheet_by_name_mut(&report.overview_sheet)
                    .ok_or_else(|| ReportError::MissingSheet {
                        sheet: report.overview_sheet.clone(),
                        unit: report.unit.clone(),
                    })?;
                report.fill_header(overview, total_cell);
                Ok(())
            }
        }
    }
}

// ============================================================================
// Monthly report (Leistungsnachweis)
// ============================================================================

/// Per-employee monthly proof-of-work sheet
pub struct MonthlyReport<'a> {
    pub employee_name: String,
    pub project_name: String,
    pub year: i32,
    pub month: u32,
    pub entries: &'a [TimeEntry],
    pub cells: &'a CellRefs,
    pub header: &'a HeaderCells,
    /// Human-readable unit context for error messages
    pub unit: String,
}

impl MonthlyReport<'_> {
    /// Write weekday and date for every calendar day of the month, and
    /// hours/comment on the days present in the aggregated maps.
    pub fn fill_worksheet(
        &self,
        sheet: &mut Worksheet,
        table: &CodeTable,
    ) -> Result<(), ReportError> {
        let weekday = self.cells.weekday.ok_or(ReportError::MissingCellRef {
            field: "weekday",
            unit: self.unit.clone(),
        })?;

        let days = expand_calendar(self.year, self.month);
        let hours = hours_by_date(self.entries);
        let comments = comments_by_date(self.entries, table);

        for (i, day) in days.iter().enumerate() {
            let offset = i as u32;
            sheet
                .get_cell_mut((weekday.col, weekday.row + offset))
                .set_value_string(day.weekday);
            sheet
                .get_cell_mut((self.cells.date.col, self.cells.date.row + offset))
                .set_value_string(day.formatted.clone());

            if let Some(total) = hours.get(&day.date) {
                sheet
                    .get_cell_mut((self.cells.hours.col, self.cells.hours.row + offset))
                    .set_value_number(total.to_f64().unwrap_or_default());
            }
            if let Some(comment) = comments.get(&day.date) {
                sheet
                    .get_cell_mut((self.cells.comment.col, self.cells.comment.row + offset))
                    .set_value_string(comment.clone());
            }
        }
        Ok(())
    }

    /// Write employee, project, "Monat Jahr" label and today's date into the
    /// named header cells.
    pub fn fill_header(&self, sheet: &mut Worksheet, today: NaiveDate) -> Result<(), ReportError> {
        let address = |field: &'static str, value: &Option<String>| {
            value.clone().ok_or(ReportError::MissingCellRef {
                field,
                unit: self.unit.clone(),
            })
        };

        let employee = address("employee", &self.header.employee)?;
        let project = address("project", &self.header.project)?;
        let month = address("month", &self.header.month)?;
        let date = address("date", &self.header.date)?;

        sheet
            .get_cell_mut(employee.as_str())
            .set_value_string(self.employee_name.clone());
        sheet
            .get_cell_mut(project.as_str())
            .set_value_string(self.project_name.clone());
        sheet
            .get_cell_mut(month.as_str())
            .set_value_string(report_month_label(self.year, self.month));
        sheet
            .get_cell_mut(date.as_str())
            .set_value_string(format_date(today));
        Ok(())
    }
}

// ============================================================================
// Task report (Stundenaufstellung)
// ============================================================================

/// Per-task hour breakdown sheet
pub struct TaskReport<'a> {
    pub task_name: String,
    /// Date-sorted entries of this task bucket
    pub entries: &'a [TimeEntry],
    /// Employee full name → billing grade
    pub grades: &'a HashMap<String, String>,
    pub cells: &'a CellRefs,
    /// Name of the summary sheet carrying the task totals
    pub overview_sheet: String,
    /// A1 address of this task's total on the overview sheet
    pub total_cell: Option<String>,
    /// Human-readable unit context for error messages
    pub unit: String,
}

impl TaskReport<'_> {
    /// Sum of the bucket's hours
    pub fn total_hours(&self) -> Decimal {
        self.entries.iter().map(|e| e.hours).sum()
    }

    /// Clear all data rows below the header row, then append one row per
    /// entry: grade, date, hours, resolved comment. A grade lookup miss is
    /// an error, not a silent default.
    pub fn fill_worksheet(
        &self,
        sheet: &mut Worksheet,
        table: &CodeTable,
    ) -> Result<(), ReportError> {
        let grade_ref = self.cells.grade.ok_or(ReportError::MissingCellRef {
            field: "grade",
            unit: self.unit.clone(),
        })?;
        let first_row = self.cells.date.row;

        // Stale rows from the template (or a previous run) must not shine
        // through under a shorter entry list.
        let stale: Vec<(u32, u32)> = sheet
            .get_cell_collection()
            .iter()
            .map(|c| {
                let coordinate = c.get_coordinate();
                (*coordinate.get_col_num(), *coordinate.get_row_num())
            })
            .filter(|(_, row)| *row >= first_row)
            .collect();
        if !stale.is_empty() {
            debug!(cells = stale.len(), unit = %self.unit, "clearing stale data rows");
        }
        for (col, row) in stale {
            sheet.get_cell_mut((col, row)).set_value_string("");
        }

        for (i, entry) in self.entries.iter().enumerate() {
            let offset = i as u32;
            let name = entry.full_name();
            let grade = self
                .grades
                .get(&name)
                .ok_or_else(|| ReportError::GradeNotFound {
                    employee: name.clone(),
                    unit: self.unit.clone(),
                })?;

            let comment = entry
                .comment
                .as_deref()
                .filter(|c| !c.trim().is_empty());

            sheet
                .get_cell_mut((grade_ref.col, grade_ref.row + offset))
                .set_value_string(grade.clone());
            sheet
                .get_cell_mut((self.cells.date.col, self.cells.date.row + offset))
                .set_value_string(format_date(entry.date));
            sheet
                .get_cell_mut((self.cells.hours.col, self.cells.hours.row + offset))
                .set_value_number(entry.hours.to_f64().unwrap_or_default());
            sheet
                .get_cell_mut((self.cells.comment.col, self.cells.comment.row + offset))
                .set_value_string(resolve(comment, table));
        }
        Ok(())
    }

    /// Write the task total into its named cell on the overview sheet.
    pub fn fill_header(&self, overview: &mut Worksheet, total_cell: &str) {
        overview
            .get_cell_mut(total_cell)
            .set_value_number(self.total_hours().to_f64().unwrap_or_default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use zeitbericht_core::{CellRef, HeaderCells};

    fn table() -> CodeTable {
        CodeTable::new([("003".to_string(), "Planning".to_string())], [])
    }

    fn cells() -> CellRefs {
        CellRefs {
            weekday: Some(CellRef { row: 12, col: 4 }),
            date: CellRef { row: 12, col: 5 },
            hours: CellRef { row: 12, col: 7 },
            comment: CellRef { row: 12, col: 14 },
            grade: Some(CellRef { row: 12, col: 2 }),
        }
    }

    fn header() -> HeaderCells {
        HeaderCells {
            employee: Some("G3".to_string()),
            project: Some("G5".to_string()),
            month: Some("G7".to_string()),
            date: Some("G8".to_string()),
        }
    }

    fn entry(date: &str, hours: Decimal, comment: Option<&str>) -> TimeEntry {
        let mut e = TimeEntry::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            "Max",
            "Mustermann",
            "ACME",
            "WBS-100",
            hours,
        );
        e.comment = comment.map(str::to_string);
        e
    }

    fn monthly<'a>(
        entries: &'a [TimeEntry],
        cells: &'a CellRefs,
        header: &'a HeaderCells,
    ) -> MonthlyReport<'a> {
        MonthlyReport {
            employee_name: "Max Mustermann".to_string(),
            project_name: "Projekt X".to_string(),
            year: 2024,
            month: 3,
            entries,
            cells,
            header,
            unit: "client ACME, WBS-100, März 2024".to_string(),
        }
    }

    #[test]
    fn monthly_report_fills_calendar_hours_and_comments() {
        let entries = vec![
            entry("2024-03-04", dec!(4), Some("003 follow-up")),
            entry("2024-03-04", dec!(2), Some("meeting notes")),
        ];
        let (cells, header) = (cells(), header());
        let report = monthly(&entries, &cells, &header);

        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();
        report.fill_worksheet(sheet, &table()).unwrap();

        // 2024-03-01 lands on the anchor row, 2024-03-04 three rows below
        assert_eq!(sheet.get_value((4u32, 12u32)), "Fr");
        assert_eq!(sheet.get_value((5u32, 12u32)), "01.03.2024");
        assert_eq!(sheet.get_value((5u32, 15u32)), "04.03.2024");
        assert_eq!(sheet.get_value((7u32, 15u32)), "6");
        assert_eq!(sheet.get_value((14u32, 15u32)), "meeting notes");
        // unbooked day stays empty
        assert_eq!(sheet.get_value((7u32, 12u32)), "");
        // 31 days → last row is anchor + 30
        assert_eq!(sheet.get_value((5u32, 42u32)), "31.03.2024");
    }

    #[test]
    fn monthly_header_writes_named_cells() {
        let entries: Vec<TimeEntry> = Vec::new();
        let (cells, header) = (cells(), header());
        let report = monthly(&entries, &cells, &header);

        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
        report.fill_header(sheet, today).unwrap();

        assert_eq!(sheet.get_value("G3"), "Max Mustermann");
        assert_eq!(sheet.get_value("G5"), "Projekt X");
        assert_eq!(sheet.get_value("G7"), "März 2024");
        assert_eq!(sheet.get_value("G8"), "02.04.2024");
    }

    #[test]
    fn monthly_header_missing_cell_is_an_error() {
        let entries: Vec<TimeEntry> = Vec::new();
        let cells = cells();
        let header = HeaderCells::default();
        let report = monthly(&entries, &cells, &header);

        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();
        let err = report
            .fill_header(sheet, NaiveDate::from_ymd_opt(2024, 4, 2).unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            ReportError::MissingCellRef { field: "employee", .. }
        ));
    }

    #[test]
    fn monthly_fill_is_idempotent_on_fresh_sheets() {
        let entries = vec![entry("2024-03-04", dec!(4), Some("003 x"))];
        let (cells, header) = (cells(), header());
        let report = monthly(&entries, &cells, &header);

        let mut first = umya_spreadsheet::new_file();
        let mut second = umya_spreadsheet::new_file();
        report
            .fill_worksheet(first.get_sheet_mut(&0).unwrap(), &table())
            .unwrap();
        report
            .fill_worksheet(second.get_sheet_mut(&0).unwrap(), &table())
            .unwrap();

        let a = first.get_sheet(&0).unwrap();
        let b = second.get_sheet(&0).unwrap();
        for row in 12u32..=42 {
            for col in [4u32, 5, 7, 14] {
                assert_eq!(a.get_value((col, row)), b.get_value((col, row)));
            }
        }
    }

    fn grades() -> HashMap<String, String> {
        HashMap::from([("Max Mustermann".to_string(), "Senior".to_string())])
    }

    fn task_report<'a>(
        entries: &'a [TimeEntry],
        cells: &'a CellRefs,
        grades: &'a HashMap<String, String>,
    ) -> TaskReport<'a> {
        TaskReport {
            task_name: "Development".to_string(),
            entries,
            grades,
            cells,
            overview_sheet: "Uebersicht".to_string(),
            total_cell: Some("C4".to_string()),
            unit: "client Globex, WBS-200, task Development".to_string(),
        }
    }

    #[test]
    fn task_report_appends_rows_and_clears_stale_data() {
        let entries = vec![
            entry("2024-03-04", dec!(4), Some("003 follow-up")),
            entry("2024-03-05", dec!(2), None),
        ];
        let (cells, grades) = (cells(), grades());
        let report = task_report(&entries, &cells, &grades);

        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();
        // stale rows left over from the template
        sheet.get_cell_mut((2u32, 14u32)).set_value_string("OLD");
        sheet.get_cell_mut((5u32, 20u32)).set_value_string("OLD");

        report.fill_worksheet(sheet, &table()).unwrap();

        assert_eq!(sheet.get_value((2u32, 12u32)), "Senior");
        assert_eq!(sheet.get_value((5u32, 12u32)), "04.03.2024");
        assert_eq!(sheet.get_value((7u32, 12u32)), "4");
        assert_eq!(sheet.get_value((14u32, 12u32)), "Planning");
        // entry without comment gets the placeholder
        assert_eq!(sheet.get_value((14u32, 13u32)), "MISSING COMMENT");
        // stale cells were cleared
        assert_eq!(sheet.get_value((2u32, 14u32)), "");
        assert_eq!(sheet.get_value((5u32, 20u32)), "");
    }

    #[test]
    fn task_report_grade_miss_is_fatal_with_context() {
        let entries = vec![entry("2024-03-04", dec!(4), None)];
        let cells = cells();
        let grades = HashMap::new();
        let report = task_report(&entries, &cells, &grades);

        let mut book = umya_spreadsheet::new_file();
        let err = report
            .fill_worksheet(book.get_sheet_mut(&0).unwrap(), &table())
            .unwrap_err();
        match err {
            ReportError::GradeNotFound { employee, unit } => {
                assert_eq!(employee, "Max Mustermann");
                assert!(unit.contains("Development"));
            }
            other => panic!("expected GradeNotFound, got {other:?}"),
        }
    }

    #[test]
    fn task_report_total_lands_on_overview() {
        let entries = vec![
            entry("2024-03-04", dec!(4), None),
            entry("2024-03-05", dec!(2.5), None),
        ];
        let (cells, grades) = (cells(), grades());
        let report = task_report(&entries, &cells, &grades);
        assert_eq!(report.total_hours(), dec!(6.5));

        let mut book = umya_spreadsheet::new_file();
        let overview = book.get_sheet_mut(&0).unwrap();
        report.fill_header(overview, "C4");
        assert_eq!(overview.get_value("C4"), "6.5");
    }

    #[test]
    fn report_fill_missing_task_sheet_is_an_error() {
        let entries = vec![entry("2024-03-04", dec!(4), None)];
        let (cells, grades) = (cells(), grades());
        let report = Report::Task(task_report(&entries, &cells, &grades));

        let mut book = umya_spreadsheet::new_file();
        let err = report
            .fill(
                &mut book,
                &table(),
                NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            )
            .unwrap_err();
        assert!(matches!(err, ReportError::MissingSheet { .. }));
    }
}
