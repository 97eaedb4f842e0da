//! # zeitbericht-render
//!
//! Output side of the report generator.
//!
//! This crate provides:
//! - Template layout cloning onto freshly created sheets ([`layout`])
//! - The two report writers, selected once per client ([`report`])
//! - Helper workbooks built from scratch ([`extras`])
//!
//! The template-based output goes through `umya-spreadsheet`, because the
//! client-approved templates must be reproduced byte-for-byte in look:
//! cell styles, column widths, row heights and merged regions all come from
//! the template file, never from code. The small helper workbooks
//! (`column_names.xlsx`, `no_tasks.xlsx`) carry no inherited layout and are
//! written with `rust_xlsxwriter`.

pub mod extras;
pub mod layout;
pub mod report;

pub use report::{MonthlyReport, Report, TaskReport};

use std::path::PathBuf;
use thiserror::Error;

/// Name of the layout sheet inside a monthly report template workbook
pub const TEMPLATE_SHEET: &str = "template";

/// Report generation error. Every variant carries a `unit` string naming
/// the client/period/employee/task it belongs to, so the operator can fix
/// the source data and re-run.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("workbook has no sheet '{sheet}' ({unit})")]
    MissingSheet { sheet: String, unit: String },

    #[error("no grade configured for employee '{employee}' ({unit})")]
    GradeNotFound { employee: String, unit: String },

    #[error("no '{field}' cell configured for this client ({unit})")]
    MissingCellRef { field: &'static str, unit: String },

    #[error("no overview total cell configured for task '{task}' ({unit})")]
    MissingTotalCell { task: String, unit: String },

    #[error("cannot read template workbook {}: {message}", path.display())]
    TemplateRead { path: PathBuf, message: String },

    #[error("cannot write workbook {}: {message}", path.display())]
    WorkbookWrite { path: PathBuf, message: String },

    #[error("workbook error ({unit}): {message}")]
    Workbook { unit: String, message: String },
}
