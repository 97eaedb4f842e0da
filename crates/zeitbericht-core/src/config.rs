//! Declarative run configuration.
//!
//! One TOML file supplies everything the report engine needs beyond the
//! export itself: the activity code table (ordered — the resolver scans in
//! declaration order), the raw-keep code set, the employee grade table, and
//! one section per client with its report kind, cell references and task
//! alias rules. The configuration is loaded once and passed into each
//! component explicitly; there is no process-global state.

use crate::resolve::CodeTable;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("client '{0}' is not declared in the config file")]
    UnknownClient(String),
}

/// Which of the two report shapes a client receives
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u8")]
pub enum ReportKind {
    /// Per-employee monthly proof-of-work report: one workbook per
    /// client/project/year/month, one sheet per employee
    Leistungsnachweis,
    /// Per-task hour breakdown: one workbook per client/project, one
    /// pre-existing sheet per task plus an overview sheet
    Stundenaufstellung,
}

impl TryFrom<u8> for ReportKind {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            1 => Ok(Self::Leistungsnachweis),
            2 => Ok(Self::Stundenaufstellung),
            other => Err(format!("unknown client kind {other}, expected 1 or 2")),
        }
    }
}

/// A named (row, column) anchor in the output sheet, 1-based as in Excel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

/// Column anchors for the data block of a report sheet. The monthly report
/// uses weekday/date/hours/comment; the task report uses
/// grade/date/hours/comment. All anchors share the first data row.
#[derive(Clone, Debug, Deserialize)]
pub struct CellRefs {
    #[serde(default)]
    pub weekday: Option<CellRef>,
    pub date: CellRef,
    pub hours: CellRef,
    pub comment: CellRef,
    #[serde(default)]
    pub grade: Option<CellRef>,
}

/// A1-style addresses of the header block cells
#[derive(Clone, Debug, Default, Deserialize)]
pub struct HeaderCells {
    #[serde(default)]
    pub employee: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// One activity code table row. The array order in the config file is the
/// resolver's scan order.
#[derive(Clone, Debug, Deserialize)]
pub struct Category {
    pub code: String,
    pub label: String,
}

/// Per-client report settings
#[derive(Clone, Debug, Deserialize)]
pub struct ClientConfig {
    /// Numeric client kind from the legacy config: 1 or 2
    pub kind: ReportKind,
    /// Task names embed a description after the code; group by the first
    /// whitespace token only
    #[serde(default)]
    pub long_task_names: bool,
    /// Raw task key → canonical bucket name
    #[serde(default)]
    pub task_aliases: BTreeMap<String, String>,
    /// Data block anchors within the template sheet
    pub cells: Option<CellRefs>,
    /// Header block addresses (monthly report)
    #[serde(default)]
    pub header_cells: HeaderCells,
    /// Task name → A1 address of its total cell on the overview sheet
    /// (task report)
    #[serde(default)]
    pub overview_totals: BTreeMap<String, String>,
    /// Name of the overview sheet in the task report template
    #[serde(default = "default_overview_sheet")]
    pub overview_sheet: String,
    /// Rows of the template that carry layout (heights, styles); used when
    /// cloning dimensions onto fresh sheets
    #[serde(default = "default_template_rows")]
    pub template_rows: u32,
}

fn default_overview_sheet() -> String {
    "Uebersicht".to_string()
}

fn default_template_rows() -> u32 {
    60
}

/// The full run configuration
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Ordered activity code table
    pub categories: Vec<Category>,
    /// Codes whose comments keep the operator's raw text
    #[serde(default)]
    pub keep_raw: HashSet<String>,
    /// Employee full name → billing grade
    #[serde(default)]
    pub grades: HashMap<String, String>,
    /// Client name → report settings
    pub clients: BTreeMap<String, ClientConfig>,
}

impl Config {
    /// Load and parse the TOML config file
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// The resolver's code table, in declaration order
    pub fn code_table(&self) -> CodeTable {
        CodeTable::new(
            self.categories
                .iter()
                .map(|c| (c.code.clone(), c.label.clone())),
            self.keep_raw.iter().cloned(),
        )
    }

    pub fn client(&self, name: &str) -> Result<&ClientConfig, ConfigError> {
        self.clients
            .get(name)
            .ok_or_else(|| ConfigError::UnknownClient(name.to_string()))
    }
}
