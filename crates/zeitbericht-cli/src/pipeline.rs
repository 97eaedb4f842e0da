//! The batch run: export → grouping passes → workbooks on disk.
//!
//! Grouping is strictly nested: client → project → (year → month → employee)
//! for monthly-report clients, or → task for task-report clients. Report
//! units are independent of each other; a failure in one unit aborts the
//! batch with full context, and output already written stays on disk.

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};
use umya_spreadsheet::{reader, writer, Spreadsheet};
use zeitbericht_core::{
    group_by, month_name, ClientConfig, CodeTable, Config, ReportKind, TimeEntry,
};
use zeitbericht_ingest::{read_export, IngestError, EXPECTED_COLUMNS, REQUIRED_COLUMNS};
use zeitbericht_render::layout::clone_layout;
use zeitbericht_render::{extras, MonthlyReport, Report, ReportError, TaskReport, TEMPLATE_SHEET};

/// Everything a run needs from the command line
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Path to the Replicon export
    pub export: PathBuf,
    /// Path to the TOML config file
    pub config: PathBuf,
    /// Directory holding `template_<client>.xlsx` workbooks
    pub templates: PathBuf,
    /// Output root for the client/project directory tree
    pub output: PathBuf,
    /// Restrict the run to one client name
    pub client: Option<String>,
    /// Export entries without a task name to `no_tasks.xlsx`
    pub export_no_tasks: bool,
}

/// What a completed run produced
#[derive(Clone, Debug, Default)]
pub struct RunSummary {
    pub entries: usize,
    pub clients: usize,
    pub workbooks: usize,
    /// Clients present in the export but absent from the config
    pub skipped_clients: Vec<String>,
    pub entries_without_task: usize,
}

/// Execute a full batch run.
pub fn run(options: &RunOptions) -> Result<RunSummary> {
    let started = Instant::now();
    let config = Config::from_path(&options.config)?;
    let table = config.code_table();
    let today = Local::now().date_naive();

    let entries = match read_export(&options.export) {
        Ok(entries) => entries,
        Err(err @ IngestError::HeaderMismatch { .. }) => {
            // Give the operator the correct labels to paste into the export.
            let helper = options
                .export
                .parent()
                .unwrap_or(Path::new("."))
                .join("column_names.xlsx");
            extras::write_column_names(&helper, &EXPECTED_COLUMNS)?;
            info!(helper = %helper.display(), "wrote expected column names");
            return Err(err).context("export validation failed");
        }
        Err(err) => return Err(err.into()),
    };

    let mut summary = RunSummary {
        entries: entries.len(),
        ..RunSummary::default()
    };
    let mut no_task_entries: Vec<TimeEntry> = Vec::new();

    std::fs::create_dir_all(&options.output)
        .with_context(|| format!("cannot create output root {}", options.output.display()))?;

    let client_groups = group_by(entries, |e| e.client_name.clone());
    let total_clients = client_groups.len();

    for (i, (client_name, client_entries)) in client_groups.into_iter().enumerate() {
        if options
            .client
            .as_deref()
            .is_some_and(|only| only != client_name)
        {
            continue;
        }
        let Ok(client_cfg) = config.client(&client_name) else {
            warn!(client = %client_name, "client not in config, skipping");
            summary.skipped_clients.push(client_name);
            continue;
        };

        let template_path = options
            .templates
            .join(format!("template_{client_name}.xlsx"));
        let template_book =
            reader::xlsx::read(&template_path).map_err(|e| ReportError::TemplateRead {
                path: template_path.clone(),
                message: e.to_string(),
            })?;

        let client_dir = options.output.join(sanitize_name(&client_name));
        let project_groups = group_by(client_entries, |e| e.project_code.clone());
        for (wbs, project_entries) in project_groups {
            let project_name = project_entries
                .first()
                .map(|e| e.project_name.clone())
                .unwrap_or_default();
            let project_dir =
                client_dir.join(format!("{} ({})", wbs, sanitize_name(&project_name)));
            std::fs::create_dir_all(&project_dir).with_context(|| {
                format!("cannot create project directory {}", project_dir.display())
            })?;

            match client_cfg.kind {
                ReportKind::Leistungsnachweis => {
                    summary.workbooks += write_monthly_reports(
                        &client_name,
                        client_cfg,
                        &table,
                        &template_book,
                        &project_dir,
                        &wbs,
                        &project_name,
                        project_entries,
                        today,
                    )?;
                }
                ReportKind::Stundenaufstellung => {
                    let (written, skipped) = write_task_report(
                        &client_name,
                        client_cfg,
                        &config,
                        &table,
                        &template_book,
                        &project_dir,
                        &wbs,
                        project_entries,
                        today,
                    )?;
                    summary.workbooks += written;
                    no_task_entries.extend(skipped);
                }
            }
        }

        summary.clients += 1;
        info!(
            client = %client_name,
            progress = format!("{}/{}", i + 1, total_clients),
            "client finished"
        );
    }

    summary.entries_without_task = no_task_entries.len();
    if !no_task_entries.is_empty() {
        warn!(
            count = no_task_entries.len(),
            "entries without a task name were excluded from the Stundenaufstellung"
        );
        if options.export_no_tasks {
            // Only the columns an entry carries past ingestion.
            let path = options.output.join("no_tasks.xlsx");
            extras::write_no_tasks(&path, &EXPECTED_COLUMNS[..REQUIRED_COLUMNS], &no_task_entries)?;
            info!(path = %path.display(), "exported entries without task names");
        }
    }

    info!(
        workbooks = summary.workbooks,
        elapsed = ?started.elapsed(),
        "run finished"
    );
    Ok(summary)
}

/// One workbook per year/month, one layout-cloned sheet per employee.
#[allow(clippy::too_many_arguments)]
fn write_monthly_reports(
    client_name: &str,
    client_cfg: &ClientConfig,
    table: &CodeTable,
    template_book: &Spreadsheet,
    project_dir: &Path,
    wbs: &str,
    project_name: &str,
    entries: Vec<TimeEntry>,
    today: NaiveDate,
) -> Result<usize> {
    let cells = client_cfg
        .cells
        .as_ref()
        .with_context(|| format!("client '{client_name}' has no cell anchors configured"))?;
    let template_sheet = template_book
        .get_sheet_by_name(TEMPLATE_SHEET)
        .ok_or_else(|| ReportError::MissingSheet {
            sheet: TEMPLATE_SHEET.to_string(),
            unit: format!("client {client_name} template"),
        })?;

    let mut written = 0usize;
    let year_groups = group_by(entries, |e| e.date.year());
    for (year, year_entries) in year_groups {
        let year_dir = project_dir.join(year.to_string());
        std::fs::create_dir_all(&year_dir)
            .with_context(|| format!("cannot create year directory {}", year_dir.display()))?;

        let month_groups = group_by(year_entries, |e| e.date.month());
        for (month, month_entries) in month_groups {
            let unit_period = format!("client {client_name}, {wbs}, {} {year}", month_name(month));
            let mut book = template_book.clone();

            let employee_groups = group_by(month_entries, |e| e.full_name());
            for (employee_name, employee_entries) in employee_groups {
                let sheet = book
                    .new_sheet(&employee_name)
                    .map_err(|e| ReportError::Workbook {
                        unit: format!("{unit_period}, {employee_name}"),
                        message: e.to_string(),
                    })?;
                clone_layout(template_sheet, sheet, client_cfg.template_rows);

                let report = Report::Monthly(MonthlyReport {
                    employee_name: employee_name.clone(),
                    project_name: project_name.to_string(),
                    year,
                    month,
                    entries: &employee_entries,
                    cells,
                    header: &client_cfg.header_cells,
                    unit: format!("{unit_period}, {employee_name}"),
                });
                report.fill(&mut book, table, today)?;
            }

            book.remove_sheet_by_name(TEMPLATE_SHEET)
                .map_err(|e| ReportError::Workbook {
                    unit: unit_period.clone(),
                    message: e.to_string(),
                })?;

            let path = year_dir.join(format!("{}.xlsx", month_name(month)));
            writer::xlsx::write(&book, &path).map_err(|e| ReportError::WorkbookWrite {
                path: path.clone(),
                message: e.to_string(),
            })?;
            written += 1;
        }
    }
    Ok(written)
}

/// One workbook per project: merged task buckets into pre-existing sheets.
/// Returns the number of workbooks written and the entries without a task.
#[allow(clippy::too_many_arguments)]
fn write_task_report(
    client_name: &str,
    client_cfg: &ClientConfig,
    config: &Config,
    table: &CodeTable,
    template_book: &Spreadsheet,
    project_dir: &Path,
    wbs: &str,
    entries: Vec<TimeEntry>,
    today: NaiveDate,
) -> Result<(usize, Vec<TimeEntry>)> {
    let cells = client_cfg
        .cells
        .as_ref()
        .with_context(|| format!("client '{client_name}' has no cell anchors configured"))?;

    let outcome = zeitbericht_core::merge::merge_tasks(
        entries,
        &client_cfg.task_aliases,
        client_cfg.long_task_names,
    );
    if outcome.buckets.is_empty() {
        return Ok((0, outcome.without_task));
    }

    // Sheets pre-exist in the task report template; no layout cloning.
    let mut book = template_book.clone();
    for (task_name, bucket) in &outcome.buckets {
        let report = Report::Task(TaskReport {
            task_name: task_name.clone(),
            entries: bucket,
            grades: &config.grades,
            cells,
            overview_sheet: client_cfg.overview_sheet.clone(),
            total_cell: client_cfg.overview_totals.get(task_name).cloned(),
            unit: format!("client {client_name}, {wbs}, task {task_name}"),
        });
        report.fill(&mut book, table, today)?;
    }

    let path = project_dir.join(format!("{client_name}_Stundenaufstellung.xlsx"));
    writer::xlsx::write(&book, &path).map_err(|e| ReportError::WorkbookWrite {
        path: path.clone(),
        message: e.to_string(),
    })?;
    Ok((1, outcome.without_task))
}

/// Strip characters the filesystem rejects from client/project names.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '"' | '?' | '<' | '>' | '|' => '-',
            other => other,
        })
        .collect()
}

/// Entry counts per client/project, for the `check` subcommand.
pub fn summarize(entries: Vec<TimeEntry>) -> BTreeMap<String, BTreeMap<String, usize>> {
    let mut out: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
    for (client, client_entries) in group_by(entries, |e| e.client_name.clone()) {
        let per_project = group_by(client_entries, |e| e.project_code.clone())
            .into_iter()
            .map(|(wbs, group)| (wbs, group.len()))
            .collect();
        out.insert(client, per_project);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sanitize_replaces_forbidden_characters() {
        assert_eq!(sanitize_name("A/B:C*D?E"), "A-B-C-D-E");
        assert_eq!(sanitize_name("Projekt X"), "Projekt X");
    }
}
