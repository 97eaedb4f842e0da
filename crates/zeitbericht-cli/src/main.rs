//! zeitbericht CLI - Timesheet Report Generator
//!
//! Command-line interface for turning a Replicon timesheet export into
//! per-client Excel report workbooks.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use zeitbericht_cli::{pipeline, RunOptions};

#[derive(Parser)]
#[command(name = "zeitbericht")]
#[command(author, version, about = "Timesheet report generator", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the report workbooks from an export
    Generate {
        /// Replicon export file; discovered in the current directory by its
        /// "Timesheet Hours" naming convention when omitted
        #[arg(value_name = "EXPORT")]
        export: Option<std::path::PathBuf>,

        /// Config file
        #[arg(short, long, default_value = "Template/config.toml")]
        config: std::path::PathBuf,

        /// Directory holding the template_<client>.xlsx workbooks
        #[arg(short, long, default_value = "Template")]
        templates: std::path::PathBuf,

        /// Output root directory
        #[arg(short, long, default_value = "output")]
        output: std::path::PathBuf,

        /// Process only this client
        #[arg(long)]
        client: Option<String>,

        /// Export entries without a task name to no_tasks.xlsx
        #[arg(long)]
        export_no_tasks: bool,
    },

    /// Validate an export and list its clients and projects
    Check {
        /// Replicon export file (auto-discovered when omitted)
        #[arg(value_name = "EXPORT")]
        export: Option<std::path::PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; -v/-vv raise the default level otherwise.
    let default_filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    match cli.command {
        Some(Commands::Generate {
            export,
            config,
            templates,
            output,
            client,
            export_no_tasks,
        }) => {
            let export = resolve_export(export)?;
            let summary = pipeline::run(&RunOptions {
                export,
                config,
                templates,
                output,
                client,
                export_no_tasks,
            })?;

            println!(
                "Wrote {} workbook(s) for {} client(s) from {} entries.",
                summary.workbooks, summary.clients, summary.entries
            );
            if !summary.skipped_clients.is_empty() {
                println!(
                    "Skipped clients without config: {}",
                    summary.skipped_clients.join(", ")
                );
            }
            if summary.entries_without_task > 0 {
                println!(
                    "{} entries had no task name and were excluded from the Stundenaufstellung.",
                    summary.entries_without_task
                );
            }
        }
        Some(Commands::Check { export }) => {
            let export = resolve_export(export)?;
            let entries = zeitbericht_ingest::read_export(&export)?;
            println!("{}: {} entries", export.display(), entries.len());
            for (client, projects) in pipeline::summarize(entries) {
                println!("{client}");
                for (wbs, count) in projects {
                    println!("  {wbs}: {count} entries");
                }
            }
        }
        None => {
            println!("zeitbericht - Timesheet Report Generator");
            println!("Run with --help for usage information");
        }
    }

    Ok(())
}

fn resolve_export(export: Option<std::path::PathBuf>) -> Result<std::path::PathBuf> {
    match export {
        Some(path) => Ok(path),
        None => Ok(zeitbericht_ingest::discover_export(std::path::Path::new(
            ".",
        ))?),
    }
}
