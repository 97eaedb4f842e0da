//! Orchestration layer of the zeitbericht CLI.
//!
//! The binary in `main.rs` only parses arguments and initializes logging;
//! everything from reading the export to saving the workbooks lives in
//! [`pipeline`], so integration tests can drive a full run without spawning
//! a process.

pub mod pipeline;

pub use pipeline::{run, RunOptions, RunSummary};
