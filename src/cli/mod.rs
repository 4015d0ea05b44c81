//! Command Line Interface (CLI) layer for bandseries.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) that layers command-line flags over
//! an optional JSON config and hands the result to `bandseries::run_pipeline`.
//!
//! If you are embedding the extractor into another application, prefer the
//! library API (`bandseries::api`) over calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
