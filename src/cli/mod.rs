//! Command-line interface for deskforge.
//!
//! Provides commands for task generation, evaluator compilation, catalog
//! listing and batch sampling.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli, Commands};
