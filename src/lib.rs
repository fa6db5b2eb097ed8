//! deskforge: deterministic desktop-automation benchmark task generator.
//!
//! This library generates seeded task instances, injects single faults into
//! generated code, compiles harness evaluator configurations and exports
//! task packages.

// Core modules
pub mod categories;
pub mod cli;
pub mod corruption;
pub mod error;
pub mod evaluator;
pub mod export;
pub mod generator;
pub mod pipeline;
pub mod setup;

// Re-export commonly used error types
pub use error::{CompileError, ExportError, GeneratorError, SessionError};
