//! Error types for deskforge operations.
//!
//! Defines error types for the major subsystems:
//! - Task instance generation
//! - Evaluator compilation
//! - Task package export
//! - Sampling sessions

use thiserror::Error;

/// Errors that can occur during task generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Unknown task type: {0}")]
    UnknownTaskType(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown content type '{content_type}' for {task_type}")]
    UnknownContentType {
        task_type: String,
        content_type: String,
    },

    #[error("Empty pool: {0}")]
    EmptyPool(String),

    #[error("Inconsistent task data: {0}")]
    Inconsistent(String),

    #[error("Invalid fault site pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Tera template rendering error: {0}")]
    Tera(#[from] tera::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while compiling an evaluator specification.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Unknown task type: {0}")]
    UnknownTaskType(String),

    #[error("Task type mismatch: asked to compile '{requested}' for a '{actual}' instance")]
    TaskTypeMismatch { requested: String, actual: String },

    #[error("Missing reference artifact location for role '{0}'")]
    MissingReference(String),

    #[error("Missing artifact '{role}' in '{task_type}' instance")]
    MissingArtifact { task_type: String, role: String },

    #[error("Ground truth does not match task type '{0}'")]
    GroundTruthMismatch(String),
}

/// Errors that can occur while writing task packages.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Output directory error for '{path}': {reason}")]
    OutputDirectory { path: String, reason: String },

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("Instance error: {0}")]
    Instance(#[from] GeneratorError),

    #[error("Workbook encoding error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while running a sampling session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid sampling config: {0}")]
    InvalidPlan(String),

    #[error("Generation failed: {0}")]
    Generator(#[from] GeneratorError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
