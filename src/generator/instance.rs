//! The generated task instance.
//!
//! A `TaskInstance` carries every artifact of one task, the ground truth a
//! correct solution must produce, and the instruction shown to the agent.
//! It is built once by a synthesizer and never mutated afterwards.

use crate::categories::{Category, TaskType};
use crate::generator::format::CellValue;
use crate::generator::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Logical role of a generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactRole {
    /// The file placed in the environment for the agent to work on.
    MainFile,
    /// Companion configuration file placed next to the main file.
    ConfigFile,
    /// Document served by the local web server for download.
    DownloadFile,
    /// The corrected program.
    ReferenceSolution,
    /// What the reference program prints, or the expected text output.
    ExpectedOutput,
    ExpectedOutputFile,
    ExpectedConfig,
    ExpectedLog,
    ExpectedSpreadsheet,
    PresentationSpec,
}

impl ArtifactRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactRole::MainFile => "main_file",
            ArtifactRole::ConfigFile => "config_file",
            ArtifactRole::DownloadFile => "download_file",
            ArtifactRole::ReferenceSolution => "reference_solution",
            ArtifactRole::ExpectedOutput => "expected_output",
            ArtifactRole::ExpectedOutputFile => "expected_output_file",
            ArtifactRole::ExpectedConfig => "expected_config",
            ArtifactRole::ExpectedLog => "expected_log",
            ArtifactRole::ExpectedSpreadsheet => "expected_spreadsheet",
            ArtifactRole::PresentationSpec => "presentation_spec",
        }
    }

    /// Returns true for files that are placed in the target environment.
    pub fn is_environment(&self) -> bool {
        matches!(
            self,
            ArtifactRole::MainFile | ArtifactRole::ConfigFile | ArtifactRole::DownloadFile
        )
    }

    /// Returns true for reference files the harness fetches to compare against.
    pub fn is_hosted_reference(&self) -> bool {
        matches!(
            self,
            ArtifactRole::ExpectedOutputFile
                | ArtifactRole::ExpectedConfig
                | ArtifactRole::ExpectedLog
                | ArtifactRole::ExpectedSpreadsheet
                | ArtifactRole::PresentationSpec
        )
    }
}

impl fmt::Display for ArtifactRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an artifact's text content becomes file bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactFormat {
    /// Written as-is.
    #[default]
    Text,
    /// `content` is a CSV cell grid, written as a single-sheet xlsx workbook.
    Workbook,
}

impl ArtifactFormat {
    pub fn is_text(&self) -> bool {
        matches!(self, ArtifactFormat::Text)
    }
}

/// A named file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub filename: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "ArtifactFormat::is_text")]
    pub format: ArtifactFormat,
}

impl Artifact {
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
            format: ArtifactFormat::Text,
        }
    }

    /// A workbook whose cells are given as CSV rows.
    pub fn workbook(filename: impl Into<String>, grid: impl Into<String>) -> Self {
        Self {
            format: ArtifactFormat::Workbook,
            ..Self::new(filename, grid)
        }
    }
}

/// Format of the configuration file in a config-update task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    Json,
    Ini,
}

impl ConfigFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            ConfigFormat::Ini => "ini",
        }
    }
}

/// What a correct solution must produce. Paths are absolute paths inside the
/// target environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroundTruth {
    /// Running `script` from `workdir` prints exactly `stdout`.
    ProgramOutput {
        workdir: String,
        script: String,
        stdout: String,
    },
    /// A file at `path` exists with exactly `content`.
    OutputFile { path: String, content: String },
    /// The config at `config_path` carries `new_timeout` and the script has
    /// written `log_content` to `log_path`.
    ConfigUpdate {
        config_path: String,
        config_format: ConfigFormat,
        old_timeout: i64,
        new_timeout: i64,
        log_path: String,
        log_content: String,
    },
    /// Cell `coordinate` of the first sheet of `result_path` holds `value`.
    Cell {
        result_path: String,
        coordinate: String,
        value: CellValue,
    },
    /// As `Cell`, plus `output_path` containing `output`.
    CellAndOutput {
        result_path: String,
        coordinate: String,
        value: CellValue,
        output_path: String,
        output: String,
    },
    /// The presentation at `path` contains `texts`.
    Presentation { path: String, texts: Vec<String> },
}

/// One generated task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInstance {
    pub task_type: TaskType,
    pub level: u8,
    pub seed: u64,
    pub domain: String,
    pub template_variant: String,
    pub artifacts: BTreeMap<ArtifactRole, Artifact>,
    pub ground_truth: GroundTruth,
    pub instructions: String,
    /// Supplementary facts: applied fault class, formula hint, page URL.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
}

impl TaskInstance {
    pub fn category(&self) -> Category {
        self.task_type.category()
    }

    pub fn artifact(&self, role: ArtifactRole) -> Option<&Artifact> {
        self.artifacts.get(&role)
    }

    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details.get(key).map(String::as_str)
    }

    /// Artifacts placed in the target environment, in role order.
    pub fn environment_artifacts(&self) -> impl Iterator<Item = (ArtifactRole, &Artifact)> {
        self.artifacts
            .iter()
            .filter(|(role, _)| role.is_environment())
            .map(|(role, artifact)| (*role, artifact))
    }

    /// Artifacts kept out of the environment: reference solutions and files
    /// the harness compares against.
    pub fn ground_truth_artifacts(&self) -> impl Iterator<Item = (ArtifactRole, &Artifact)> {
        self.artifacts
            .iter()
            .filter(|(role, _)| !role.is_environment())
            .map(|(role, artifact)| (*role, artifact))
    }

    /// Stable identifier derived from the task type and seed.
    pub fn task_id(&self) -> Uuid {
        let input = format!("{}:{}", self.task_type, self.seed);
        Uuid::new_v5(&Uuid::NAMESPACE_DNS, input.as_bytes())
    }

    /// SHA-256 over the canonical JSON encoding.
    pub fn fingerprint(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}
