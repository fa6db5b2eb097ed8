//! On-disk task packages.
//!
//! A package directory holds everything one task needs:
//!
//! ```text
//! <package>/
//!   files/<artifact>                  environment-facing files
//!   files/ground_truth/<artifact>     reference solutions and expected files
//!   framework_config.json
//!   task_metadata.json
//! ```

use crate::error::ExportError;
use crate::export::{artifact_bytes, FrameworkConfig};
use crate::generator::{ArtifactRole, TaskInstance};
use crate::setup::{ArtifactLocations, VmLayout};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

pub const FILES_DIR: &str = "files";
pub const GROUND_TRUTH_DIR: &str = "ground_truth";
pub const FRAMEWORK_CONFIG_FILE: &str = "framework_config.json";
pub const METADATA_FILE: &str = "task_metadata.json";

/// Path of an artifact inside a package, relative to the package root.
pub fn package_relative_path(role: ArtifactRole, filename: &str) -> String {
    if role.is_environment() {
        format!("{}/{}", FILES_DIR, filename)
    } else {
        format!("{}/{}/{}", FILES_DIR, GROUND_TRUTH_DIR, filename)
    }
}

/// Result of writing one package.
#[derive(Debug, Clone)]
pub struct ExportedTask {
    pub task_id: Uuid,
    pub package_dir: PathBuf,
    pub framework_config: FrameworkConfig,
    /// Every artifact file written, in role order.
    pub files: Vec<PathBuf>,
    pub fingerprint: String,
}

#[derive(Serialize)]
struct TaskMetadata<'a> {
    task_id: String,
    task_type: &'a str,
    category: &'a str,
    level: u8,
    seed: u64,
    domain: &'a str,
    template_variant: &'a str,
    fingerprint: &'a str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    details: &'a BTreeMap<String, String>,
    locations: BTreeMap<String, &'a str>,
    generator_version: &'static str,
    created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    task_spec: Option<Value>,
}

/// Writes task packages to disk.
///
/// By default reference locations are `file://` URLs of the written files.
/// With a base URL set they become `{base}/{task_id}/files/...`, matching a
/// mirror of the package tree on a file server.
#[derive(Debug, Clone)]
pub struct PackageWriter {
    layout: VmLayout,
    base_url: Option<String>,
    pretty: bool,
}

impl PackageWriter {
    pub fn new(layout: VmLayout) -> Self {
        Self {
            layout,
            base_url: None,
            pretty: true,
        }
    }

    /// Builder method to set the base URL for artifact locations.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    /// Builder method to set whether JSON files are pretty-printed.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Writes `instance` into `package_dir`, creating it if needed.
    ///
    /// `task_spec` is recorded verbatim in the metadata when given.
    pub fn write(
        &self,
        instance: &TaskInstance,
        package_dir: &Path,
        task_spec: Option<Value>,
    ) -> Result<ExportedTask, ExportError> {
        if package_dir.exists() && !package_dir.is_dir() {
            return Err(ExportError::OutputDirectory {
                path: package_dir.display().to_string(),
                reason: "exists and is not a directory".to_string(),
            });
        }
        let files_dir = package_dir.join(FILES_DIR);
        let truth_dir = files_dir.join(GROUND_TRUTH_DIR);
        fs::create_dir_all(&files_dir)?;

        let task_id = instance.task_id();
        let mut files = Vec::with_capacity(instance.artifacts.len());
        let mut locations = ArtifactLocations::new();

        for (role, artifact) in &instance.artifacts {
            let dir = if role.is_environment() {
                &files_dir
            } else {
                fs::create_dir_all(&truth_dir)?;
                &truth_dir
            };
            let path = dir.join(&artifact.filename);
            fs::write(&path, artifact_bytes(artifact)?)?;
            debug!(role = %role, path = %path.display(), "Wrote artifact");

            locations.insert(*role, self.location(task_id, *role, &artifact.filename, &path)?);
            files.push(path);
        }

        let framework_config = FrameworkConfig::assemble(&self.layout, instance, &locations)?;
        let fingerprint = instance.fingerprint()?;

        let metadata = TaskMetadata {
            task_id: task_id.to_string(),
            task_type: instance.task_type.as_str(),
            category: instance.category().as_str(),
            level: instance.level,
            seed: instance.seed,
            domain: &instance.domain,
            template_variant: &instance.template_variant,
            fingerprint: &fingerprint,
            details: &instance.details,
            locations: locations
                .iter()
                .map(|(role, location)| (role.to_string(), location.as_str()))
                .collect(),
            generator_version: env!("CARGO_PKG_VERSION"),
            created_at: Utc::now().to_rfc3339(),
            task_spec,
        };

        self.write_json(&package_dir.join(FRAMEWORK_CONFIG_FILE), &framework_config)?;
        self.write_json(&package_dir.join(METADATA_FILE), &metadata)?;

        info!(
            task_id = %task_id,
            task_type = %instance.task_type,
            package = %package_dir.display(),
            files = files.len(),
            "Exported task package"
        );

        Ok(ExportedTask {
            task_id,
            package_dir: package_dir.to_path_buf(),
            framework_config,
            files,
            fingerprint,
        })
    }

    fn location(
        &self,
        task_id: Uuid,
        role: ArtifactRole,
        filename: &str,
        written: &Path,
    ) -> Result<String, ExportError> {
        let relative = package_relative_path(role, filename);
        match &self.base_url {
            Some(base) => Ok(format!("{}/{}/{}", base, task_id, relative)),
            None => {
                let absolute = fs::canonicalize(written)?;
                Ok(format!("file://{}", absolute.display()))
            }
        }
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), ExportError> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::TaskType;
    use crate::generator::Generator;
    use tempfile::TempDir;

    fn instance(task_type: TaskType, seed: u64) -> TaskInstance {
        Generator::new(VmLayout::default())
            .expect("generator")
            .generate(task_type, Some(seed))
            .expect("generate")
    }

    #[test]
    fn test_package_layout() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let instance = instance(TaskType::MultiFileConfigUpdate, 5);
        let dir = temp_dir.path().join("pkg");

        let exported = PackageWriter::new(VmLayout::default())
            .write(&instance, &dir, None)
            .expect("should export");

        assert!(dir.join(FRAMEWORK_CONFIG_FILE).exists());
        assert!(dir.join(METADATA_FILE).exists());
        assert_eq!(exported.files.len(), instance.artifacts.len());

        let main = instance.artifact(ArtifactRole::MainFile).expect("main");
        let written = fs::read_to_string(dir.join("files").join(&main.filename)).expect("read");
        assert_eq!(written, main.content);

        let log = instance.artifact(ArtifactRole::ExpectedLog).expect("log");
        assert!(dir.join("files/ground_truth").join(&log.filename).exists());
    }

    #[test]
    fn test_default_locations_are_file_urls() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let instance = instance(TaskType::SimpleLogicCompletion, 8);
        let exported = PackageWriter::new(VmLayout::default())
            .write(&instance, temp_dir.path(), None)
            .expect("should export");

        let expected = &exported.framework_config.evaluator["expected"][1];
        assert_eq!(expected["type"], "cloud_file");
        let path = expected["path"].as_str().expect("path");
        assert!(path.starts_with("file://"));
        assert!(path.contains("/files/ground_truth/expected_results_"));
    }

    #[test]
    fn test_base_url_locations() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let instance = instance(TaskType::SimpleDataTransfer, 8);
        let exported = PackageWriter::new(VmLayout::default())
            .with_base_url("https://tasks.example/bucket/")
            .write(&instance, temp_dir.path(), None)
            .expect("should export");

        let prefix = format!("https://tasks.example/bucket/{}/files/", instance.task_id());
        let json = serde_json::to_value(&exported.framework_config).expect("serialize");
        let download = json["config"][0]["parameters"]["files"][0]["url"]
            .as_str()
            .expect("url");
        assert!(download.starts_with(&prefix));
        let expected = json["evaluator"]["expected"]["path"].as_str().expect("path");
        assert_eq!(expected, format!("{}ground_truth/expected_result.xlsx", prefix));
    }

    #[test]
    fn test_expected_spreadsheet_written_as_workbook() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let instance = instance(TaskType::SimpleCalculationOutput, 6);
        PackageWriter::new(VmLayout::default())
            .write(&instance, temp_dir.path(), None)
            .expect("should export");

        let bytes = fs::read(temp_dir.path().join("files/ground_truth/expected_result.xlsx"))
            .expect("read workbook");
        assert!(bytes.starts_with(b"PK\x03\x04"));

        let data = instance.artifact(ArtifactRole::MainFile).expect("data");
        let written = fs::read_to_string(temp_dir.path().join("files").join(&data.filename))
            .expect("read data");
        assert_eq!(written, data.content);
    }

    #[test]
    fn test_metadata_records_identity() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let instance = instance(TaskType::BasicPythonSyntaxFix, 13);
        let spec = serde_json::json!({"category": "debugging_and_refactoring", "level": 1});
        let exported = PackageWriter::new(VmLayout::default())
            .with_pretty(false)
            .write(&instance, temp_dir.path(), Some(spec))
            .expect("should export");

        let text = fs::read_to_string(temp_dir.path().join(METADATA_FILE)).expect("read");
        let metadata: Value = serde_json::from_str(&text).expect("parse");
        assert_eq!(metadata["task_id"], instance.task_id().to_string());
        assert_eq!(metadata["seed"], 13);
        assert_eq!(metadata["fingerprint"], exported.fingerprint.as_str());
        assert_eq!(metadata["task_spec"]["level"], 1);
        assert!(metadata["details"]["fault_class"].is_string());
        assert!(!text.contains('\n'));
    }

    #[test]
    fn test_reexport_keeps_task_id() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let instance = instance(TaskType::BasicWebExtraction, 21);
        let writer = PackageWriter::new(VmLayout::default());
        let first = writer
            .write(&instance, &temp_dir.path().join("a"), None)
            .expect("first");
        let second = writer
            .write(&instance, &temp_dir.path().join("b"), None)
            .expect("second");
        assert_eq!(first.task_id, second.task_id);
        assert_eq!(first.fingerprint, second.fingerprint);
    }

    #[test]
    fn test_rejects_file_as_package_dir() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let file = temp_dir.path().join("occupied");
        fs::write(&file, "x").expect("write");
        let err = PackageWriter::new(VmLayout::default())
            .write(&instance(TaskType::SimpleDataTransfer, 1), &file, None)
            .unwrap_err();
        assert!(matches!(err, ExportError::OutputDirectory { .. }));
    }
}
