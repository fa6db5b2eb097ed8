//! Sampling sessions.
//!
//! A [`SamplingPlan`] names categories, levels and instance counts. The
//! session validates the whole plan up front, expands it into [`TaskSpec`]s,
//! then generates and exports each one independently: a failing spec is
//! recorded in the manifest and the session carries on.

use crate::categories::{Category, TaskCatalog, TaskType};
use crate::error::SessionError;
use crate::export::{FrameworkConfig, PackageWriter};
use crate::generator::Generator;
use crate::pipeline::ForgeConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

pub const TASKS_DIR: &str = "tasks";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const SAMPLING_CONFIG_FILE: &str = "sampling_config.json";
pub const FRAMEWORK_CONFIGS_FILE: &str = "framework_configs.json";

/// One `sampling` entry of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleEntry {
    pub category: String,
    pub levels: Vec<u8>,
    /// Restricts generation to these task types; all types of each level
    /// are used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_types: Option<Vec<String>>,
    pub instances_per_task: usize,
}

/// The `output` section of a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_name: Option<String>,
}

/// What to generate in one session.
///
/// ```yaml
/// sampling:
///   - category: tabular_data_reporting
///     levels: [1, 2]
///     instances_per_task: 3
///   - category: debugging_and_refactoring
///     levels: [1]
///     task_types: [basic_python_syntax_fix]
///     instances_per_task: 5
/// output:
///   output_dir: ./sessions
///   session_name: nightly
/// base_seed: 1000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingPlan {
    pub sampling: Vec<SampleEntry>,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_seed: Option<u64>,
}

impl SamplingPlan {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Reads a plan file. `.json` files are parsed as JSON, anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Ok(serde_json::from_str(&text)?)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    /// Checks every entry against `catalog`. Any problem is fatal.
    pub fn validate(&self, catalog: &TaskCatalog) -> Result<()> {
        if self.sampling.is_empty() {
            return Err(SessionError::InvalidPlan(
                "'sampling' must contain at least one entry".to_string(),
            ));
        }
        for (index, entry) in self.sampling.iter().enumerate() {
            validate_entry(catalog, entry, index)?;
        }
        Ok(())
    }

    /// Expands the plan into concrete task specs, in plan order.
    pub fn expand(&self, catalog: &TaskCatalog) -> Result<Vec<TaskSpec>> {
        self.validate(catalog)?;
        let mut specs = Vec::new();
        for (index, entry) in self.sampling.iter().enumerate() {
            let category = parse_category(&entry.category, index)?;
            for &level in &entry.levels {
                let available = catalog.task_types(category, Some(level));
                let selected: Vec<TaskType> = match &entry.task_types {
                    Some(names) => names
                        .iter()
                        .filter_map(|name| name.parse::<TaskType>().ok())
                        .filter(|task_type| available.contains(task_type))
                        .collect(),
                    None => available,
                };
                for task_type in selected {
                    for instance in 0..entry.instances_per_task {
                        specs.push(TaskSpec {
                            category,
                            task_type,
                            level,
                            instance,
                        });
                    }
                }
            }
        }
        Ok(specs)
    }
}

fn parse_category(name: &str, index: usize) -> Result<Category> {
    name.parse().map_err(|_| {
        let available: Vec<&str> = Category::all().iter().map(Category::as_str).collect();
        SessionError::InvalidPlan(format!(
            "Sampling config {}: Unknown category '{}'. Available: {:?}",
            index, name, available
        ))
    })
}

fn validate_entry(catalog: &TaskCatalog, entry: &SampleEntry, index: usize) -> Result<()> {
    let category = parse_category(&entry.category, index)?;

    if entry.levels.is_empty() {
        return Err(SessionError::InvalidPlan(format!(
            "Sampling config {}: 'levels' must be a non-empty list",
            index
        )));
    }
    let supported = catalog.supported_levels(category);
    if let Some(level) = entry.levels.iter().find(|level| !supported.contains(level)) {
        return Err(SessionError::InvalidPlan(format!(
            "Sampling config {}: Level {} not supported by category '{}'. Supported: {:?}",
            index, level, category, supported
        )));
    }

    if entry.instances_per_task == 0 {
        return Err(SessionError::InvalidPlan(format!(
            "Sampling config {}: 'instances_per_task' must be greater than 0",
            index
        )));
    }

    if let Some(names) = &entry.task_types {
        let available: Vec<TaskType> = entry
            .levels
            .iter()
            .flat_map(|level| catalog.task_types(category, Some(*level)))
            .collect();
        for name in names {
            let found = name
                .parse::<TaskType>()
                .is_ok_and(|task_type| available.contains(&task_type));
            if !found {
                let mut listed: Vec<&str> = available.iter().map(TaskType::as_str).collect();
                listed.sort_unstable();
                return Err(SessionError::InvalidPlan(format!(
                    "Sampling config {}: Task type '{}' not available in category '{}' in any of the specified levels {:?}. Available tasks: {:?}",
                    index, name, category, entry.levels, listed
                )));
            }
        }
    }
    Ok(())
}

/// One task to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub category: Category,
    pub task_type: TaskType,
    pub level: u8,
    /// Zero-based index among the instances requested for this task type.
    pub instance: usize,
}

impl TaskSpec {
    /// Package directory name, unique within a session.
    pub fn package_name(&self, task_id: &Uuid) -> String {
        let id = task_id.simple().to_string();
        format!(
            "task_{}_{}_{}_L{}_inst{}",
            &id[..8],
            self.category,
            self.task_type,
            self.level,
            self.instance + 1
        )
    }
}

impl fmt::Display for TaskSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.L{}.inst{}",
            self.category, self.task_type, self.level, self.instance
        )
    }
}

/// A successfully exported task.
#[derive(Debug, Clone, Serialize)]
pub struct SessionTask {
    pub task_id: String,
    #[serde(flatten)]
    pub spec: TaskSpec,
    pub seed: u64,
    /// Relative to the session directory.
    pub package_path: String,
    pub has_files: bool,
    pub fingerprint: String,
    #[serde(skip)]
    pub framework_config: FrameworkConfig,
}

/// A spec that failed to generate or export.
#[derive(Debug, Clone, Serialize)]
pub struct FailedTask {
    #[serde(flatten)]
    pub spec: TaskSpec,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of a session.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub session_id: String,
    pub session_dir: PathBuf,
    pub started_at: DateTime<Utc>,
    pub successful: Vec<SessionTask>,
    pub failed: Vec<FailedTask>,
}

impl SessionReport {
    pub fn total_requested(&self) -> usize {
        self.successful.len() + self.failed.len()
    }
}

#[derive(Serialize)]
struct ResultCounts {
    successful_tasks: usize,
    failed_tasks: usize,
    total_requested: usize,
}

#[derive(Serialize)]
struct Manifest<'a> {
    session_id: &'a str,
    timestamp: String,
    sampling_config: &'a [SampleEntry],
    output_config: &'a OutputSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    base_seed: Option<u64>,
    results: ResultCounts,
    successful_tasks: &'a [SessionTask],
    failed_tasks: &'a [FailedTask],
}

/// Session directory name: `session_<UTC timestamp>[_<name>]`.
pub fn session_id(started_at: DateTime<Utc>, name: Option<&str>) -> String {
    let stamp = started_at.format("%Y%m%d_%H%M%S");
    match name {
        Some(name) if !name.is_empty() => format!("session_{}_{}", stamp, name),
        _ => format!("session_{}", stamp),
    }
}

/// Runs sampling plans against one configuration.
pub struct SamplingSession {
    config: ForgeConfig,
    catalog: TaskCatalog,
    generator: Generator,
    writer: PackageWriter,
}

impl SamplingSession {
    pub fn new(config: ForgeConfig) -> Result<Self> {
        let generator = Generator::new(config.layout.clone())?;
        let mut writer = PackageWriter::new(config.layout.clone()).with_pretty(config.pretty_json);
        if let Some(base_url) = &config.reference_base_url {
            writer = writer.with_base_url(base_url.as_str());
        }
        Ok(Self {
            config,
            catalog: TaskCatalog::standard(),
            generator,
            writer,
        })
    }

    /// Builder method to restrict sampling to a custom catalog.
    pub fn with_catalog(mut self, catalog: TaskCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Runs `plan` and writes the session files.
    ///
    /// Only plan validation and session-level IO are fatal; per-task
    /// failures end up in [`SessionReport::failed`].
    pub fn run(&self, plan: &SamplingPlan) -> Result<SessionReport> {
        let specs = plan.expand(&self.catalog)?;
        info!(specs = specs.len(), "Sampling plan validated");

        let started_at = Utc::now();
        let session_id = session_id(started_at, plan.output.session_name.as_deref());
        let base_dir = plan
            .output
            .output_dir
            .clone()
            .unwrap_or_else(|| self.config.output_dir.clone());
        let session_dir = base_dir.join(&session_id);
        fs::create_dir_all(session_dir.join(TASKS_DIR))?;
        info!(session = %session_id, dir = %session_dir.display(), "Created session");

        let report = SessionReport {
            session_id,
            session_dir,
            started_at,
            successful: Vec::new(),
            failed: Vec::new(),
        };
        self.run_in(plan, &specs, report)
    }

    /// Generates `specs` into an existing session directory.
    fn run_in(
        &self,
        plan: &SamplingPlan,
        specs: &[TaskSpec],
        mut report: SessionReport,
    ) -> Result<SessionReport> {
        let base_seed = plan.base_seed.or(self.config.base_seed);
        for (index, spec) in specs.iter().enumerate() {
            let seed = base_seed.map(|base| base.wrapping_add(index as u64));
            match self.generate_one(spec, seed, &report.session_dir) {
                Ok(task) => {
                    info!(
                        index = index + 1,
                        total = specs.len(),
                        spec = %spec,
                        task_id = %task.task_id,
                        "Task generated"
                    );
                    report.successful.push(task);
                }
                Err(e) => {
                    warn!(spec = %spec, error = %e, "Task generation failed");
                    report.failed.push(FailedTask {
                        spec: *spec,
                        error: e.to_string(),
                        timestamp: Utc::now(),
                    });
                }
            }
        }

        self.write_session_files(plan, base_seed, &report)?;
        info!(
            session = %report.session_id,
            successful = report.successful.len(),
            failed = report.failed.len(),
            "Sampling session complete"
        );
        Ok(report)
    }

    fn generate_one(&self, spec: &TaskSpec, seed: Option<u64>, session_dir: &Path) -> Result<SessionTask> {
        let instance = self.generator.generate(spec.task_type, seed)?;
        let task_id = instance.task_id();
        let package_name = spec.package_name(&task_id);
        let package_dir = session_dir.join(TASKS_DIR).join(&package_name);
        let exported = self
            .writer
            .write(&instance, &package_dir, Some(serde_json::to_value(spec)?))?;

        Ok(SessionTask {
            task_id: task_id.to_string(),
            spec: *spec,
            seed: instance.seed,
            package_path: format!("{}/{}", TASKS_DIR, package_name),
            has_files: !exported.files.is_empty(),
            fingerprint: exported.fingerprint,
            framework_config: exported.framework_config,
        })
    }

    fn write_session_files(
        &self,
        plan: &SamplingPlan,
        base_seed: Option<u64>,
        report: &SessionReport,
    ) -> Result<()> {
        let manifest = Manifest {
            session_id: &report.session_id,
            timestamp: report.started_at.to_rfc3339(),
            sampling_config: &plan.sampling,
            output_config: &plan.output,
            base_seed,
            results: ResultCounts {
                successful_tasks: report.successful.len(),
                failed_tasks: report.failed.len(),
                total_requested: report.total_requested(),
            },
            successful_tasks: &report.successful,
            failed_tasks: &report.failed,
        };
        let configs: Vec<&FrameworkConfig> =
            report.successful.iter().map(|t| &t.framework_config).collect();

        self.write_json(&report.session_dir.join(MANIFEST_FILE), &manifest)?;
        self.write_json(&report.session_dir.join(SAMPLING_CONFIG_FILE), plan)?;
        self.write_json(&report.session_dir.join(FRAMEWORK_CONFIGS_FILE), &configs)?;
        Ok(())
    }

    fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        let text = if self.config.pretty_json {
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
    use chrono::TimeZone;
    use serde_json::Value;
    use tempfile::TempDir;

    const PLAN: &str = "\
sampling:
  - category: tabular_data_reporting
    levels: [1, 2]
    instances_per_task: 2
  - category: debugging_and_refactoring
    levels: [1, 3]
    task_types: [basic_python_syntax_fix]
    instances_per_task: 1
base_seed: 500
";

    fn plan_in(dir: &Path) -> SamplingPlan {
        let mut plan = SamplingPlan::from_yaml_str(PLAN).expect("parse");
        plan.output.output_dir = Some(dir.to_path_buf());
        plan.output.session_name = Some("unit".to_string());
        plan
    }

    #[test]
    fn test_expand_follows_plan_order() {
        let plan = SamplingPlan::from_yaml_str(PLAN).expect("parse");
        let specs = plan.expand(&TaskCatalog::standard()).expect("expand");
        let names: Vec<String> = specs.iter().map(|s| s.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "tabular_data_reporting.simple_data_transfer.L1.inst0",
                "tabular_data_reporting.simple_data_transfer.L1.inst1",
                "tabular_data_reporting.basic_data_aggregation.L2.inst0",
                "tabular_data_reporting.basic_data_aggregation.L2.inst1",
                "debugging_and_refactoring.basic_python_syntax_fix.L1.inst0",
            ]
        );
    }

    #[test]
    fn test_validation_errors() {
        let catalog = TaskCatalog::standard();
        let cases = [
            ("sampling: []\n", "at least one entry"),
            (
                "sampling:\n  - {category: image_processing, levels: [1], instances_per_task: 1}\n",
                "Unknown category 'image_processing'",
            ),
            (
                "sampling:\n  - {category: research_synthesis, levels: [4], instances_per_task: 1}\n",
                "Level 4 not supported",
            ),
            (
                "sampling:\n  - {category: research_synthesis, levels: [], instances_per_task: 1}\n",
                "non-empty list",
            ),
            (
                "sampling:\n  - {category: research_synthesis, levels: [1], instances_per_task: 0}\n",
                "instances_per_task",
            ),
            (
                "sampling:\n  - {category: research_synthesis, levels: [1], task_types: [multi_point_summary], instances_per_task: 1}\n",
                "Task type 'multi_point_summary' not available",
            ),
        ];
        for (yaml, needle) in cases {
            let plan = SamplingPlan::from_yaml_str(yaml).expect("parse");
            let err = plan.validate(&catalog).unwrap_err();
            assert!(err.to_string().contains(needle), "{} -> {}", needle, err);
        }
    }

    #[test]
    fn test_missing_field_is_a_parse_error() {
        let err = SamplingPlan::from_yaml_str("sampling:\n  - {category: research_synthesis, levels: [1]}\n")
            .unwrap_err();
        assert!(matches!(err, SessionError::Yaml(_)));
    }

    #[test]
    fn test_session_id_format() {
        let at = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).single().expect("valid time");
        assert_eq!(session_id(at, None), "session_20250304_050607");
        assert_eq!(session_id(at, Some("demo")), "session_20250304_050607_demo");
        assert_eq!(session_id(at, Some("")), "session_20250304_050607");
    }

    #[test]
    fn test_package_name() {
        let spec = TaskSpec {
            category: Category::ResearchSynthesis,
            task_type: TaskType::MultiPointSummary,
            level: 2,
            instance: 0,
        };
        let id = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").expect("uuid");
        assert_eq!(
            spec.package_name(&id),
            "task_67e55044_research_synthesis_multi_point_summary_L2_inst1"
        );
    }

    #[test]
    fn test_run_writes_session_files() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let session = SamplingSession::new(ForgeConfig::default()).expect("session");
        let report = session.run(&plan_in(temp_dir.path())).expect("run");

        assert_eq!(report.successful.len(), 5);
        assert!(report.failed.is_empty());
        assert!(report.session_id.ends_with("_unit"));
        assert_eq!(report.successful[0].seed, 500);
        assert_eq!(report.successful[4].seed, 504);

        for name in [MANIFEST_FILE, SAMPLING_CONFIG_FILE, FRAMEWORK_CONFIGS_FILE] {
            assert!(report.session_dir.join(name).exists(), "{}", name);
        }
        for task in &report.successful {
            let package = report.session_dir.join(&task.package_path);
            assert!(package.join("framework_config.json").exists());
            assert!(package.join("task_metadata.json").exists());
        }

        let manifest: Value = serde_json::from_str(
            &fs::read_to_string(report.session_dir.join(MANIFEST_FILE)).expect("read"),
        )
        .expect("parse");
        assert_eq!(manifest["results"]["successful_tasks"], 5);
        assert_eq!(manifest["results"]["total_requested"], 5);
        assert_eq!(manifest["successful_tasks"][2]["task_type"], "basic_data_aggregation");
        assert_eq!(manifest["successful_tasks"][2]["instance"], 0);

        let configs: Value = serde_json::from_str(
            &fs::read_to_string(report.session_dir.join(FRAMEWORK_CONFIGS_FILE)).expect("read"),
        )
        .expect("parse");
        assert_eq!(configs.as_array().map(Vec::len), Some(5));
    }

    #[test]
    fn test_failures_are_recorded_and_session_continues() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let plan = plan_in(temp_dir.path());
        let session = SamplingSession::new(ForgeConfig::default()).expect("session");
        let specs = plan.expand(&TaskCatalog::standard()).expect("expand");
        let session_dir = temp_dir.path().join("fixed");
        fs::create_dir_all(session_dir.join(TASKS_DIR)).expect("mkdir");

        // occupy the package path of the first task so its export fails
        let first = Generator::new(ForgeConfig::default().layout)
            .expect("generator")
            .generate(specs[0].task_type, Some(500))
            .expect("generate");
        let blocked = session_dir
            .join(TASKS_DIR)
            .join(specs[0].package_name(&first.task_id()));
        fs::write(&blocked, "occupied").expect("write");

        let report = SessionReport {
            session_id: "fixed".to_string(),
            session_dir: session_dir.clone(),
            started_at: Utc::now(),
            successful: Vec::new(),
            failed: Vec::new(),
        };
        let report = session.run_in(&plan, &specs, report).expect("run");
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.successful.len(), 4);
        assert_eq!(report.failed[0].spec, specs[0]);
        assert!(report.failed[0].error.contains("not a directory"));
        assert!(session_dir.join(MANIFEST_FILE).exists());
    }

    #[test]
    fn test_invalid_plan_generates_nothing() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let mut plan = plan_in(temp_dir.path());
        plan.sampling[1].task_types = Some(vec!["no_such_task".to_string()]);
        let session = SamplingSession::new(ForgeConfig::default()).expect("session");

        let err = session.run(&plan).unwrap_err();
        assert!(matches!(err, SessionError::InvalidPlan(_)));
        assert_eq!(fs::read_dir(temp_dir.path()).expect("read dir").count(), 0);
    }

    #[test]
    fn test_plan_from_json_file() {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let path = temp_dir.path().join("plan.json");
        fs::write(
            &path,
            r#"{"sampling": [{"category": "research_synthesis", "levels": [3], "instances_per_task": 2}]}"#,
        )
        .expect("write");
        let plan = SamplingPlan::from_file(&path).expect("load");
        let specs = plan.expand(&TaskCatalog::standard()).expect("expand");
        assert_eq!(specs.len(), 2);
        assert!(specs.iter().all(|s| s.task_type == TaskType::FileDownloadIntegration));
    }
}
