//! CLI command definitions for deskforge.
//!
//! Every command is synchronous: generation, compilation and export are pure
//! computation plus local file IO.

use crate::categories::TaskCatalog;
use crate::evaluator::{to_harness_json, EvaluatorCompiler};
use crate::export::{package_relative_path, PackageWriter};
use crate::generator::{Generator, SelectionHints, TaskInstance};
use crate::pipeline::{ForgeConfig, SamplingPlan, SamplingSession};
use crate::setup::ArtifactLocations;
use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default output directory for generated task packages.
const DEFAULT_OUTPUT_DIR: &str = "./generated-tasks";

/// Deterministic desktop-automation benchmark task generator.
#[derive(Parser)]
#[command(name = "deskforge")]
#[command(about = "Generate reproducible desktop-automation benchmark tasks")]
#[command(version)]
#[command(
    long_about = "deskforge generates seeded desktop-automation tasks (Python debugging, spreadsheet reporting and web research) together with their reference artifacts and harness evaluator configuration.\n\nExample usage:\n  deskforge generate basic_python_syntax_fix --seed 42 --output ./generated-tasks\n  deskforge sample sampling.yaml --base-seed 1000"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,

    /// YAML configuration file. `DESKFORGE_*` variables override its values.
    #[arg(short, long, global = true, env = "DESKFORGE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate one task instance and write its package.
    #[command(alias = "gen")]
    Generate(GenerateArgs),

    /// Print the harness evaluator configuration of a task instance.
    Compile(CompileArgs),

    /// List categories, levels and task types.
    #[command(alias = "ls")]
    List(ListArgs),

    /// Run a sampling plan and write a session directory.
    Sample(SampleArgs),
}

/// Arguments for the generate command.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Task type name (e.g. basic_python_syntax_fix).
    pub task_type: String,

    /// Seed for reproducible generation. Drawn from entropy when omitted.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Preferred domain or scenario; ignored when it names no catalog entry.
    #[arg(short, long)]
    pub domain: Option<String>,

    /// Preferred template variant; ignored when it names no catalog entry.
    #[arg(long)]
    pub variant: Option<String>,

    /// Output directory; the package lands in a subdirectory named after the task id.
    #[arg(short = 'o', long, env = "DESKFORGE_OUTPUT_DIR")]
    pub output: Option<String>,

    /// Base URL under which packages are mirrored. Defaults to file:// locations.
    #[arg(long, env = "DESKFORGE_REFERENCE_BASE_URL")]
    pub base_url: Option<String>,

    /// Output JSON to stdout instead of a summary.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for the compile command.
#[derive(Parser, Debug)]
pub struct CompileArgs {
    /// Task type name the instance must have.
    pub task_type: String,

    /// Instance JSON file. A fresh instance is generated when omitted.
    #[arg(short, long)]
    pub instance: Option<PathBuf>,

    /// Seed used when generating a fresh instance.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// JSON object mapping artifact roles to reference locations.
    #[arg(short, long)]
    pub refs: Option<PathBuf>,

    /// Base URL for derived reference locations when no refs file is given.
    #[arg(long, env = "DESKFORGE_REFERENCE_BASE_URL")]
    pub base_url: Option<String>,
}

/// Arguments for the list command.
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only show this category.
    #[arg(short = 'C', long)]
    pub category: Option<String>,

    /// Output JSON to stdout instead of a table.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for the sample command.
#[derive(Parser, Debug)]
pub struct SampleArgs {
    /// Sampling plan file (YAML, or JSON with a .json extension).
    pub plan: PathBuf,

    /// Output directory; overrides the plan's output.output_dir.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Seed of the first instance; overrides the plan's base_seed.
    #[arg(long)]
    pub base_seed: Option<u64>,

    /// Output the manifest summary as JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Summary printed by `generate --json`.
#[derive(Debug, Serialize)]
struct GeneratedTaskOutput {
    task_id: String,
    task_type: String,
    level: u8,
    seed: u64,
    domain: String,
    template_variant: String,
    fingerprint: String,
    package_dir: String,
    files: Vec<String>,
}

/// Parse CLI arguments and return the Cli struct.
///
/// This allows main.rs to access CLI arguments (like log_level) before running commands.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
///
/// For more control over logging initialization, use `parse_cli()` and `run_with_cli()`.
pub fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli())
}

/// Run the CLI with the parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Generate(args) => run_generate_command(args, config),
        Commands::Compile(args) => run_compile_command(args, config),
        Commands::List(args) => run_list_command(args),
        Commands::Sample(args) => run_sample_command(args, config),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ForgeConfig> {
    let config = match path {
        Some(path) => ForgeConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ForgeConfig::from_env()?,
    };
    Ok(config)
}

// ============================================================================
// Generate
// ============================================================================

fn run_generate_command(args: GenerateArgs, config: ForgeConfig) -> anyhow::Result<()> {
    let catalog = TaskCatalog::standard();
    let task_type = catalog.resolve(&args.task_type)?;

    let mut hints = SelectionHints::new();
    if let Some(domain) = &args.domain {
        hints = hints.with_domain(domain.as_str());
    }
    if let Some(variant) = &args.variant {
        hints = hints.with_variant(variant.as_str());
    }

    let generator = Generator::new(config.layout.clone())?;
    let instance = generator.generate_with(task_type, args.seed, &hints)?;

    let output_dir = args
        .output
        .map(PathBuf::from)
        .unwrap_or_else(|| config.output_dir.clone());
    let package_dir = output_dir.join(instance.task_id().to_string());

    let mut writer = PackageWriter::new(config.layout.clone()).with_pretty(config.pretty_json);
    if let Some(base_url) = args.base_url.or(config.reference_base_url) {
        writer = writer.with_base_url(base_url);
    }
    let exported = writer.write(&instance, &package_dir, None)?;

    if args.json {
        let output = GeneratedTaskOutput {
            task_id: exported.task_id.to_string(),
            task_type: instance.task_type.to_string(),
            level: instance.level,
            seed: instance.seed,
            domain: instance.domain.clone(),
            template_variant: instance.template_variant.clone(),
            fingerprint: exported.fingerprint.clone(),
            package_dir: exported.package_dir.display().to_string(),
            files: exported
                .files
                .iter()
                .map(|f| f.display().to_string())
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Generated {} (seed {})", instance.task_type, instance.seed);
        println!("  Task id:   {}", exported.task_id);
        println!("  Domain:    {} / {}", instance.domain, instance.template_variant);
        println!("  Package:   {}", exported.package_dir.display());
        println!("  Files:     {}", exported.files.len());
        println!(
            "  Task:      {}",
            exported.framework_config.instruction_preview()
        );
    }
    Ok(())
}

// ============================================================================
// Compile
// ============================================================================

fn run_compile_command(args: CompileArgs, config: ForgeConfig) -> anyhow::Result<()> {
    let instance: TaskInstance = match &args.instance {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read instance {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Invalid instance JSON in {}", path.display()))?
        }
        None => {
            let task_type = TaskCatalog::standard().resolve(&args.task_type)?;
            Generator::new(config.layout.clone())?.generate(task_type, args.seed)?
        }
    };

    let locations: ArtifactLocations = match &args.refs {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read refs {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Invalid refs JSON in {}", path.display()))?
        }
        None => derived_locations(&instance, args.base_url.or(config.reference_base_url)),
    };

    let spec = EvaluatorCompiler::new().compile_named(&args.task_type, &instance, &locations)?;
    info!(
        task_type = %instance.task_type,
        seed = instance.seed,
        pairs = spec.len(),
        "Compiled evaluator"
    );
    println!("{}", serde_json::to_string_pretty(&to_harness_json(&spec))?);
    Ok(())
}

/// Locations the instance's artifacts would have inside an exported package.
fn derived_locations(instance: &TaskInstance, base_url: Option<String>) -> ArtifactLocations {
    let task_id = instance.task_id();
    instance
        .artifacts
        .iter()
        .map(|(role, artifact)| {
            let relative = package_relative_path(*role, &artifact.filename);
            let location = match &base_url {
                Some(base) => format!("{}/{}/{}", base.trim_end_matches('/'), task_id, relative),
                None => relative,
            };
            (*role, location)
        })
        .collect()
}

// ============================================================================
// List
// ============================================================================

fn run_list_command(args: ListArgs) -> anyhow::Result<()> {
    let catalog = TaskCatalog::standard();
    let mut described = catalog.describe();
    if let Some(category) = &args.category {
        let category: crate::categories::Category = category.parse()?;
        described.retain(|name, _| name == category.as_str());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&described)?);
        return Ok(());
    }

    for (category, levels) in &described {
        println!("{}", category);
        for (level, task_types) in levels {
            println!("  L{}: {}", level, task_types.join(", "));
        }
    }
    Ok(())
}

// ============================================================================
// Sample
// ============================================================================

fn run_sample_command(args: SampleArgs, config: ForgeConfig) -> anyhow::Result<()> {
    let mut plan = SamplingPlan::from_file(&args.plan)
        .with_context(|| format!("Failed to load sampling plan {}", args.plan.display()))?;
    if let Some(output) = args.output {
        plan.output.output_dir = Some(output);
    }
    if let Some(seed) = args.base_seed {
        plan.base_seed = Some(seed);
    }

    let report = SamplingSession::new(config)?.run(&plan)?;

    if args.json {
        let summary = serde_json::json!({
            "session_id": report.session_id,
            "session_dir": report.session_dir.display().to_string(),
            "total_requested": report.total_requested(),
            "successful": report.successful.len(),
            "failed": report.failed.len(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Session {}", report.session_id);
        println!("  Directory:  {}", report.session_dir.display());
        println!(
            "  Generated:  {}/{}",
            report.successful.len(),
            report.total_requested()
        );
        for failed in &report.failed {
            println!("  Failed:     {}: {}", failed.spec, failed.error);
        }
    }
    Ok(())
}
