//! Debugging and refactoring tasks.
//!
//! Every script produced here is Python. Expected output strings are derived
//! from the same values that are embedded in the script, so running the
//! reference program prints exactly the recorded stdout.

use crate::categories::TaskType;
use crate::corruption::FaultInjector;
use crate::error::GeneratorError;
use crate::generator::domains::{self, CodeDomain, ScriptVariant, CODE_DOMAINS};
use crate::generator::format::python_float;
use crate::generator::instance::{Artifact, ArtifactRole, ConfigFormat, GroundTruth, TaskInstance};
use crate::generator::rng::SeededRng;
use crate::generator::{Result, SelectionHints};
use crate::setup::VmLayout;
use std::collections::BTreeMap;
use tracing::warn;

const EXPECTED_STDOUT: &str = "expected_stdout.txt";

/// Names drawn from a code domain for one instance.
struct DomainContext {
    domain: &'static CodeDomain,
    variant: ScriptVariant,
    main_variable: &'static str,
    operation: &'static str,
    output_name: &'static str,
    prefix: &'static str,
}

fn select_context(rng: &mut SeededRng, hints: &SelectionHints) -> Result<DomainContext> {
    let domain = domains::select(rng, CODE_DOMAINS, hints.domain(), "code domain")?;
    let variant = *domains::select(rng, &ScriptVariant::ALL, hints.variant(), "script variant")?;
    Ok(DomainContext {
        domain,
        variant,
        main_variable: *rng.pick(domain.variables, "variables")?,
        operation: *rng.pick(domain.operations, "operations")?,
        output_name: *rng.pick(domain.outputs, "outputs")?,
        prefix: *rng.pick(domain.prefixes, "prefixes")?,
    })
}

/// Draws a variable stem using one of four naming patterns.
fn variable_stem(rng: &mut SeededRng, ctx: &DomainContext) -> Result<String> {
    let pool = ctx.domain;
    let stem = match rng.range(0..=3) {
        0 => rng.pick(pool.variables, "variables")?.to_string(),
        1 => {
            let prefix = rng.pick(pool.prefixes, "prefixes")?;
            let variable = rng.pick(pool.variables, "variables")?;
            format!("{}_{}", prefix, variable)
        }
        2 => format!("{}_{}", ctx.main_variable, rng.pick(pool.variables, "variables")?),
        _ => {
            let variable = rng.pick(pool.variables, "variables")?;
            format!("{}_{}", variable, rng.range(1..=99))
        }
    };
    Ok(stem)
}

/// A correct script and what it prints.
struct Script {
    source: String,
    stdout: String,
}

fn render_script(variant: ScriptVariant, var: &str, count: i64, noun: &str, operation: &str) -> Script {
    let processing = format!("Processing {}...", noun);
    let complete = format!("Complete: {} {} processed", count, noun);
    match variant {
        ScriptVariant::SimpleScript => Script {
            source: format!(
                "{var}_count = {count}\n\
                 if {var}_count > 0:\n\
                 \x20   print(f\"Processing {noun}...\")\n\
                 \x20   print(f\"Complete: {{{var}_count}} {noun} processed\")"
            ),
            stdout: format!("{}\n{}", processing, complete),
        },
        ScriptVariant::FunctionBased => Script {
            source: format!(
                "def {operation}_{noun}():\n\
                 \x20   {var}_count = {count}\n\
                 \x20   print(f\"Processing {noun}...\")\n\
                 \x20   print(f\"Complete: {{{var}_count}} {noun} processed\")\n\
                 \n\
                 {operation}_{noun}()"
            ),
            stdout: format!("{}\n{}", processing, complete),
        },
        ScriptVariant::DataProcessing => Script {
            source: format!(
                "{var}_list = list(range({count}))\n\
                 {var}_count = len({var}_list)\n\
                 print(f\"Processing {noun}...\")\n\
                 for item in {var}_list:\n\
                 \x20   pass\n\
                 print(f\"Complete: {{{var}_count}} {noun} processed\")"
            ),
            stdout: format!("{}\n{}", processing, complete),
        },
        ScriptVariant::Interactive => Script {
            source: format!(
                "print(\"Starting {operation} for {noun}\")\n\
                 {var}_count = {count}\n\
                 if {var}_count > 0:\n\
                 \x20   print(f\"Processing {noun}...\")\n\
                 \x20   print(f\"Complete: {{{var}_count}} {noun} processed\")\n\
                 else:\n\
                 \x20   print(\"No {noun} to process\")"
            ),
            stdout: format!(
                "Starting {} for {}\n{}\n{}",
                operation, noun, processing, complete
            ),
        },
    }
}

/// Level 1: a short script with exactly one injected fault.
pub fn syntax_fix(
    rng: &mut SeededRng,
    layout: &VmLayout,
    injector: &FaultInjector,
    hints: &SelectionHints,
) -> Result<TaskInstance> {
    let ctx = select_context(rng, hints)?;
    let script_name = format!("{}_{}_{}.py", ctx.prefix, ctx.operation, rng.range(100..=999));
    let stem = variable_stem(rng, &ctx)?;
    let count = rng.range(10..=100);
    let noun = rng.pick(ctx.domain.process_nouns, "process nouns")?;

    let script = render_script(ctx.variant, &stem, count, noun, ctx.operation);
    let outcome = injector.inject(rng, &script.source);
    let fault_class = match outcome.applied {
        Some(class) => class.as_str(),
        None => {
            warn!(
                script = %script_name,
                seed = rng.seed(),
                "No fault class applied; broken script equals the reference"
            );
            "none"
        }
    };

    let mut artifacts = BTreeMap::new();
    artifacts.insert(
        ArtifactRole::MainFile,
        Artifact::new(&script_name, outcome.content),
    );
    artifacts.insert(
        ArtifactRole::ReferenceSolution,
        Artifact::new(&script_name, script.source),
    );
    artifacts.insert(
        ArtifactRole::ExpectedOutput,
        Artifact::new(EXPECTED_STDOUT, script.stdout.clone()),
    );

    let mut details = BTreeMap::new();
    details.insert("fault_class".to_string(), fault_class.to_string());
    details.insert("output_name".to_string(), ctx.output_name.to_string());

    Ok(TaskInstance {
        task_type: TaskType::BasicPythonSyntaxFix,
        level: 1,
        seed: rng.seed(),
        domain: ctx.domain.name.to_string(),
        template_variant: ctx.variant.as_str().to_string(),
        artifacts,
        instructions: format!(
            "Ensure that the Python script located at {} runs successfully and produces the expected output. \
             This requires locating and resolving any syntax errors in the script before execution.",
            layout.coding_path(&script_name)
        ),
        ground_truth: GroundTruth::ProgramOutput {
            workdir: layout.coding_dir.clone(),
            script: script_name,
            stdout: script.stdout,
        },
        details,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arithmetic {
    Addition,
    Multiplication,
    Division,
}

impl Arithmetic {
    const ALL: [Arithmetic; 3] = [
        Arithmetic::Addition,
        Arithmetic::Multiplication,
        Arithmetic::Division,
    ];

    fn name(&self) -> &'static str {
        match self {
            Arithmetic::Addition => "addition",
            Arithmetic::Multiplication => "multiplication",
            Arithmetic::Division => "division",
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            Arithmetic::Addition => "add",
            Arithmetic::Multiplication => "multiply",
            Arithmetic::Division => "divide",
        }
    }

    fn statement(&self) -> &'static str {
        match self {
            Arithmetic::Addition => "result = num1 + num2",
            Arithmetic::Multiplication => "result = num1 * num2",
            Arithmetic::Division => "result = num1 / num2",
        }
    }

    /// The result as Python would print it. Division always yields a float.
    fn evaluate(&self, num1: i64, num2: i64) -> String {
        match self {
            Arithmetic::Addition => (num1 + num2).to_string(),
            Arithmetic::Multiplication => (num1 * num2).to_string(),
            Arithmetic::Division => python_float(num1 as f64 / num2 as f64),
        }
    }
}

fn calculator_source(
    op: Arithmetic,
    num1: i64,
    num2: i64,
    output_path: &str,
    output_name: &str,
    completed: bool,
) -> String {
    let calculation = if completed {
        format!("{}\n", op.statement())
    } else {
        String::new()
    };
    format!(
        "# Simple calculator program\n\
         num1 = {num1}\n\
         num2 = {num2}\n\
         \n\
         # TODO: Complete the calculation to {verb} num1 and num2\n\
         # Store the result in a variable called 'result'\n\
         {calculation}\
         \n\
         # Write result to file\n\
         with open(\"{output_path}\", \"w\") as f:\n\
         \x20   f.write(f\"Calculation result: {{result}}\")\n\
         \n\
         print(f\"Calculation completed. Result written to {output_name}\")",
        verb = op.verb(),
    )
}

/// Level 2: a calculator script missing the line that computes `result`.
pub fn logic_completion(
    rng: &mut SeededRng,
    layout: &VmLayout,
    hints: &SelectionHints,
) -> Result<TaskInstance> {
    let ctx = select_context(rng, hints)?;
    let script_name = format!("calculator_{}.py", rng.range(100..=999));
    let output_name = format!("results_{}.txt", rng.range(100..=999));
    let op = *rng.pick(&Arithmetic::ALL, "arithmetic operations")?;
    let num1 = rng.range(10..=50);
    let num2 = rng.range(2..=20);

    let output_path = layout.coding_path(&output_name);
    let broken = calculator_source(op, num1, num2, &output_path, &output_name, false);
    let correct = calculator_source(op, num1, num2, &output_path, &output_name, true);
    let expected_content = format!("Calculation result: {}", op.evaluate(num1, num2));
    let stdout = format!("Calculation completed. Result written to {}", output_name);

    let mut artifacts = BTreeMap::new();
    artifacts.insert(ArtifactRole::MainFile, Artifact::new(&script_name, broken));
    artifacts.insert(
        ArtifactRole::ReferenceSolution,
        Artifact::new(&script_name, correct),
    );
    artifacts.insert(
        ArtifactRole::ExpectedOutputFile,
        Artifact::new(format!("expected_{}", output_name), expected_content.clone()),
    );
    artifacts.insert(ArtifactRole::ExpectedOutput, Artifact::new(EXPECTED_STDOUT, stdout));

    let mut details = BTreeMap::new();
    details.insert("operation".to_string(), op.name().to_string());

    Ok(TaskInstance {
        task_type: TaskType::SimpleLogicCompletion,
        level: 2,
        seed: rng.seed(),
        domain: ctx.domain.name.to_string(),
        template_variant: ctx.variant.as_str().to_string(),
        artifacts,
        instructions: format!(
            "Complete the Python script at {} by implementing the missing logic in the TODO section \
             to perform the required calculation. Ensure the script executes successfully and creates \
             the output file '{}' with the correct calculated value.",
            layout.coding_path(&script_name),
            output_name
        ),
        ground_truth: GroundTruth::OutputFile {
            path: output_path,
            content: expected_content,
        },
        details,
    })
}

/// Values written to the application config.
struct AppConfig<'a> {
    timeout: i64,
    max_connections: i64,
    version: &'a str,
    log_level: &'a str,
}

fn render_config(format: ConfigFormat, config: &AppConfig<'_>) -> String {
    match format {
        ConfigFormat::Json => format!(
            "{{\n    \"timeout\": {},\n    \"max_connections\": {},\n    \"version\": \"{}\",\n    \"log_level\": \"{}\"\n}}",
            config.timeout, config.max_connections, config.version, config.log_level
        ),
        ConfigFormat::Ini => format!(
            "[system]\ntimeout = {}\nmax_connections = {}\n\n[application]\nversion = {}\nlog_level = {}",
            config.timeout, config.max_connections, config.version, config.log_level
        ),
    }
}

fn loader_source(format: ConfigFormat, config_path: &str, log_path: &str, log_name: &str) -> String {
    let (import, load, timeout, max_connections, version) = match format {
        ConfigFormat::Json => (
            "import json",
            format!("with open(\"{config_path}\", \"r\") as f:\n    config = json.load(f)"),
            "config[\"timeout\"]",
            "config['max_connections']",
            "config['version']",
        ),
        ConfigFormat::Ini => (
            "import configparser",
            format!("config = configparser.ConfigParser()\nconfig.read(\"{config_path}\")"),
            "int(config['system']['timeout'])",
            "config['system']['max_connections']",
            "config['application']['version']",
        ),
    };
    format!(
        "{import}\n\
         \n\
         # Load configuration\n\
         {load}\n\
         \n\
         # Use configuration\n\
         timeout = {timeout}\n\
         print(f\"Configuration loaded successfully: timeout={{timeout}}\")\n\
         \n\
         # Create log file with configuration info\n\
         with open(\"{log_path}\", \"w\") as f:\n\
         \x20   f.write(f\"System initialized with timeout: {{timeout}} seconds\\n\")\n\
         \x20   f.write(f\"Max connections: {{{max_connections}}}\\n\")\n\
         \x20   f.write(f\"Version: {{{version}}}\\n\")\n\
         \n\
         print(f\"Log file created: {log_name}\")"
    )
}

const APP_VERSIONS: &[&str] = &["2.1", "2.2", "2.3", "3.0"];
const LOG_LEVELS: &[&str] = &["INFO", "DEBUG", "WARNING"];
const CONFIG_FORMATS: [ConfigFormat; 2] = [ConfigFormat::Json, ConfigFormat::Ini];

/// Level 3: update a config value so that an unchanged loader writes a log.
///
/// The new timeout is the single propagated value: it appears in the expected
/// config, the expected log and the expected stdout, and nowhere else.
pub fn config_update(
    rng: &mut SeededRng,
    layout: &VmLayout,
    hints: &SelectionHints,
) -> Result<TaskInstance> {
    let ctx = select_context(rng, hints)?;
    let script_name = format!("config_loader_{}.py", rng.range(100..=999));
    let log_name = format!("system_log_{}.txt", rng.range(100..=999));
    let old_timeout = rng.range(30..=50);
    let new_timeout = rng.range(60..=90);
    let max_connections = rng.range(50..=100);
    let version = *rng.pick(APP_VERSIONS, "app versions")?;
    let log_level = *rng.pick(LOG_LEVELS, "log levels")?;
    let format = *rng.pick(&CONFIG_FORMATS, "config formats")?;
    let config_name = format!("app_config_{}.{}", rng.range(100..=999), format.extension());

    if new_timeout == old_timeout || version.is_empty() || log_level.is_empty() {
        return Err(GeneratorError::Inconsistent(format!(
            "config update needs distinct timeouts and non-empty fields (old={}, new={})",
            old_timeout, new_timeout
        )));
    }

    let before = AppConfig {
        timeout: old_timeout,
        max_connections,
        version,
        log_level,
    };
    let after = AppConfig {
        timeout: new_timeout,
        ..before
    };

    let config_path = layout.coding_path(&config_name);
    let log_path = layout.coding_path(&log_name);
    let script = loader_source(format, &config_path, &log_path, &log_name);
    let log_content = format!(
        "System initialized with timeout: {} seconds\nMax connections: {}\nVersion: {}\n",
        new_timeout, max_connections, version
    );
    let stdout = format!(
        "Configuration loaded successfully: timeout={}\nLog file created: {}",
        new_timeout, log_name
    );

    let mut artifacts = BTreeMap::new();
    artifacts.insert(ArtifactRole::MainFile, Artifact::new(&script_name, script));
    artifacts.insert(
        ArtifactRole::ConfigFile,
        Artifact::new(&config_name, render_config(format, &before)),
    );
    artifacts.insert(
        ArtifactRole::ExpectedConfig,
        Artifact::new(format!("expected_{}", config_name), render_config(format, &after)),
    );
    artifacts.insert(
        ArtifactRole::ExpectedLog,
        Artifact::new(format!("expected_{}", log_name), log_content.clone()),
    );
    artifacts.insert(ArtifactRole::ExpectedOutput, Artifact::new(EXPECTED_STDOUT, stdout));

    Ok(TaskInstance {
        task_type: TaskType::MultiFileConfigUpdate,
        level: 3,
        seed: rng.seed(),
        domain: ctx.domain.name.to_string(),
        template_variant: ctx.variant.as_str().to_string(),
        artifacts,
        instructions: format!(
            "Update the configuration file at {} by changing the 'timeout' value to {}. \
             Then ensure the Python script {} executes successfully, reads the updated configuration, \
             and creates a log file with the new timeout value.",
            config_path,
            new_timeout,
            layout.coding_path(&script_name)
        ),
        ground_truth: GroundTruth::ConfigUpdate {
            config_path,
            config_format: format,
            old_timeout,
            new_timeout,
            log_path,
            log_content,
        },
        details: BTreeMap::new(),
    })
}
