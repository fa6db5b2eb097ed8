//! Rendering an [`EvaluatorSpec`] in the harness's configuration schema.
//!
//! A single pair renders as scalar `func`/`result`/`expected`/`options`
//! entries; several pairs render as parallel arrays joined by `conj`.

use crate::evaluator::{CellRule, CommandLine, EvaluatorSpec, Expectation, PairOptions, Probe};
use serde_json::{json, Map, Value};

pub fn to_harness_json(spec: &EvaluatorSpec) -> Value {
    let mut config = Map::new();

    if !spec.postconfig().is_empty() {
        config.insert("postconfig".to_string(), json!(spec.postconfig()));
    }

    let funcs: Vec<Value> = spec.functions().iter().map(|f| json!(f.as_str())).collect();
    let results: Vec<Value> = spec.probes().iter().map(probe_json).collect();
    let expected: Vec<Value> = spec.expectations().iter().map(expectation_json).collect();

    match spec.conjunction() {
        None => {
            if let (Some(func), Some(result), Some(expected)) =
                (funcs.first(), results.first(), expected.first())
            {
                config.insert("func".to_string(), func.clone());
                config.insert("result".to_string(), result.clone());
                config.insert("expected".to_string(), expected.clone());
            }
            if let Some(options) = spec.options().first().filter(|o| !o.is_empty()) {
                config.insert("options".to_string(), options_json(options));
            }
        }
        Some(conjunction) => {
            config.insert("func".to_string(), Value::Array(funcs));
            config.insert("result".to_string(), Value::Array(results));
            config.insert("expected".to_string(), Value::Array(expected));
            if spec.options().iter().any(|o| !o.is_empty()) {
                let options = spec.options().iter().map(options_json).collect();
                config.insert("options".to_string(), Value::Array(options));
            }
            config.insert("conj".to_string(), json!(conjunction));
        }
    }

    Value::Object(config)
}

fn probe_json(probe: &Probe) -> Value {
    match probe {
        Probe::ReadFile { path, dest } => json!({
            "type": "vm_file",
            "path": path,
            "dest": dest,
        }),
        Probe::RunCommand {
            command: CommandLine::Argv(args),
        } => json!({
            "type": "vm_command_line",
            "command": args,
        }),
        Probe::RunCommand {
            command: CommandLine::Shell(line),
        } => json!({
            "type": "vm_command_line",
            "command": line,
            "shell": true,
        }),
    }
}

fn expectation_json(expectation: &Expectation) -> Value {
    match expectation {
        Expectation::Literal { value } => json!({
            "type": "rule",
            "rules": { "expected": value },
        }),
        Expectation::ReferenceArtifact { location, dest } => json!({
            "type": "cloud_file",
            "path": location,
            "dest": dest,
        }),
    }
}

fn rule_json(rule: &CellRule) -> Value {
    json!({
        "type": "check_cell",
        "sheet_idx": rule.sheet_idx,
        "coordinate": rule.coordinate,
        "props": {
            "value": {
                "method": rule.method.as_harness_str(),
                "ref": rule.reference,
            }
        },
    })
}

fn options_json(options: &PairOptions) -> Value {
    let mut map = Map::new();
    if let Some(file_type) = &options.file_type {
        map.insert("file_type".to_string(), json!(file_type));
    }
    if let Some(ignore_blanks) = options.ignore_blanks {
        map.insert("ignore_blanks".to_string(), json!(ignore_blanks));
    }
    if let Some(debug) = options.debug {
        map.insert("debug".to_string(), json!(debug));
    }
    if let Some(threshold) = options.text_threshold {
        map.insert("text_threshold".to_string(), json!(threshold));
    }
    if !options.rules.is_empty() {
        let rules = options.rules.iter().map(rule_json).collect();
        map.insert("rules".to_string(), Value::Array(rules));
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::TaskType;
    use crate::evaluator::{CheckPair, CompareMethod, ComparisonFunc, EvaluatorCompiler};
    use crate::generator::{CellValue, Generator, TaskInstance};
    use crate::setup::{ArtifactLocations, VmLayout};

    fn harness_for(task_type: TaskType, seed: u64) -> (TaskInstance, Value) {
        let generator = Generator::new(VmLayout::default()).expect("generator");
        let instance = generator.generate(task_type, Some(seed)).expect("generate");
        let refs: ArtifactLocations = instance
            .ground_truth_artifacts()
            .filter(|(role, _)| role.is_hosted_reference())
            .map(|(role, artifact)| (role, format!("https://store.example/{}", artifact.filename)))
            .collect();
        let spec = EvaluatorCompiler::new()
            .compile(task_type, &instance, &refs)
            .expect("compile");
        (instance, to_harness_json(&spec))
    }

    #[test]
    fn test_single_pair_renders_scalars() {
        let (instance, json) = harness_for(TaskType::BasicPythonSyntaxFix, 3);
        assert_eq!(json["func"], "compare_answer");
        assert_eq!(json["result"]["type"], "vm_command_line");
        assert!(json["result"]["command"].is_array());
        assert_eq!(json["expected"]["type"], "rule");
        if let crate::generator::GroundTruth::ProgramOutput { stdout, .. } = &instance.ground_truth {
            assert_eq!(json["expected"]["rules"]["expected"], stdout.as_str());
        }
        assert!(json.get("conj").is_none());
        assert!(json.get("options").is_none());
        assert!(json.get("postconfig").is_none());
    }

    #[test]
    fn test_multi_pair_renders_arrays() {
        let (_, json) = harness_for(TaskType::MultiFileConfigUpdate, 3);
        assert_eq!(json["conj"], "and");
        assert_eq!(
            json["func"],
            json!(["compare_files", "exact_match", "compare_files"])
        );
        assert_eq!(json["result"][1]["shell"], true);
        assert_eq!(json["expected"][1], json!({"type": "rule", "rules": {"expected": "Exists"}}));
        assert_eq!(json["expected"][2]["type"], "cloud_file");
        assert_eq!(json["options"][1], json!({}));
        assert_eq!(json["options"][2], json!({"file_type": "text", "ignore_blanks": true}));
    }

    #[test]
    fn test_table_rule_schema() {
        let (_, json) = harness_for(TaskType::BasicDataAggregation, 8);
        assert_eq!(json["postconfig"][0]["type"], "sleep");
        assert_eq!(json["options"]["debug"], true);
        let rule = &json["options"]["rules"][0];
        assert_eq!(rule["type"], "check_cell");
        assert_eq!(rule["sheet_idx"], 0);
        assert_eq!(rule["props"]["value"]["method"], "approx:0.01");
        assert_eq!(json["result"]["dest"], "result.xlsx");
    }

    #[test]
    fn test_research_config() {
        let (_, json) = harness_for(TaskType::MultiPointSummary, 12);
        assert_eq!(json["func"], "evaluate_presentation_against_spec");
        assert_eq!(json["options"], json!({"text_threshold": 0.8}));
        assert_eq!(json["expected"]["dest"], "expected_presentation.json");
        assert_eq!(json["postconfig"][0]["type"], "activate_window");
        assert_eq!(json["postconfig"][0]["parameters"]["window_name"], "LibreOffice Impress");
    }

    #[test]
    fn test_options_omitted_when_all_pairs_are_plain() {
        let pair = || {
            CheckPair::new(
                Probe::shell("echo ok"),
                Expectation::literal("ok"),
                ComparisonFunc::ExactMatch,
            )
        };
        let json = to_harness_json(&EvaluatorSpec::all_of(vec![pair(), pair()]));
        assert!(json.get("options").is_none());
        assert_eq!(json["func"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_rule_ref_keeps_numeric_type() {
        let rule = CellRule {
            sheet_idx: 0,
            coordinate: "B4".to_string(),
            method: CompareMethod::Exact,
            reference: CellValue::Float(20.0),
        };
        let json = rule_json(&rule);
        assert_eq!(json["props"]["value"]["ref"], 20.0);
        assert_eq!(json["props"]["value"]["method"], "eq");
    }
}
