//! Compilation of task instances into evaluator specifications.

use crate::categories::TaskType;
use crate::error::CompileError;
use crate::evaluator::{
    CellRule, CheckPair, CompareMethod, ComparisonFunc, EvaluatorSpec, Expectation, PairOptions,
    Probe,
};
use crate::generator::instance::{ArtifactRole, GroundTruth, TaskInstance};
use crate::generator::research::TEXT_THRESHOLD;
use crate::setup::{self, ArtifactLocations};
use tracing::debug;

/// Result type alias for compiler operations.
pub type Result<T> = std::result::Result<T, CompileError>;

const EXISTS: &str = "Exists";

/// Turns a generated instance into the declarative checks the harness runs.
///
/// Pair order is fixed per task type: existence checks come before the
/// content checks that depend on them.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluatorCompiler;

impl EvaluatorCompiler {
    pub fn new() -> Self {
        Self
    }

    /// Compiles by task type name. An unknown name is fatal.
    pub fn compile_named(
        &self,
        task_type: &str,
        instance: &TaskInstance,
        refs: &ArtifactLocations,
    ) -> Result<EvaluatorSpec> {
        let task_type: TaskType = task_type
            .parse()
            .map_err(|_| CompileError::UnknownTaskType(task_type.to_string()))?;
        self.compile(task_type, instance, refs)
    }

    /// Builds the evaluator for `instance`.
    ///
    /// `refs` maps each hosted reference role to a location the harness can
    /// fetch. Nothing is executed here.
    pub fn compile(
        &self,
        task_type: TaskType,
        instance: &TaskInstance,
        refs: &ArtifactLocations,
    ) -> Result<EvaluatorSpec> {
        if instance.task_type != task_type {
            return Err(CompileError::TaskTypeMismatch {
                requested: task_type.to_string(),
                actual: instance.task_type.to_string(),
            });
        }

        let spec = match task_type {
            TaskType::BasicPythonSyntaxFix => self.program_output(instance)?,
            TaskType::SimpleLogicCompletion => self.output_file(instance, refs)?,
            TaskType::MultiFileConfigUpdate => self.config_update(instance, refs)?,
            TaskType::SimpleDataTransfer => self.cell(instance, refs, CompareMethod::Exact)?,
            TaskType::BasicDataAggregation => {
                self.cell(instance, refs, CompareMethod::Approx(0.01))?
            }
            TaskType::SimpleCalculationOutput => self.cell_and_output(instance, refs)?,
            TaskType::BasicWebExtraction
            | TaskType::MultiPointSummary
            | TaskType::FileDownloadIntegration => self.presentation(instance, refs)?,
        };

        let spec = spec.with_postconfig(setup::postconfig(task_type));
        debug!(
            task_type = %task_type,
            pairs = spec.len(),
            postconfig = spec.postconfig().len(),
            "Compiled evaluator"
        );
        Ok(spec)
    }

    fn program_output(&self, instance: &TaskInstance) -> Result<EvaluatorSpec> {
        let GroundTruth::ProgramOutput {
            workdir,
            script,
            stdout,
        } = &instance.ground_truth
        else {
            return Err(mismatch(instance));
        };
        let run = format!("cd {} && python {}", workdir, script);
        Ok(EvaluatorSpec::single(CheckPair::new(
            Probe::argv(&["/bin/bash", "-c", &run]),
            Expectation::literal(stdout.as_str()),
            ComparisonFunc::CompareAnswer,
        )))
    }

    fn output_file(&self, instance: &TaskInstance, refs: &ArtifactLocations) -> Result<EvaluatorSpec> {
        let GroundTruth::OutputFile { path, .. } = &instance.ground_truth else {
            return Err(mismatch(instance));
        };
        Ok(EvaluatorSpec::all_of(vec![
            exists_check(path),
            CheckPair::new(
                Probe::read_file(path.as_str(), "actual_output.txt"),
                reference(instance, refs, ArtifactRole::ExpectedOutputFile)?,
                ComparisonFunc::CompareFiles,
            )
            .with_options(PairOptions::text_file()),
        ]))
    }

    fn config_update(&self, instance: &TaskInstance, refs: &ArtifactLocations) -> Result<EvaluatorSpec> {
        let GroundTruth::ConfigUpdate {
            config_path,
            config_format,
            log_path,
            ..
        } = &instance.ground_truth
        else {
            return Err(mismatch(instance));
        };
        let extension = config_format.extension();
        Ok(EvaluatorSpec::all_of(vec![
            CheckPair::new(
                Probe::read_file(config_path.as_str(), format!("actual_config.{}", extension)),
                reference(instance, refs, ArtifactRole::ExpectedConfig)?,
                ComparisonFunc::CompareFiles,
            )
            .with_options(PairOptions {
                file_type: Some(extension.to_string()),
                ..PairOptions::default()
            }),
            exists_check(log_path),
            CheckPair::new(
                Probe::read_file(log_path.as_str(), "actual_log.txt"),
                reference(instance, refs, ArtifactRole::ExpectedLog)?,
                ComparisonFunc::CompareFiles,
            )
            .with_options(PairOptions::text_file()),
        ]))
    }

    fn cell(
        &self,
        instance: &TaskInstance,
        refs: &ArtifactLocations,
        method: CompareMethod,
    ) -> Result<EvaluatorSpec> {
        let GroundTruth::Cell {
            result_path,
            coordinate,
            value,
        } = &instance.ground_truth
        else {
            return Err(mismatch(instance));
        };
        let rule = CellRule {
            sheet_idx: 0,
            coordinate: coordinate.clone(),
            method,
            reference: *value,
        };
        Ok(EvaluatorSpec::single(table_check(
            instance,
            refs,
            result_path,
            rule,
        )?))
    }

    fn cell_and_output(&self, instance: &TaskInstance, refs: &ArtifactLocations) -> Result<EvaluatorSpec> {
        let GroundTruth::CellAndOutput {
            result_path,
            coordinate,
            value,
            output_path,
            output,
        } = &instance.ground_truth
        else {
            return Err(mismatch(instance));
        };
        let rule = CellRule {
            sheet_idx: 0,
            coordinate: coordinate.clone(),
            method: CompareMethod::Approx(0.1),
            reference: *value,
        };
        Ok(EvaluatorSpec::all_of(vec![
            table_check(instance, refs, result_path, rule)?,
            CheckPair::new(
                Probe::shell(format!("cat {}", output_path)),
                Expectation::literal(output.as_str()),
                ComparisonFunc::ExactMatch,
            ),
        ]))
    }

    fn presentation(&self, instance: &TaskInstance, refs: &ArtifactLocations) -> Result<EvaluatorSpec> {
        let GroundTruth::Presentation { path, .. } = &instance.ground_truth else {
            return Err(mismatch(instance));
        };
        let location = location(refs, ArtifactRole::PresentationSpec)?;
        required(instance, ArtifactRole::PresentationSpec)?;
        Ok(EvaluatorSpec::single(
            CheckPair::new(
                Probe::read_file(path.as_str(), "result_presentation.pptx"),
                Expectation::ReferenceArtifact {
                    location: location.to_string(),
                    dest: "expected_presentation.json".to_string(),
                },
                ComparisonFunc::EvaluatePresentationAgainstSpec,
            )
            .with_options(PairOptions {
                text_threshold: Some(TEXT_THRESHOLD),
                ..PairOptions::default()
            }),
        ))
    }
}

fn mismatch(instance: &TaskInstance) -> CompileError {
    CompileError::GroundTruthMismatch(instance.task_type.to_string())
}

fn exists_check(path: &str) -> CheckPair {
    CheckPair::new(
        Probe::shell(format!(
            "test -f {} && echo '{}' || echo 'Not Found'",
            path, EXISTS
        )),
        Expectation::literal(EXISTS),
        ComparisonFunc::ExactMatch,
    )
}

fn table_check(
    instance: &TaskInstance,
    refs: &ArtifactLocations,
    result_path: &str,
    rule: CellRule,
) -> Result<CheckPair> {
    let dest = result_path.rsplit('/').next().unwrap_or(result_path);
    Ok(CheckPair::new(
        Probe::read_file(result_path, dest),
        reference(instance, refs, ArtifactRole::ExpectedSpreadsheet)?,
        ComparisonFunc::CompareTable,
    )
    .with_options(PairOptions {
        debug: Some(true),
        rules: vec![rule],
        ..PairOptions::default()
    }))
}

/// A hosted reference, saved by the harness under the artifact's own name.
fn reference(instance: &TaskInstance, refs: &ArtifactLocations, role: ArtifactRole) -> Result<Expectation> {
    let location = location(refs, role)?;
    let artifact = required(instance, role)?;
    Ok(Expectation::ReferenceArtifact {
        location: location.to_string(),
        dest: artifact.filename.clone(),
    })
}

fn location(refs: &ArtifactLocations, role: ArtifactRole) -> Result<&str> {
    refs.get(&role)
        .map(String::as_str)
        .ok_or_else(|| CompileError::MissingReference(role.to_string()))
}

fn required(
    instance: &TaskInstance,
    role: ArtifactRole,
) -> Result<&crate::generator::instance::Artifact> {
    instance
        .artifact(role)
        .ok_or_else(|| CompileError::MissingArtifact {
            task_type: instance.task_type.to_string(),
            role: role.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::Conjunction;
    use crate::generator::{CellValue, Generator};
    use crate::setup::VmLayout;

    fn refs_for(instance: &TaskInstance) -> ArtifactLocations {
        instance
            .ground_truth_artifacts()
            .filter(|(role, _)| role.is_hosted_reference())
            .map(|(role, artifact)| (role, format!("https://store.example/{}", artifact.filename)))
            .collect()
    }

    fn compiled(task_type: TaskType, seed: u64) -> (TaskInstance, EvaluatorSpec) {
        let generator = Generator::new(VmLayout::default()).expect("generator");
        let instance = generator.generate(task_type, Some(seed)).expect("generate");
        let spec = EvaluatorCompiler::default()
            .compile(task_type, &instance, &refs_for(&instance))
            .expect("compile");
        (instance, spec)
    }

    #[test]
    fn test_shapes_per_task_type() {
        let expected = [
            (TaskType::BasicPythonSyntaxFix, 1),
            (TaskType::SimpleLogicCompletion, 2),
            (TaskType::MultiFileConfigUpdate, 3),
            (TaskType::SimpleDataTransfer, 1),
            (TaskType::BasicDataAggregation, 1),
            (TaskType::SimpleCalculationOutput, 2),
            (TaskType::BasicWebExtraction, 1),
            (TaskType::MultiPointSummary, 1),
            (TaskType::FileDownloadIntegration, 1),
        ];
        for (task_type, pairs) in expected {
            let (_, spec) = compiled(task_type, 11);
            assert_eq!(spec.len(), pairs, "{}", task_type);
            assert_eq!(spec.is_multi(), pairs > 1, "{}", task_type);
            if pairs > 1 {
                assert_eq!(spec.conjunction(), Some(Conjunction::And));
            }
        }
    }

    #[test]
    fn test_syntax_fix_runs_script_and_compares_stdout() {
        let (instance, spec) = compiled(TaskType::BasicPythonSyntaxFix, 4);
        let GroundTruth::ProgramOutput { script, stdout, .. } = &instance.ground_truth else {
            panic!("unexpected ground truth");
        };
        let Probe::RunCommand {
            command: crate::evaluator::CommandLine::Argv(args),
        } = &spec.probes()[0]
        else {
            panic!("expected argv command");
        };
        assert_eq!(args[0], "/bin/bash");
        assert_eq!(
            args[2],
            format!("cd /home/user/coding_tasks && python {}", script)
        );
        assert_eq!(spec.expectations()[0], Expectation::literal(stdout.as_str()));
        assert_eq!(spec.functions()[0], ComparisonFunc::CompareAnswer);
        assert!(spec.postconfig().is_empty());
    }

    #[test]
    fn test_existence_check_precedes_content_check() {
        let (_, spec) = compiled(TaskType::SimpleLogicCompletion, 6);
        assert_eq!(
            spec.functions(),
            &[ComparisonFunc::ExactMatch, ComparisonFunc::CompareFiles]
        );
        assert_eq!(spec.expectations()[0], Expectation::literal("Exists"));
        assert_eq!(spec.options()[1], PairOptions::text_file());

        let (_, spec) = compiled(TaskType::MultiFileConfigUpdate, 6);
        assert_eq!(
            spec.functions(),
            &[
                ComparisonFunc::CompareFiles,
                ComparisonFunc::ExactMatch,
                ComparisonFunc::CompareFiles
            ]
        );
        assert!(spec.options()[1].is_empty());
        assert_eq!(spec.options()[2].ignore_blanks, Some(true));
    }

    #[test]
    fn test_config_pair_names_file_type() {
        for seed in 0..10 {
            let (instance, spec) = compiled(TaskType::MultiFileConfigUpdate, seed);
            let GroundTruth::ConfigUpdate { config_format, .. } = &instance.ground_truth else {
                panic!("unexpected ground truth");
            };
            assert_eq!(
                spec.options()[0].file_type.as_deref(),
                Some(config_format.extension())
            );
        }
    }

    #[test]
    fn test_tabular_methods() {
        let (_, spec) = compiled(TaskType::SimpleDataTransfer, 2);
        assert_eq!(spec.options()[0].rules[0].method, CompareMethod::Exact);
        assert_eq!(spec.options()[0].debug, Some(true));

        let (_, spec) = compiled(TaskType::BasicDataAggregation, 2);
        assert_eq!(spec.options()[0].rules[0].method, CompareMethod::Approx(0.01));

        let (instance, spec) = compiled(TaskType::SimpleCalculationOutput, 2);
        assert_eq!(spec.options()[0].rules[0].method, CompareMethod::Approx(0.1));
        let GroundTruth::CellAndOutput { value, .. } = &instance.ground_truth else {
            panic!("unexpected ground truth");
        };
        assert_eq!(spec.expectations()[1], Expectation::literal(format!("{}\n", value)));
        assert_eq!(
            spec.probes()[1],
            Probe::shell("cat /home/user/Desktop/output.txt")
        );
        assert_eq!(spec.postconfig().len(), 1);
    }

    #[test]
    fn test_cell_rule_carries_ground_truth_value() {
        let (instance, spec) = compiled(TaskType::BasicDataAggregation, 31);
        let GroundTruth::Cell { coordinate, value, .. } = &instance.ground_truth else {
            panic!("unexpected ground truth");
        };
        let rule = &spec.options()[0].rules[0];
        assert_eq!(&rule.coordinate, coordinate);
        assert_eq!(&rule.reference, value);
        assert!(matches!(rule.reference, CellValue::Int(_) | CellValue::Float(_)));
    }

    #[test]
    fn test_presentation_pair() {
        let (instance, spec) = compiled(TaskType::FileDownloadIntegration, 5);
        let GroundTruth::Presentation { path, .. } = &instance.ground_truth else {
            panic!("unexpected ground truth");
        };
        assert_eq!(
            spec.probes()[0],
            Probe::read_file(path.as_str(), "result_presentation.pptx")
        );
        match &spec.expectations()[0] {
            Expectation::ReferenceArtifact { dest, location } => {
                assert_eq!(dest, "expected_presentation.json");
                assert!(location.starts_with("https://store.example/expected_presentation_"));
            }
            other => panic!("unexpected expectation {:?}", other),
        }
        assert_eq!(spec.options()[0].text_threshold, Some(0.8));
        assert_eq!(spec.postconfig().len(), 3);
    }

    #[test]
    fn test_missing_reference_is_fatal() {
        let generator = Generator::new(VmLayout::default()).expect("generator");
        let instance = generator
            .generate(TaskType::MultiFileConfigUpdate, Some(1))
            .expect("generate");
        let mut refs = refs_for(&instance);
        refs.remove(&ArtifactRole::ExpectedLog);
        let err = EvaluatorCompiler::default()
            .compile(TaskType::MultiFileConfigUpdate, &instance, &refs)
            .unwrap_err();
        assert!(matches!(err, CompileError::MissingReference(role) if role == "expected_log"));
    }

    #[test]
    fn test_wrong_task_type_is_rejected() {
        let (instance, _) = compiled(TaskType::SimpleDataTransfer, 3);
        let compiler = EvaluatorCompiler::default();
        let err = compiler
            .compile(TaskType::BasicDataAggregation, &instance, &refs_for(&instance))
            .unwrap_err();
        assert!(matches!(err, CompileError::TaskTypeMismatch { .. }));

        let err = compiler
            .compile_named("unknown_task", &instance, &refs_for(&instance))
            .unwrap_err();
        assert!(matches!(err, CompileError::UnknownTaskType(name) if name == "unknown_task"));
    }

    #[test]
    fn test_compile_is_idempotent() {
        let generator = Generator::new(VmLayout::default()).expect("generator");
        let compiler = EvaluatorCompiler::default();
        for task_type in TaskType::all() {
            let instance = generator.generate(task_type, Some(77)).expect("generate");
            let refs = refs_for(&instance);
            let a = compiler.compile(task_type, &instance, &refs).expect("first");
            let b = compiler.compile(task_type, &instance, &refs).expect("second");
            assert_eq!(a, b);
        }
    }
}
