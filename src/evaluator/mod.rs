//! Evaluator specifications.
//!
//! An [`EvaluatorSpec`] is a declarative list of probe/expectation pairs the
//! external harness runs after the agent finishes. Nothing here executes a
//! probe; the compiler only describes how to acquire and compare values.

pub mod compiler;
pub mod harness;

pub use compiler::EvaluatorCompiler;
pub use harness::to_harness_json;

use crate::generator::CellValue;
use crate::setup::SetupStep;
use serde::Serialize;

/// A command to run in the target environment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandLine {
    /// Executed directly.
    Argv(Vec<String>),
    /// Executed through a shell.
    Shell(String),
}

/// How the harness acquires the observed value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Probe {
    /// Copy `path` out of the environment, saving it locally as `dest`.
    ReadFile { path: String, dest: String },
    /// Run a command and capture its stdout.
    RunCommand { command: CommandLine },
}

impl Probe {
    pub fn read_file(path: impl Into<String>, dest: impl Into<String>) -> Self {
        Probe::ReadFile {
            path: path.into(),
            dest: dest.into(),
        }
    }

    pub fn argv(args: &[&str]) -> Self {
        Probe::RunCommand {
            command: CommandLine::Argv(args.iter().map(|a| a.to_string()).collect()),
        }
    }

    pub fn shell(command: impl Into<String>) -> Self {
        Probe::RunCommand {
            command: CommandLine::Shell(command.into()),
        }
    }
}

/// What the observed value is compared against.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Expectation {
    Literal { value: String },
    /// A hosted artifact, fetched by the harness and saved as `dest`.
    ReferenceArtifact { location: String, dest: String },
}

impl Expectation {
    pub fn literal(value: impl Into<String>) -> Self {
        Expectation::Literal {
            value: value.into(),
        }
    }
}

/// Comparison function names understood by the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonFunc {
    CompareAnswer,
    ExactMatch,
    CompareFiles,
    CompareTable,
    EvaluatePresentationAgainstSpec,
}

impl ComparisonFunc {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonFunc::CompareAnswer => "compare_answer",
            ComparisonFunc::ExactMatch => "exact_match",
            ComparisonFunc::CompareFiles => "compare_files",
            ComparisonFunc::CompareTable => "compare_table",
            ComparisonFunc::EvaluatePresentationAgainstSpec => "evaluate_presentation_against_spec",
        }
    }
}

/// How a spreadsheet cell is compared with its reference value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompareMethod {
    Exact,
    /// Absolute tolerance.
    Approx(f64),
}

impl CompareMethod {
    /// Harness spelling: `eq` or `approx:<tolerance>`.
    pub fn as_harness_str(&self) -> String {
        match self {
            CompareMethod::Exact => "eq".to_string(),
            CompareMethod::Approx(tolerance) => format!("approx:{}", tolerance),
        }
    }
}

impl Serialize for CompareMethod {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_harness_str())
    }
}

/// A check on one cell of a result workbook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellRule {
    pub sheet_idx: usize,
    pub coordinate: String,
    pub method: CompareMethod,
    pub reference: CellValue,
}

/// Per-pair comparison parameters. Unset fields are not emitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PairOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_blanks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<CellRule>,
}

impl PairOptions {
    pub fn is_empty(&self) -> bool {
        self == &PairOptions::default()
    }

    /// Whole-file text comparison that ignores blank lines and trailing space.
    pub fn text_file() -> Self {
        Self {
            file_type: Some("text".to_string()),
            ignore_blanks: Some(true),
            ..Self::default()
        }
    }
}

/// How pair results combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Conjunction {
    And,
}

/// One probe, its expectation and how to compare them.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckPair {
    pub probe: Probe,
    pub expectation: Expectation,
    pub func: ComparisonFunc,
    pub options: PairOptions,
}

impl CheckPair {
    pub fn new(probe: Probe, expectation: Expectation, func: ComparisonFunc) -> Self {
        Self {
            probe,
            expectation,
            func,
            options: PairOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PairOptions) -> Self {
        self.options = options;
        self
    }
}

/// Compiled verification descriptor for one task instance.
///
/// The pair sequences are kept private so that their lengths always agree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluatorSpec {
    probes: Vec<Probe>,
    expectations: Vec<Expectation>,
    functions: Vec<ComparisonFunc>,
    options: Vec<PairOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    conjunction: Option<Conjunction>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    postconfig: Vec<SetupStep>,
}

impl EvaluatorSpec {
    /// A single pair with no conjunction.
    pub fn single(pair: CheckPair) -> Self {
        Self::from_pairs(vec![pair], None)
    }

    /// Several pairs, all of which must pass. One pair degenerates to
    /// [`EvaluatorSpec::single`].
    pub fn all_of(pairs: Vec<CheckPair>) -> Self {
        let conjunction = (pairs.len() > 1).then_some(Conjunction::And);
        Self::from_pairs(pairs, conjunction)
    }

    fn from_pairs(pairs: Vec<CheckPair>, conjunction: Option<Conjunction>) -> Self {
        let mut spec = Self {
            probes: Vec::with_capacity(pairs.len()),
            expectations: Vec::with_capacity(pairs.len()),
            functions: Vec::with_capacity(pairs.len()),
            options: Vec::with_capacity(pairs.len()),
            conjunction,
            postconfig: Vec::new(),
        };
        for pair in pairs {
            spec.probes.push(pair.probe);
            spec.expectations.push(pair.expectation);
            spec.functions.push(pair.func);
            spec.options.push(pair.options);
        }
        spec
    }

    pub fn with_postconfig(mut self, steps: Vec<SetupStep>) -> Self {
        self.postconfig = steps;
        self
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    pub fn is_multi(&self) -> bool {
        self.conjunction.is_some()
    }

    pub fn probes(&self) -> &[Probe] {
        &self.probes
    }

    pub fn expectations(&self) -> &[Expectation] {
        &self.expectations
    }

    pub fn functions(&self) -> &[ComparisonFunc] {
        &self.functions
    }

    pub fn options(&self) -> &[PairOptions] {
        &self.options
    }

    pub fn conjunction(&self) -> Option<Conjunction> {
        self.conjunction
    }

    pub fn postconfig(&self) -> &[SetupStep] {
        &self.postconfig
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(answer: &str) -> CheckPair {
        CheckPair::new(
            Probe::shell("cat /tmp/out.txt"),
            Expectation::literal(answer),
            ComparisonFunc::ExactMatch,
        )
    }

    #[test]
    fn test_single_pair_has_no_conjunction() {
        let spec = EvaluatorSpec::single(pair("42"));
        assert_eq!(spec.len(), 1);
        assert!(!spec.is_multi());
        assert_eq!(spec.conjunction(), None);
    }

    #[test]
    fn test_all_of_keeps_sequences_aligned() {
        let spec = EvaluatorSpec::all_of(vec![pair("a"), pair("b"), pair("c")]);
        assert_eq!(spec.probes().len(), 3);
        assert_eq!(spec.expectations().len(), 3);
        assert_eq!(spec.functions().len(), 3);
        assert_eq!(spec.options().len(), 3);
        assert_eq!(spec.conjunction(), Some(Conjunction::And));
        assert_eq!(spec.expectations()[1], Expectation::literal("b"));
    }

    #[test]
    fn test_all_of_one_pair_is_single() {
        assert_eq!(
            EvaluatorSpec::all_of(vec![pair("x")]),
            EvaluatorSpec::single(pair("x"))
        );
    }

    #[test]
    fn test_compare_method_spelling() {
        assert_eq!(CompareMethod::Exact.as_harness_str(), "eq");
        assert_eq!(CompareMethod::Approx(0.01).as_harness_str(), "approx:0.01");
        assert_eq!(CompareMethod::Approx(0.1).as_harness_str(), "approx:0.1");
    }

    #[test]
    fn test_options_emptiness() {
        assert!(PairOptions::default().is_empty());
        assert!(!PairOptions::text_file().is_empty());
        let json = serde_json::to_value(PairOptions::text_file()).expect("serialize");
        assert_eq!(json, serde_json::json!({"file_type": "text", "ignore_blanks": true}));
    }

    #[test]
    fn test_probe_kinds_serialize_kebab_case() {
        let json = serde_json::to_value(Probe::read_file("/a", "b")).expect("serialize");
        assert_eq!(json["kind"], "read-file");
        let json = serde_json::to_value(Expectation::literal("x")).expect("serialize");
        assert_eq!(json["kind"], "literal");
    }
}
