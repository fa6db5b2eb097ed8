//! The harness task configuration.

use crate::error::CompileError;
use crate::evaluator::{to_harness_json, EvaluatorCompiler};
use crate::generator::TaskInstance;
use crate::setup::{self, ArtifactLocations, SetupStep, VmLayout};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Trajectory directory every task config points at.
pub const TRAJECTORY_DIR: &str = "trajectories/";

/// One task as consumed by the execution harness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkConfig {
    pub id: String,
    pub snapshot: String,
    pub instruction: String,
    /// Always empty for generated tasks.
    pub source: String,
    /// Bootstrap steps run before the agent starts.
    pub config: Vec<SetupStep>,
    pub trajectory: String,
    pub related_apps: Vec<String>,
    pub evaluator: Value,
}

impl FrameworkConfig {
    /// Assembles the config for `instance`.
    ///
    /// `locations` must cover every environment artifact and every hosted
    /// reference of the instance.
    pub fn assemble(
        layout: &VmLayout,
        instance: &TaskInstance,
        locations: &ArtifactLocations,
    ) -> Result<Self, CompileError> {
        let profile = setup::environment_profile(instance.category());
        let steps = setup::build_setup_steps(layout, instance, locations)?;
        let evaluator = EvaluatorCompiler::new().compile(instance.task_type, instance, locations)?;

        Ok(Self {
            id: instance.task_id().to_string(),
            snapshot: profile.snapshot.to_string(),
            instruction: instance.instructions.clone(),
            source: String::new(),
            config: steps,
            trajectory: TRAJECTORY_DIR.to_string(),
            related_apps: profile.related_apps.iter().map(|a| a.to_string()).collect(),
            evaluator: to_harness_json(&evaluator),
        })
    }

    /// Required fields are present and the evaluator names a function.
    pub fn is_complete(&self) -> bool {
        !self.id.is_empty()
            && !self.snapshot.is_empty()
            && !self.instruction.is_empty()
            && !self.config.is_empty()
            && self.evaluator.get("func").is_some()
    }

    /// Shortened instruction for listings.
    pub fn instruction_preview(&self) -> String {
        const LIMIT: usize = 100;
        if self.instruction.chars().count() > LIMIT {
            let head: String = self.instruction.chars().take(LIMIT).collect();
            format!("{}...", head)
        } else {
            self.instruction.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::TaskType;
    use crate::generator::Generator;

    fn locations(instance: &TaskInstance) -> ArtifactLocations {
        instance
            .artifacts
            .iter()
            .map(|(role, artifact)| (*role, format!("https://store.example/{}", artifact.filename)))
            .collect()
    }

    #[test]
    fn test_assemble_every_task_type() {
        let layout = VmLayout::default();
        let generator = Generator::new(layout.clone()).expect("generator");
        for task_type in TaskType::all() {
            let instance = generator.generate(task_type, Some(19)).expect("generate");
            let config =
                FrameworkConfig::assemble(&layout, &instance, &locations(&instance)).expect("assemble");
            assert!(config.is_complete(), "{}", task_type);
            assert_eq!(config.id, instance.task_id().to_string());
            assert_eq!(config.trajectory, "trajectories/");
            assert!(config.source.is_empty());
        }
    }

    #[test]
    fn test_profile_fields() {
        let layout = VmLayout::default();
        let generator = Generator::new(layout.clone()).expect("generator");
        let instance = generator
            .generate(TaskType::SimpleLogicCompletion, Some(2))
            .expect("generate");
        let config =
            FrameworkConfig::assemble(&layout, &instance, &locations(&instance)).expect("assemble");
        assert_eq!(config.snapshot, "vscode");
        assert_eq!(config.related_apps, vec!["vscode".to_string()]);

        let json = serde_json::to_value(&config).expect("serialize");
        assert_eq!(json["config"][0]["type"], "command");
        assert_eq!(json["evaluator"]["conj"], "and");
    }

    #[test]
    fn test_instruction_preview_truncates() {
        let layout = VmLayout::default();
        let generator = Generator::new(layout.clone()).expect("generator");
        let instance = generator
            .generate(TaskType::MultiPointSummary, Some(4))
            .expect("generate");
        let mut config =
            FrameworkConfig::assemble(&layout, &instance, &locations(&instance)).expect("assemble");
        config.instruction = "x".repeat(150);
        assert_eq!(config.instruction_preview().len(), 103);
        config.instruction = "short".to_string();
        assert_eq!(config.instruction_preview(), "short");
    }
}
