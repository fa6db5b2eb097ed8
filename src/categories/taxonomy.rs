//! Category taxonomy for deskforge.
//!
//! Defines the 3 task categories, the 9 task types they contain, and the
//! `TaskCatalog` callers construct once at startup to resolve names.

use crate::error::GeneratorError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The task categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    DebuggingAndRefactoring,
    TabularDataReporting,
    ResearchSynthesis,
}

impl Category {
    /// Returns all available categories.
    pub fn all() -> Vec<Category> {
        vec![
            Category::DebuggingAndRefactoring,
            Category::TabularDataReporting,
            Category::ResearchSynthesis,
        ]
    }

    /// Returns the snake_case identifier used in configs and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::DebuggingAndRefactoring => "debugging_and_refactoring",
            Category::TabularDataReporting => "tabular_data_reporting",
            Category::ResearchSynthesis => "research_synthesis",
        }
    }

    /// Returns the human-readable display name for this category.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::DebuggingAndRefactoring => "Debugging & Refactoring",
            Category::TabularDataReporting => "Tabular Data Reporting",
            Category::ResearchSynthesis => "Information Synthesis & Presentation",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::all()
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| GeneratorError::UnknownCategory(s.to_string()))
    }
}

/// The closed catalog of task types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    BasicPythonSyntaxFix,
    SimpleLogicCompletion,
    MultiFileConfigUpdate,
    SimpleDataTransfer,
    BasicDataAggregation,
    SimpleCalculationOutput,
    BasicWebExtraction,
    MultiPointSummary,
    FileDownloadIntegration,
}

impl TaskType {
    /// Returns all task types, grouped by category and ordered by level.
    pub fn all() -> Vec<TaskType> {
        vec![
            TaskType::BasicPythonSyntaxFix,
            TaskType::SimpleLogicCompletion,
            TaskType::MultiFileConfigUpdate,
            TaskType::SimpleDataTransfer,
            TaskType::BasicDataAggregation,
            TaskType::SimpleCalculationOutput,
            TaskType::BasicWebExtraction,
            TaskType::MultiPointSummary,
            TaskType::FileDownloadIntegration,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::BasicPythonSyntaxFix => "basic_python_syntax_fix",
            TaskType::SimpleLogicCompletion => "simple_logic_completion",
            TaskType::MultiFileConfigUpdate => "multi_file_config_update",
            TaskType::SimpleDataTransfer => "simple_data_transfer",
            TaskType::BasicDataAggregation => "basic_data_aggregation",
            TaskType::SimpleCalculationOutput => "simple_calculation_output",
            TaskType::BasicWebExtraction => "basic_web_extraction",
            TaskType::MultiPointSummary => "multi_point_summary",
            TaskType::FileDownloadIntegration => "file_download_integration",
        }
    }

    /// Returns the category this task type belongs to.
    pub fn category(&self) -> Category {
        match self {
            TaskType::BasicPythonSyntaxFix
            | TaskType::SimpleLogicCompletion
            | TaskType::MultiFileConfigUpdate => Category::DebuggingAndRefactoring,
            TaskType::SimpleDataTransfer
            | TaskType::BasicDataAggregation
            | TaskType::SimpleCalculationOutput => Category::TabularDataReporting,
            TaskType::BasicWebExtraction
            | TaskType::MultiPointSummary
            | TaskType::FileDownloadIntegration => Category::ResearchSynthesis,
        }
    }

    /// Returns the difficulty tier (1-3).
    pub fn level(&self) -> u8 {
        match self {
            TaskType::BasicPythonSyntaxFix
            | TaskType::SimpleDataTransfer
            | TaskType::BasicWebExtraction => 1,
            TaskType::SimpleLogicCompletion
            | TaskType::BasicDataAggregation
            | TaskType::MultiPointSummary => 2,
            TaskType::MultiFileConfigUpdate
            | TaskType::SimpleCalculationOutput
            | TaskType::FileDownloadIntegration => 3,
        }
    }

    /// Returns true if the task's main program goes through the fault injector.
    pub fn uses_fault_injection(&self) -> bool {
        matches!(self, TaskType::BasicPythonSyntaxFix)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskType::all()
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| GeneratorError::UnknownTaskType(s.to_string()))
    }
}

/// Explicit lookup table from category and level to task types.
///
/// Built once by the caller and passed to whatever needs name resolution;
/// there is no process-wide registry.
#[derive(Debug, Clone)]
pub struct TaskCatalog {
    by_category: BTreeMap<Category, BTreeMap<u8, Vec<TaskType>>>,
}

impl TaskCatalog {
    /// Builds the catalog containing every known task type.
    pub fn standard() -> Self {
        Self::from_task_types(TaskType::all())
    }

    /// Builds a catalog restricted to the given task types.
    pub fn from_task_types(task_types: impl IntoIterator<Item = TaskType>) -> Self {
        let mut by_category: BTreeMap<Category, BTreeMap<u8, Vec<TaskType>>> = BTreeMap::new();
        for task_type in task_types {
            let levels = by_category.entry(task_type.category()).or_default();
            let entry = levels.entry(task_type.level()).or_default();
            if !entry.contains(&task_type) {
                entry.push(task_type);
            }
        }
        Self { by_category }
    }

    /// Returns the categories that have at least one task type.
    pub fn categories(&self) -> Vec<Category> {
        self.by_category.keys().copied().collect()
    }

    /// Returns the levels a category supports, ascending.
    pub fn supported_levels(&self, category: Category) -> Vec<u8> {
        self.by_category
            .get(&category)
            .map(|levels| levels.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the task types of a category, optionally restricted to one level.
    pub fn task_types(&self, category: Category, level: Option<u8>) -> Vec<TaskType> {
        let Some(levels) = self.by_category.get(&category) else {
            return Vec::new();
        };
        match level {
            Some(level) => levels.get(&level).cloned().unwrap_or_default(),
            None => levels.values().flatten().copied().collect(),
        }
    }

    /// Resolves a task type name against this catalog.
    pub fn resolve(&self, name: &str) -> Result<TaskType, GeneratorError> {
        let task_type: TaskType = name.parse()?;
        if self.contains(task_type) {
            Ok(task_type)
        } else {
            Err(GeneratorError::UnknownTaskType(name.to_string()))
        }
    }

    pub fn contains(&self, task_type: TaskType) -> bool {
        self.task_types(task_type.category(), Some(task_type.level()))
            .contains(&task_type)
    }

    /// Returns a nested category -> level -> task type name view for listings.
    pub fn describe(&self) -> BTreeMap<String, BTreeMap<u8, Vec<String>>> {
        self.by_category
            .iter()
            .map(|(category, levels)| {
                let levels = levels
                    .iter()
                    .map(|(level, types)| {
                        (*level, types.iter().map(|t| t.as_str().to_string()).collect())
                    })
                    .collect();
                (category.as_str().to_string(), levels)
            })
            .collect()
    }
}

impl Default for TaskCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_type_round_trips_through_name() {
        for task_type in TaskType::all() {
            let parsed: TaskType = task_type.as_str().parse().expect("known name should parse");
            assert_eq!(parsed, task_type);
        }
    }

    #[test]
    fn test_unknown_task_type_is_rejected() {
        let err = "fix_everything".parse::<TaskType>().unwrap_err();
        assert!(matches!(err, GeneratorError::UnknownTaskType(name) if name == "fix_everything"));
    }

    #[test]
    fn test_each_category_has_three_levels() {
        let catalog = TaskCatalog::standard();
        for category in Category::all() {
            assert_eq!(catalog.supported_levels(category), vec![1, 2, 3]);
            assert_eq!(catalog.task_types(category, None).len(), 3);
        }
    }

    #[test]
    fn test_task_types_by_level() {
        let catalog = TaskCatalog::standard();
        assert_eq!(
            catalog.task_types(Category::TabularDataReporting, Some(2)),
            vec![TaskType::BasicDataAggregation]
        );
        assert!(catalog
            .task_types(Category::ResearchSynthesis, Some(7))
            .is_empty());
    }

    #[test]
    fn test_restricted_catalog_resolves_only_members() {
        let catalog = TaskCatalog::from_task_types([TaskType::SimpleDataTransfer]);
        assert!(catalog.resolve("simple_data_transfer").is_ok());
        assert!(catalog.resolve("basic_python_syntax_fix").is_err());
        assert_eq!(catalog.categories(), vec![Category::TabularDataReporting]);
    }

    #[test]
    fn test_category_serde_uses_snake_case() {
        let json = serde_json::to_string(&Category::ResearchSynthesis).expect("serialize");
        assert_eq!(json, "\"research_synthesis\"");
        let parsed: TaskType =
            serde_json::from_str("\"multi_file_config_update\"").expect("deserialize");
        assert_eq!(parsed, TaskType::MultiFileConfigUpdate);
    }

    #[test]
    fn test_describe_lists_every_task() {
        let description = TaskCatalog::standard().describe();
        let total: usize = description
            .values()
            .flat_map(|levels| levels.values())
            .map(|types| types.len())
            .sum();
        assert_eq!(total, 9);
    }
}
