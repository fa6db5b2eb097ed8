//! Task instance generation.
//!
//! Generation for one task type runs in four stages, all drawing from a single
//! seeded random source:
//!
//! 1. **Selection** - pick a domain record and a template variant from the
//!    fixed catalogs in [`domains`]
//! 2. **Synthesis** - build the task's files and the values a correct solution
//!    produces ([`coding`], [`tabular`], [`research`])
//! 3. **Corruption** - for code-repair tasks, introduce exactly one fault into
//!    the correct program ([`crate::corruption`])
//! 4. **Assembly** - freeze everything into an immutable [`TaskInstance`]
//!
//! # Example
//!
//! ```ignore
//! use deskforge::categories::TaskType;
//! use deskforge::generator::Generator;
//! use deskforge::setup::VmLayout;
//!
//! let generator = Generator::new(VmLayout::default())?;
//! let instance = generator.generate(TaskType::BasicPythonSyntaxFix, Some(7))?;
//! assert_eq!(instance.seed, 7);
//! ```

pub mod coding;
pub mod domains;
pub mod format;
pub mod instance;
pub mod research;
pub mod rng;
pub mod tabular;

pub use format::CellValue;
pub use instance::{
    Artifact, ArtifactFormat, ArtifactRole, ConfigFormat, GroundTruth, TaskInstance,
};
pub use rng::SeededRng;

use crate::categories::TaskType;
use crate::corruption::FaultInjector;
use crate::error::GeneratorError;
use crate::setup::VmLayout;
use tracing::{debug, info};

/// Result type alias for generator operations.
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Optional catalog hints for one generation call.
///
/// A hint that does not name a catalog entry is ignored and the entry is
/// drawn at random instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionHints {
    pub domain: Option<String>,
    pub variant: Option<String>,
}

impl SelectionHints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    pub(crate) fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub(crate) fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }
}

/// Produces task instances for any task type in the catalog.
///
/// The generator holds no random state; every call creates its own
/// [`SeededRng`], so one generator can be shared across callers.
pub struct Generator {
    layout: VmLayout,
    injector: FaultInjector,
}

impl Generator {
    /// Creates a generator that places files according to `layout`.
    pub fn new(layout: VmLayout) -> Result<Self> {
        Ok(Self {
            layout,
            injector: FaultInjector::new()?,
        })
    }

    pub fn layout(&self) -> &VmLayout {
        &self.layout
    }

    /// Generates an instance of `task_type`.
    ///
    /// With `seed` set the result is fully reproducible; without it a seed is
    /// drawn from entropy and recorded on the instance.
    pub fn generate(&self, task_type: TaskType, seed: Option<u64>) -> Result<TaskInstance> {
        self.generate_with(task_type, seed, &SelectionHints::default())
    }

    /// Generates an instance, preferring the hinted domain and variant.
    pub fn generate_with(
        &self,
        task_type: TaskType,
        seed: Option<u64>,
        hints: &SelectionHints,
    ) -> Result<TaskInstance> {
        let mut rng = SeededRng::from_optional(seed);
        debug!(
            task_type = %task_type,
            seed = rng.seed(),
            seeded = seed.is_some(),
            "Generating task instance"
        );

        let instance = match task_type {
            TaskType::BasicPythonSyntaxFix => {
                coding::syntax_fix(&mut rng, &self.layout, &self.injector, hints)?
            }
            TaskType::SimpleLogicCompletion => {
                coding::logic_completion(&mut rng, &self.layout, hints)?
            }
            TaskType::MultiFileConfigUpdate => coding::config_update(&mut rng, &self.layout, hints)?,
            TaskType::SimpleDataTransfer => tabular::data_transfer(&mut rng, &self.layout, hints)?,
            TaskType::BasicDataAggregation => tabular::aggregation(&mut rng, &self.layout, hints)?,
            TaskType::SimpleCalculationOutput => {
                tabular::calculation_output(&mut rng, &self.layout, hints)?
            }
            TaskType::BasicWebExtraction
            | TaskType::MultiPointSummary
            | TaskType::FileDownloadIntegration => {
                research::web_task(&mut rng, &self.layout, task_type, hints)?
            }
        };

        info!(
            task_type = %instance.task_type,
            seed = instance.seed,
            domain = %instance.domain,
            variant = %instance.template_variant,
            artifacts = instance.artifacts.len(),
            "Generated task instance"
        );
        Ok(instance)
    }
}
