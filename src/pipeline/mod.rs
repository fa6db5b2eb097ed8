//! Configuration and batch sampling.
//!
//! - **Config**: [`ForgeConfig`] holds the VM layout, output location and
//!   reference addressing, from defaults, YAML and `DESKFORGE_*` variables
//! - **Session**: [`SamplingSession`] turns a YAML [`SamplingPlan`] into a
//!   session directory of task packages plus a manifest
//!
//! # Example
//!
//! ```rust,ignore
//! use deskforge::pipeline::{ForgeConfig, SamplingPlan, SamplingSession};
//!
//! let config = ForgeConfig::from_env()?.with_base_seed(1000);
//! let plan = SamplingPlan::from_file("sampling.yaml")?;
//! let report = SamplingSession::new(config)?.run(&plan)?;
//!
//! println!(
//!     "{}: {} generated, {} failed",
//!     report.session_id,
//!     report.successful.len(),
//!     report.failed.len()
//! );
//! ```

pub mod config;
pub mod session;

pub use config::{ConfigError, ForgeConfig};
pub use session::{
    FailedTask, OutputSettings, SampleEntry, SamplingPlan, SamplingSession, SessionReport,
    SessionTask, TaskSpec,
};
