//! Category system for deskforge tasks.
//!
//! This module provides the closed taxonomy and the catalog used to resolve task names.

mod taxonomy;

pub use taxonomy::{Category, TaskCatalog, TaskType};
