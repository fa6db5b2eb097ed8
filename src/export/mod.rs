//! Task package export.
//!
//! Assembles the harness configuration for an instance and writes the
//! instance's files, configuration and metadata into a package directory.
//! Spreadsheet artifacts are encoded as xlsx workbooks on the way out.

pub mod framework;
pub mod package;
pub mod workbook;

pub use framework::FrameworkConfig;
pub use package::{package_relative_path, ExportedTask, PackageWriter};
pub use workbook::artifact_bytes;
