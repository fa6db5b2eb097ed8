//! Forge configuration.
//!
//! Covers the target environment layout, where packages are written, how
//! reference artifacts are addressed and the optional base seed for sampled
//! instances. Values come from defaults, a YAML file and `DESKFORGE_*`
//! environment variables, in that order of precedence (lowest first).

use crate::setup::VmLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// IO error while reading configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid YAML for this schema.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Configuration for generation, export and sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    /// Where files live inside the target VM.
    pub layout: VmLayout,
    /// Directory receiving task packages and sampling sessions.
    pub output_dir: PathBuf,
    /// Base URL under which package trees are mirrored. When unset,
    /// reference locations are `file://` URLs.
    pub reference_base_url: Option<String>,
    /// Seed of the first sampled instance; later instances add their index.
    pub base_seed: Option<u64>,
    /// Whether JSON outputs are pretty-printed.
    pub pretty_json: bool,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            layout: VmLayout::default(),
            output_dir: PathBuf::from("./generated-tasks"),
            reference_base_url: None,
            base_seed: None,
            pretty_json: true,
        }
    }
}

impl ForgeConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DESKFORGE_OUTPUT_DIR`: Output directory (default: ./generated-tasks)
    /// - `DESKFORGE_REFERENCE_BASE_URL`: Base URL for reference artifacts
    /// - `DESKFORGE_BASE_SEED`: Seed of the first sampled instance
    /// - `DESKFORGE_PRETTY_JSON`: Pretty-print JSON outputs (default: true)
    /// - `DESKFORGE_CODING_DIR`: VM working directory for debugging tasks
    /// - `DESKFORGE_DESKTOP_DIR`: VM desktop directory
    /// - `DESKFORGE_DOCUMENTS_DIR`: VM documents directory
    /// - `DESKFORGE_WEB_ROOT`: Directory served by the VM's HTTP server
    /// - `DESKFORGE_HTTP_PORT`: Port of the VM's HTTP server (default: 8080)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Loads a YAML file, then applies environment overrides.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&text)?;
        config.with_env_overrides()
    }

    /// Applies `DESKFORGE_*` variables on top of this configuration and
    /// validates the result.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(val) = std::env::var("DESKFORGE_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("DESKFORGE_REFERENCE_BASE_URL") {
            self.reference_base_url = Some(val);
        }

        if let Ok(val) = std::env::var("DESKFORGE_BASE_SEED") {
            self.base_seed = Some(parse_env_value(&val, "DESKFORGE_BASE_SEED")?);
        }

        if let Ok(val) = std::env::var("DESKFORGE_PRETTY_JSON") {
            self.pretty_json = parse_env_bool(&val, "DESKFORGE_PRETTY_JSON")?;
        }

        // VM layout
        if let Ok(val) = std::env::var("DESKFORGE_CODING_DIR") {
            self.layout.coding_dir = val;
        }

        if let Ok(val) = std::env::var("DESKFORGE_DESKTOP_DIR") {
            self.layout.desktop_dir = val;
        }

        if let Ok(val) = std::env::var("DESKFORGE_DOCUMENTS_DIR") {
            self.layout.documents_dir = val;
        }

        if let Ok(val) = std::env::var("DESKFORGE_WEB_ROOT") {
            self.layout.web_root = val;
        }

        if let Ok(val) = std::env::var("DESKFORGE_HTTP_PORT") {
            self.layout.http_port = parse_env_value(&val, "DESKFORGE_HTTP_PORT")?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` if any values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "output_dir cannot be empty".to_string(),
            ));
        }

        let dirs = [
            ("coding_dir", &self.layout.coding_dir),
            ("desktop_dir", &self.layout.desktop_dir),
            ("documents_dir", &self.layout.documents_dir),
            ("web_root", &self.layout.web_root),
        ];
        for (name, dir) in dirs {
            if !dir.starts_with('/') {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} must be an absolute path, got '{}'",
                    name, dir
                )));
            }
        }

        if self.layout.http_port == 0 {
            return Err(ConfigError::ValidationFailed(
                "http_port must be greater than 0".to_string(),
            ));
        }

        if let Some(url) = &self.reference_base_url {
            let known = ["http://", "https://", "file://", "s3://"];
            if !known.iter().any(|scheme| url.starts_with(scheme)) {
                return Err(ConfigError::ValidationFailed(format!(
                    "reference_base_url must start with one of {:?}, got '{}'",
                    known, url
                )));
            }
        }

        Ok(())
    }

    /// Builder method to set the VM layout.
    pub fn with_layout(mut self, layout: VmLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Builder method to set the output directory.
    pub fn with_output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = path.into();
        self
    }

    /// Builder method to set the reference base URL.
    pub fn with_reference_base_url(mut self, url: impl Into<String>) -> Self {
        self.reference_base_url = Some(url.into());
        self
    }

    /// Builder method to set the base seed.
    pub fn with_base_seed(mut self, seed: u64) -> Self {
        self.base_seed = Some(seed);
        self
    }

    /// Builder method to enable or disable pretty-printed JSON.
    pub fn with_pretty_json(mut self, pretty: bool) -> Self {
        self.pretty_json = pretty;
        self
    }
}

/// Parse an environment variable value into a type.
fn parse_env_value<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("could not parse '{}'", value),
    })
}

/// Parse an environment variable as a boolean.
fn parse_env_bool(value: &str, key: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected boolean value, got '{}'", value),
        }),
    }
}
