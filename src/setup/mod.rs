//! Environment setup for generated tasks.
//!
//! Turns a task instance plus the resolved locations of its files into the
//! ordered list of bootstrap actions the external harness performs before
//! handing the environment to the agent, and into the post-run actions it
//! performs before evaluation.

use crate::categories::{Category, TaskType};
use crate::error::CompileError;
use crate::generator::instance::{ArtifactRole, TaskInstance};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Locations of task files, keyed by artifact role.
pub type ArtifactLocations = BTreeMap<ArtifactRole, String>;

/// Where things live inside the target VM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmLayout {
    /// Working directory for debugging tasks.
    pub coding_dir: String,
    pub desktop_dir: String,
    /// Where presentations are saved.
    pub documents_dir: String,
    /// Directory served by the local HTTP server.
    pub web_root: String,
    pub http_port: u16,
}

impl Default for VmLayout {
    fn default() -> Self {
        Self {
            coding_dir: "/home/user/coding_tasks".to_string(),
            desktop_dir: "/home/user/Desktop".to_string(),
            documents_dir: "/home/user/Documents".to_string(),
            web_root: "/tmp".to_string(),
            http_port: 8080,
        }
    }
}

impl VmLayout {
    pub fn coding_path(&self, filename: &str) -> String {
        join(&self.coding_dir, filename)
    }

    pub fn desktop_path(&self, filename: &str) -> String {
        join(&self.desktop_dir, filename)
    }

    pub fn documents_path(&self, filename: &str) -> String {
        join(&self.documents_dir, filename)
    }

    pub fn web_path(&self, filename: &str) -> String {
        join(&self.web_root, filename)
    }

    /// Directory holding files offered for download.
    pub fn download_dir(&self) -> String {
        join(&self.web_root, "files")
    }

    pub fn download_path(&self, filename: &str) -> String {
        join(&self.download_dir(), filename)
    }

    /// URL of a page served from the web root.
    pub fn page_url(&self, filename: &str) -> String {
        format!("http://localhost:{}/{}", self.http_port, filename)
    }

    /// URL of a file served from the download directory.
    pub fn download_url(&self, filename: &str) -> String {
        format!("http://localhost:{}/files/{}", self.http_port, filename)
    }
}

fn join(dir: &str, filename: &str) -> String {
    format!("{}/{}", dir.trim_end_matches('/'), filename)
}

/// One file fetched into the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadFile {
    pub url: String,
    pub path: String,
}

/// A single environment action, serialized as `{type, parameters}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "parameters", rename_all = "snake_case")]
pub enum SetupStep {
    Command { command: Vec<String> },
    Download { files: Vec<DownloadFile> },
    Sleep { seconds: f64 },
    Launch { command: Vec<String> },
    Execute { command: Vec<String> },
    ActivateWindow { window_name: String, strict: bool },
}

impl SetupStep {
    fn command(args: &[&str]) -> Self {
        SetupStep::Command {
            command: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn launch(args: &[&str]) -> Self {
        SetupStep::Launch {
            command: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn execute(args: &[&str]) -> Self {
        SetupStep::Execute {
            command: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn download(url: &str, path: String) -> Self {
        SetupStep::Download {
            files: vec![DownloadFile {
                url: url.to_string(),
                path,
            }],
        }
    }

    fn activate(window_name: &str) -> Self {
        SetupStep::ActivateWindow {
            window_name: window_name.to_string(),
            strict: false,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SetupStep::Command { .. } => "command",
            SetupStep::Download { .. } => "download",
            SetupStep::Sleep { .. } => "sleep",
            SetupStep::Launch { .. } => "launch",
            SetupStep::Execute { .. } => "execute",
            SetupStep::ActivateWindow { .. } => "activate_window",
        }
    }
}

/// VM snapshot and the applications a category's tasks touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentProfile {
    pub snapshot: &'static str,
    pub related_apps: &'static [&'static str],
}

pub fn environment_profile(category: Category) -> EnvironmentProfile {
    match category {
        Category::DebuggingAndRefactoring => EnvironmentProfile {
            snapshot: "vscode",
            related_apps: &["vscode"],
        },
        Category::TabularDataReporting => EnvironmentProfile {
            snapshot: "os",
            related_apps: &["libreoffice_calc", "os"],
        },
        Category::ResearchSynthesis => EnvironmentProfile {
            snapshot: "os",
            related_apps: &["chrome", "libreoffice_impress", "os"],
        },
    }
}

/// Actions the harness runs after the agent finishes and before evaluation.
pub fn postconfig(task_type: TaskType) -> Vec<SetupStep> {
    match task_type.category() {
        Category::DebuggingAndRefactoring => Vec::new(),
        Category::TabularDataReporting => vec![SetupStep::Sleep { seconds: 2.0 }],
        Category::ResearchSynthesis => vec![
            SetupStep::activate("LibreOffice Impress"),
            SetupStep::execute(&[
                "python3",
                "-c",
                "import pyautogui; pyautogui.hotkey('ctrl', 's');",
            ]),
            SetupStep::Sleep { seconds: 2.0 },
        ],
    }
}

/// Builds the bootstrap sequence for an instance.
///
/// `locations` must hold a fetchable URL for every environment-facing
/// artifact of the instance.
pub fn build_setup_steps(
    layout: &VmLayout,
    instance: &TaskInstance,
    locations: &ArtifactLocations,
) -> Result<Vec<SetupStep>, CompileError> {
    let main = required_artifact(instance, ArtifactRole::MainFile)?;
    let main_url = required_location(locations, ArtifactRole::MainFile)?;

    let steps = match instance.category() {
        Category::DebuggingAndRefactoring => {
            let mut steps = vec![
                SetupStep::command(&["mkdir", "-p", &layout.coding_dir]),
                SetupStep::download(main_url, layout.coding_path(&main.filename)),
            ];
            if let Some(config) = instance.artifact(ArtifactRole::ConfigFile) {
                let config_url = required_location(locations, ArtifactRole::ConfigFile)?;
                steps.push(SetupStep::download(
                    config_url,
                    layout.coding_path(&config.filename),
                ));
            }
            steps.push(SetupStep::Sleep { seconds: 10.0 });
            steps
        }
        Category::TabularDataReporting => {
            let target = layout.desktop_path(&main.filename);
            let launch = if instance.task_type == TaskType::SimpleCalculationOutput {
                SetupStep::launch(&[
                    "libreoffice",
                    "--calc",
                    "--infilter=CSV:44,34,0,1,1",
                    &target,
                ])
            } else {
                SetupStep::launch(&["libreoffice", "--calc"])
            };
            vec![
                SetupStep::download(main_url, target),
                launch,
                SetupStep::Sleep { seconds: 10.0 },
            ]
        }
        Category::ResearchSynthesis => {
            let mut steps = vec![SetupStep::download(
                main_url,
                layout.web_path(&main.filename),
            )];
            if let Some(document) = instance.artifact(ArtifactRole::DownloadFile) {
                let document_url = required_location(locations, ArtifactRole::DownloadFile)?;
                steps.push(SetupStep::command(&["mkdir", "-p", &layout.download_dir()]));
                steps.push(SetupStep::download(
                    document_url,
                    layout.download_path(&document.filename),
                ));
            }
            let server = http_server_script(layout);
            steps.push(SetupStep::execute(&["python3", "-c", &server]));
            steps.push(SetupStep::Sleep { seconds: 2.0 });
            steps.push(SetupStep::launch(&[
                "google-chrome",
                "--new-window",
                &layout.page_url(&main.filename),
            ]));
            steps.push(SetupStep::launch(&["libreoffice", "--impress"]));
            steps.push(SetupStep::activate("Google Chrome"));
            steps.push(SetupStep::Sleep { seconds: 10.0 });
            steps
        }
    };

    Ok(steps)
}

/// Python one-liner that starts a detached static file server over the web root.
fn http_server_script(layout: &VmLayout) -> String {
    let root = layout.web_root.trim_end_matches('/');
    format!(
        "import subprocess, os; log=open('{root}/http_server.log','a'); \
         p=subprocess.Popen(['python3','-m','http.server','{port}','--directory','{root}'], \
         stdout=log, stderr=log, preexec_fn=os.setsid); \
         open('{root}/http_server.pid','w').write(str(p.pid)); \
         print('Server started on port {port}')",
        root = root,
        port = layout.http_port,
    )
}

fn required_artifact(
    instance: &TaskInstance,
    role: ArtifactRole,
) -> Result<&crate::generator::instance::Artifact, CompileError> {
    instance
        .artifact(role)
        .ok_or_else(|| CompileError::MissingArtifact {
            task_type: instance.task_type.to_string(),
            role: role.to_string(),
        })
}

fn required_location(locations: &ArtifactLocations, role: ArtifactRole) -> Result<&str, CompileError> {
    locations
        .get(&role)
        .map(String::as_str)
        .ok_or_else(|| CompileError::MissingReference(role.to_string()))
}
