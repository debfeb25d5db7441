//! Call arguments.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::PluginError;

/// Operations the tool dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Create a project from the template.
    CreateProject,
    /// Start a background scan.
    Scan,
    /// Report the state of the last scan.
    ScanStatus,
    /// Cancel a running scan.
    CancelScan,
    /// List the most recent projects.
    ListProjects,
    /// Open a project file in the DAW.
    OpenProject,
    /// Reveal a project in the file browser.
    OpenInFinder,
    /// Filter registered projects.
    FilterProject,
    /// Rename a registered project.
    RenameProject,
    /// Show the current settings.
    GetSettings,
    /// Start first-time setup.
    InitSetup,
    /// Finish first-time setup.
    CompleteSetup,
    /// Change the project directory.
    SetProjectDir,
    /// Change the template directory.
    SetTemplateDir,
}

impl Operation {
    /// Every operation, in the order shown to callers.
    pub const ALL: [Operation; 14] = [
        Operation::CreateProject,
        Operation::Scan,
        Operation::ScanStatus,
        Operation::CancelScan,
        Operation::ListProjects,
        Operation::OpenProject,
        Operation::OpenInFinder,
        Operation::FilterProject,
        Operation::RenameProject,
        Operation::GetSettings,
        Operation::InitSetup,
        Operation::CompleteSetup,
        Operation::SetProjectDir,
        Operation::SetTemplateDir,
    ];

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateProject => "create_project",
            Operation::Scan => "scan",
            Operation::ScanStatus => "scan_status",
            Operation::CancelScan => "cancel_scan",
            Operation::ListProjects => "list_projects",
            Operation::OpenProject => "open_project",
            Operation::OpenInFinder => "open_in_finder",
            Operation::FilterProject => "filter_project",
            Operation::RenameProject => "rename_project",
            Operation::GetSettings => "get_settings",
            Operation::InitSetup => "init_setup",
            Operation::CompleteSetup => "complete_setup",
            Operation::SetProjectDir => "set_project_dir",
            Operation::SetTemplateDir => "set_template_dir",
        }
    }

    /// Comma-separated wire names.
    pub fn names() -> String {
        Self::ALL
            .iter()
            .map(Operation::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| PluginError::UnknownOperation {
                operation: s.to_string(),
                valid: Self::names(),
            })
    }
}

/// Arguments of one call. Fields an operation does not use are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolArgs {
    /// Operation name, parsed separately so unknown names get a helpful error.
    pub operation: String,
    /// Project name.
    pub name: Option<String>,
    /// New project name for `rename_project`.
    pub new_name: Option<String>,
    /// Project file path.
    pub path: Option<String>,
    /// Tempo for create, exact tempo for filter.
    pub bpm: Option<u32>,
    /// Lowest tempo for filter.
    pub min_bpm: Option<u32>,
    /// Highest tempo for filter.
    pub max_bpm: Option<u32>,
    /// Project directory for setup.
    pub project_dir: Option<String>,
    /// Template directory for setup.
    pub template_dir: Option<String>,
}

impl ToolArgs {
    /// Parse a JSON argument string.
    pub fn parse(args: &str) -> crate::Result<Self> {
        serde_json::from_str(args).map_err(|e| PluginError::InvalidArguments(e.to_string()))
    }

    /// The requested operation.
    pub fn operation(&self) -> crate::Result<Operation> {
        self.operation.parse()
    }

    /// A required string field.
    pub fn required<'a>(&self, field: &'static str, value: &'a Option<String>) -> crate::Result<&'a str> {
        value
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| PluginError::InvalidArguments(format!("{field} is required for {}", self.operation)))
    }
}
