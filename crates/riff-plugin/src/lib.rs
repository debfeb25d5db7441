//! Riff plugin - the `music_project_manager` agent tool.
//!
//! The host hands the tool a JSON argument string naming an `operation`;
//! the tool answers with text. Project operations live in `riff-projects`,
//! settings in `riff-config`. This crate adds:
//!
//! - **definition**: the function schema shown to the model
//! - **manifest**: the embedded `plugin.yaml` and build information
//! - **setup**: first-run and settings operations
//! - **tool**: argument parsing and dispatch

#![warn(missing_docs)]

pub mod definition;
pub mod manifest;
pub mod params;
pub mod setup;
pub mod tool;

pub use definition::ToolDefinition;
pub use manifest::{BuildInfo, PluginManifest, Requirements};
pub use params::{Operation, ToolArgs};
pub use tool::{AgentAware, MusicProjectTool, PluginTool};

use riff_common_fs::FsError;
use riff_config::SettingsError;
use riff_projects::ProjectError;

/// Result type for plugin operations
pub type Result<T> = std::result::Result<T, PluginError>;

/// Errors that can occur in the plugin
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// Arguments could not be parsed or a required one is missing
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The operation name is not known
    #[error("unknown operation {operation:?}. Valid operations: {valid}")]
    UnknownOperation {
        /// Name that was sent.
        operation: String,
        /// Comma-separated valid names.
        valid: String,
    },

    /// Invalid plugin manifest
    #[error("invalid plugin manifest: {0}")]
    InvalidManifest(String),

    /// Plugin requirement not met
    #[error("plugin requirement not met: {0}")]
    RequirementNotMet(String),

    /// A project operation failed
    #[error(transparent)]
    Project(#[from] ProjectError),

    /// Settings could not be read or written
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// File system error
    #[error(transparent)]
    Fs(#[from] FsError),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PluginError {
    /// Whether the caller sent something invalid.
    pub fn is_invalid_input(&self) -> bool {
        match self {
            Self::InvalidArguments(_) | Self::UnknownOperation { .. } => true,
            Self::Project(e) => matches!(
                e,
                ProjectError::Validation { .. }
                    | ProjectError::NotFound { .. }
                    | ProjectError::Ambiguous { .. }
                    | ProjectError::AlreadyExists { .. }
            ),
            _ => false,
        }
    }

    /// Whether settings are at fault.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::Settings(_)
                | Self::InvalidManifest(_)
                | Self::RequirementNotMet(_)
                | Self::Project(ProjectError::Settings(_))
        )
    }

    /// Whether the file system is at fault.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            Self::Fs(_)
                | Self::Project(ProjectError::Fs(_))
                | Self::Project(ProjectError::TemplateNotFound { .. })
                | Self::Project(ProjectError::Registry { .. })
        )
    }
}
