//! Error types for project operations.

use riff_common_fs::FsError;
use riff_config::SettingsError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while managing projects.
///
/// Missing configuration is not an error: operations answer with a guidance
/// message instead.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// Bad input, reported before any I/O happens.
    #[error("{message}")]
    Validation {
        /// What was wrong.
        message: String,
    },

    /// `default.RPP` is missing from the template directory.
    #[error("template file not found at {}. Please ensure a default.RPP template exists in your template directory", path.display())]
    TemplateNotFound {
        /// Expected template path.
        path: PathBuf,
    },

    /// A project file or registry entry does not exist.
    #[error("{what} not found: {query}")]
    NotFound {
        /// Kind of thing looked up.
        what: &'static str,
        /// What was asked for.
        query: String,
    },

    /// A name matched more than one registry entry.
    #[error("'{query}' matches {} projects, be more specific: {}", candidates.len(), candidates.join(", "))]
    Ambiguous {
        /// Name that was looked up.
        query: String,
        /// Names of all matching projects.
        candidates: Vec<String>,
    },

    /// Rename target already exists.
    #[error("a project folder already exists at {}", path.display())]
    AlreadyExists {
        /// Conflicting path.
        path: PathBuf,
    },

    /// File system failure.
    #[error(transparent)]
    Fs(#[from] FsError),

    /// Registry file could not be (de)serialized.
    #[error("failed to parse registry {}: {source}", path.display())]
    Registry {
        /// Registry file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A response could not be serialized.
    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The TEMPO line exists but its value is not a number.
    #[error("failed to parse tempo value {value:?} in {}", path.display())]
    Tempo {
        /// Project file.
        path: PathBuf,
        /// Raw field.
        value: String,
    },

    /// The launcher process could not be started.
    #[error("failed to start {program}: {source}")]
    LaunchSpawn {
        /// Program that was run.
        program: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The launcher exited unsuccessfully.
    #[error("{program} exited with status {}", exit_code.map(|c| c.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    LaunchFailed {
        /// Program that was run.
        program: String,
        /// Exit code, `None` when killed by a signal.
        exit_code: Option<i32>,
    },

    /// The launcher did not finish in time.
    #[error("{program} timed out after {duration:?}")]
    LaunchTimeout {
        /// Program that was run.
        program: String,
        /// Configured timeout.
        duration: Duration,
    },

    /// Settings could not be loaded or saved.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl ProjectError {
    /// Shorthand for a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether the caller sent bad input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// Result type alias for project operations.
pub type ProjectResult<T> = std::result::Result<T, ProjectError>;
