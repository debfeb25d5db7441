//! CLI error handling.

use std::process::ExitCode;

use riff_plugin::PluginError;
use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        hint: Option<String>,
    },

    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("{message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Get the error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "E001",
            Self::Io { .. } => "E002",
            Self::Validation { .. } => "E004",
            Self::Other(_) => "E999",
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        let code = match self {
            Self::Config { .. } => 2,
            Self::Io { .. } => 3,
            Self::Validation { .. } => 5,
            Self::Other(_) => 1,
        };
        ExitCode::from(code)
    }

    /// Get hint for this error if available
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Config { hint, .. } => hint.as_deref(),
            _ => None,
        }
    }

    /// Create a config error with hint
    pub fn config_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
            hint: Some(hint.into()),
        }
    }
}

impl From<PluginError> for CliError {
    fn from(e: PluginError) -> Self {
        let message = e.to_string();
        if e.is_invalid_input() {
            Self::Validation {
                message,
                source: Some(Box::new(e)),
            }
        } else if e.is_config() {
            Self::Config {
                message,
                source: Some(Box::new(e)),
                hint: Some("check the agent settings file passed with --settings-path".into()),
            }
        } else if e.is_io() {
            Self::Io {
                message,
                source: Some(Box::new(e)),
            }
        } else {
            Self::Other(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_errors_map_to_exit_codes() {
        let invalid = CliError::from(PluginError::InvalidArguments("bpm".into()));
        assert_eq!(invalid.code(), "E004");
        assert_eq!(invalid.exit_code(), ExitCode::from(5));

        let manifest = CliError::from(PluginError::InvalidManifest("bad".into()));
        assert_eq!(manifest.exit_code(), ExitCode::from(2));
        assert!(manifest.hint().is_some());
    }

    #[test]
    fn test_message_is_kept() {
        let err = CliError::from(PluginError::RequirementNotMet("agent 0.0.1".into()));
        assert_eq!(err.to_string(), "plugin requirement not met: agent 0.0.1");
    }
}
