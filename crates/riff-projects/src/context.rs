//! Execution context for project operations.

use riff_config::Settings;
use std::path::Path;

/// Context passed to every operation.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    /// Settings loaded for this invocation.
    pub settings: Settings,
    /// Unique operation ID for logging.
    pub operation_id: String,
}

impl ProjectContext {
    /// Create a new context with a fresh operation ID.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            operation_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Configured project root.
    pub fn project_dir(&self) -> Option<&Path> {
        self.settings.project_dir()
    }
}
