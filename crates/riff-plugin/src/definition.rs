//! Function definition shown to the model.

use riff_config::Settings;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::params::Operation;

/// Tool definition in OpenAI function-calling form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,

    /// Tool description
    pub description: String,

    /// JSON Schema for the arguments
    pub parameters: Value,
}

impl ToolDefinition {
    /// Definition for the project manager, with tempo bounds from `settings`.
    pub fn music_project_manager(name: &str, description: &str, settings: &Settings) -> Self {
        let ops: Vec<&str> = Operation::ALL.iter().map(Operation::as_str).collect();
        let tempo = |what: &str| {
            json!({
                "type": "integer",
                "description": what,
                "minimum": settings.tempo_min,
                "maximum": settings.tempo_max,
            })
        };

        let parameters = json!({
            "type": "object",
            "properties": {
                "operation": {
                    "type": "string",
                    "description": "Operation to perform",
                    "enum": ops,
                },
                "name": {
                    "type": "string",
                    "description": "Project name (required for create_project and rename_project, optional for filter_project and open_in_finder)",
                },
                "new_name": {
                    "type": "string",
                    "description": "New project name (required for rename_project)",
                },
                "path": {
                    "type": "string",
                    "description": "Project file path (required for open_project, optional for open_in_finder)",
                },
                "bpm": tempo("BPM for the project (optional for create_project, exact BPM for filter_project)"),
                "min_bpm": tempo("Minimum BPM for filter_project (optional)"),
                "max_bpm": tempo("Maximum BPM for filter_project (optional)"),
                "project_dir": {
                    "type": "string",
                    "description": "Directory where projects are created (complete_setup, set_project_dir)",
                },
                "template_dir": {
                    "type": "string",
                    "description": "Directory holding default.RPP (complete_setup, set_template_dir)",
                },
            },
            "required": ["operation"],
        });

        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
        }
    }
}
