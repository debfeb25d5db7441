//! Input validation, run before any I/O.

use riff_config::Settings;

use crate::error::{ProjectError, ProjectResult};

/// Characters that may not appear in a project name.
pub const FORBIDDEN_NAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Check a project name for emptiness and forbidden characters.
pub fn validate_project_name(name: &str, field: &str) -> ProjectResult<()> {
    if name.trim().is_empty() {
        return Err(ProjectError::validation(format!(
            "{field} is required and cannot be empty"
        )));
    }

    if name.contains(FORBIDDEN_NAME_CHARS) {
        return Err(ProjectError::validation(format!(
            "{field} contains invalid characters. Avoid: < > : \" / \\ | ? *"
        )));
    }

    if name == "." || name == ".." {
        return Err(ProjectError::validation(format!("{field} cannot be '{name}'")));
    }

    Ok(())
}

/// Check a tempo against the configured range. `0` means "not given".
pub fn validate_tempo(bpm: u32, settings: &Settings) -> ProjectResult<Option<u32>> {
    if bpm == 0 {
        return Ok(None);
    }
    if bpm < settings.tempo_min || bpm > settings.tempo_max {
        return Err(ProjectError::validation(format!(
            "BPM must be between {} and {}, got {}",
            settings.tempo_min, settings.tempo_max, bpm
        )));
    }
    Ok(Some(bpm))
}
