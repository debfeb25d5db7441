//! First-run setup and settings operations.

use riff_common_fs::{self as fs, path::expand_tilde};
use riff_config::{PlatformDefaults, Settings, SettingsStore};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::{PluginError, Result};

/// Status shown by `get_settings` before setup.
pub const NOT_CONFIGURED_STATUS: &str = "Not configured - run setup to initialize";

fn expand(field: &str, raw: &str) -> Result<PathBuf> {
    expand_tilde(raw.trim()).ok_or_else(|| {
        PluginError::InvalidArguments(format!(
            "failed to expand home directory in {field} {raw:?}"
        ))
    })
}

fn given(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

fn display(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "(not set)".to_string())
}

/// Current settings as indented JSON.
pub fn get_settings(store: &SettingsStore) -> Result<String> {
    let settings = store.load()?;

    let mut value = serde_json::to_value(&settings)?;
    if let Value::Object(map) = &mut value {
        map.insert(
            "path".to_string(),
            settings
                .parent_path()
                .map(|p| Value::String(p.display().to_string()))
                .unwrap_or(Value::Null),
        );
        if !settings.is_configured() {
            map.insert(
                "status".to_string(),
                Value::String(NOT_CONFIGURED_STATUS.to_string()),
            );
        }
    }
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Summary when set up, otherwise a welcome with suggested directories.
pub fn init_setup(store: &SettingsStore) -> Result<String> {
    let settings = store.load()?;

    if settings.initialized && settings.is_configured() {
        return Ok(format!(
            "Music Project Manager is already set up and ready to use.\n\n\
             Current settings:\n\
             - Project Directory: {}\n\
             - Template Directory: {}\n\
             - Default Template: {}\n\n\
             Use operation 'get_settings' to view detailed configuration.",
            display(settings.project_dir()),
            display(settings.template_dir()),
            display(settings.default_template().as_deref()),
        ));
    }

    let defaults = PlatformDefaults::current();
    Ok(format!(
        "Welcome to Music Project Manager!\n\n\
         This is your first time using the plugin. Please complete the setup by providing:\n\n\
         1. **Project Directory** - Where new music projects will be created\n   \
         Suggested: {project}\n\n\
         2. **Template Directory** - Where your .RPP template files are stored\n   \
         Suggested: {template}\n\n\
         Please use operation 'complete_setup' with project_dir and template_dir parameters to finish the setup.\n\n\
         Example: music_project_manager(operation=\"complete_setup\", project_dir=\"{project}\", template_dir=\"{template}\")",
        project = defaults.project_dir,
        template = defaults.template_dir,
    ))
}

/// Set both directories, falling back to the platform defaults, and mark
/// setup complete.
pub fn complete_setup(
    store: &SettingsStore,
    project_dir: Option<&str>,
    template_dir: Option<&str>,
) -> Result<String> {
    let defaults = PlatformDefaults::current();

    let project_dir = match given(project_dir) {
        Some(raw) => expand("project_dir", raw)?,
        None => defaults
            .project_dir_path()
            .ok_or_else(|| PluginError::InvalidArguments("project_dir is required".into()))?,
    };
    let template_dir = match given(template_dir) {
        Some(raw) => expand("template_dir", raw)?,
        None => defaults
            .template_dir_path()
            .ok_or_else(|| PluginError::InvalidArguments("template_dir is required".into()))?,
    };

    fs::ensure_dir(&project_dir)?;
    fs::ensure_dir(&template_dir)?;

    let mut settings = store.load()?;
    settings.set_project_dir(&project_dir);
    settings.set_template_dir(&template_dir);
    settings.initialized = true;
    store.save(&settings)?;

    info!(project_dir = %project_dir.display(), template_dir = %template_dir.display(), "Setup completed");
    Ok(format!(
        "Setup completed successfully!\n\n\
         Configuration saved:\n\
         - Project Directory: {}\n\
         - Template Directory: {}\n\
         - Default Template: {}\n\n\
         You can now use operation 'create_project' to create new music projects. \
         Make sure to place a default.RPP template file in your template directory for best results.",
        project_dir.display(),
        template_dir.display(),
        display(settings.default_template().as_deref()),
    ))
}

fn mark_initialized(settings: &mut Settings) {
    if settings.is_configured() {
        settings.initialized = true;
    }
}

/// Change the project directory.
pub fn set_project_dir(store: &SettingsStore, project_dir: &str) -> Result<String> {
    let dir = expand("project_dir", project_dir)?;

    let mut settings = store.load()?;
    settings.set_project_dir(&dir);
    mark_initialized(&mut settings);
    store.save(&settings)?;

    info!(project_dir = %dir.display(), "Project directory set");
    Ok(format!("Project directory set to: {}", dir.display()))
}

/// Change the template directory, creating it if needed.
pub fn set_template_dir(store: &SettingsStore, template_dir: &str) -> Result<String> {
    let dir = expand("template_dir", template_dir)?;
    fs::ensure_dir(&dir)?;

    let mut settings = store.load()?;
    settings.set_template_dir(&dir);
    mark_initialized(&mut settings);
    store.save(&settings)?;

    info!(template_dir = %dir.display(), "Template directory set");
    Ok(format!("Template directory set to: {}", dir.display()))
}
