//! Settings and agent context types.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::TEMPLATE_FILE_NAME;

fn default_tempo_min() -> u32 {
    30
}

fn default_tempo_max() -> u32 {
    300
}

fn default_daw_app() -> String {
    "REAPER".to_string()
}

/// Plugin settings for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Root directory new projects are created in and scans start from.
    #[serde(default)]
    pub project_dir: Option<PathBuf>,

    /// Directory holding `default.RPP`.
    #[serde(default)]
    pub template_dir: Option<PathBuf>,

    /// Always `template_dir/default.RPP`, derived.
    #[serde(default)]
    pub default_template: Option<PathBuf>,

    /// Whether setup has been completed.
    #[serde(default)]
    pub initialized: bool,

    /// Lowest accepted tempo for new projects.
    #[serde(default = "default_tempo_min")]
    pub tempo_min: u32,

    /// Highest accepted tempo for new projects.
    #[serde(default = "default_tempo_max")]
    pub tempo_max: u32,

    /// Application name handed to the OS launcher.
    #[serde(default = "default_daw_app")]
    pub daw_app: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_dir: None,
            template_dir: None,
            default_template: None,
            initialized: false,
            tempo_min: default_tempo_min(),
            tempo_max: default_tempo_max(),
            daw_app: default_daw_app(),
        }
    }
}

impl Settings {
    /// Settings with both directories set and marked initialized.
    pub fn configured(project_dir: impl Into<PathBuf>, template_dir: impl Into<PathBuf>) -> Self {
        let mut settings = Self::default();
        settings.set_project_dir(project_dir);
        settings.set_template_dir(template_dir);
        settings.initialized = true;
        settings
    }

    /// Set the project directory.
    pub fn set_project_dir(&mut self, dir: impl Into<PathBuf>) {
        self.project_dir = Some(dir.into());
    }

    /// Set the template directory and re-derive the default template.
    pub fn set_template_dir(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        self.default_template = Some(dir.join(TEMPLATE_FILE_NAME));
        self.template_dir = Some(dir);
    }

    /// Project directory, if set to something non-empty.
    pub fn project_dir(&self) -> Option<&Path> {
        non_empty(self.project_dir.as_deref())
    }

    /// Template directory, if set to something non-empty.
    pub fn template_dir(&self) -> Option<&Path> {
        non_empty(self.template_dir.as_deref())
    }

    /// Path of the template file new projects are copied from.
    pub fn default_template(&self) -> Option<PathBuf> {
        self.template_dir().map(|dir| dir.join(TEMPLATE_FILE_NAME))
    }

    /// Both directories are set.
    pub fn is_configured(&self) -> bool {
        self.project_dir().is_some() && self.template_dir().is_some()
    }

    /// Parent of the project directory, stored as `path` for the host UI.
    pub fn parent_path(&self) -> Option<PathBuf> {
        self.project_dir()
            .and_then(|p| p.parent())
            .map(|p| p.to_path_buf())
    }

    /// Drop empty paths and re-derive `default_template`.
    pub fn normalize(mut self) -> Self {
        self.project_dir = self.project_dir().map(Path::to_path_buf);
        self.template_dir = self.template_dir().map(Path::to_path_buf);
        self.default_template = self.default_template();
        if self.daw_app.trim().is_empty() {
            self.daw_app = default_daw_app();
        }
        self
    }
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}

/// Identifies the agent whose settings file is read and written.
///
/// Supplied by the host; the plugin never invents one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentContext {
    /// Agent name, e.g. `reaper-project-manager`.
    pub name: String,
    /// Agent's main config file (`agents/{name}/config.json`).
    #[serde(default)]
    pub config_path: PathBuf,
    /// Agent's settings file (`agents/{name}/agent_settings.json`).
    pub settings_path: PathBuf,
    /// Agent's directory (`agents/{name}/`).
    #[serde(default)]
    pub agent_dir: PathBuf,
}

impl AgentContext {
    /// Build a context using the host's standard layout inside `agent_dir`.
    pub fn from_agent_dir(name: impl Into<String>, agent_dir: impl Into<PathBuf>) -> Self {
        let agent_dir = agent_dir.into();
        Self {
            name: name.into(),
            config_path: agent_dir.join("config.json"),
            settings_path: agent_dir.join("agent_settings.json"),
            agent_dir,
        }
    }

    /// Context pointing at an explicit settings file.
    pub fn with_settings_path(name: impl Into<String>, settings_path: impl Into<PathBuf>) -> Self {
        let settings_path = settings_path.into();
        let agent_dir = settings_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            name: name.into(),
            config_path: agent_dir.join("config.json"),
            settings_path,
            agent_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_unconfigured() {
        let settings = Settings::default();
        assert!(!settings.is_configured());
        assert!(!settings.initialized);
        assert_eq!(settings.tempo_min, 30);
        assert_eq!(settings.tempo_max, 300);
        assert_eq!(settings.daw_app, "REAPER");
    }

    #[test]
    fn test_template_dir_derives_default_template() {
        let mut settings = Settings::default();
        settings.set_template_dir("/music/templates");
        assert_eq!(
            settings.default_template,
            Some(PathBuf::from("/music/templates/default.RPP"))
        );
    }

    #[test]
    fn test_normalize_drops_empty_paths() {
        let settings: Settings = serde_json::from_str(
            r#"{"project_dir": "", "template_dir": "/t", "default_template": "/elsewhere/x.RPP"}"#,
        )
        .unwrap();
        let settings = settings.normalize();

        assert_eq!(settings.project_dir, None);
        assert_eq!(settings.default_template, Some(PathBuf::from("/t/default.RPP")));
        assert!(!settings.is_configured());
    }

    #[test]
    fn test_legacy_section_without_tempo_bounds() {
        let settings: Settings =
            serde_json::from_str(r#"{"project_dir": "/p", "template_dir": "/t", "path": "/", "initialized": true}"#)
                .unwrap();
        assert!(settings.is_configured());
        assert_eq!(settings.tempo_min, 30);
        assert_eq!(settings.parent_path(), Some(PathBuf::from("/")));
    }

    #[test]
    fn test_agent_context_layout() {
        let ctx = AgentContext::from_agent_dir("default", "/agents/default");
        assert_eq!(ctx.settings_path, PathBuf::from("/agents/default/agent_settings.json"));
        assert_eq!(ctx.config_path, PathBuf::from("/agents/default/config.json"));

        let ctx = AgentContext::with_settings_path("x", "/a/b/settings.json");
        assert_eq!(ctx.agent_dir, PathBuf::from("/a/b"));
    }
}
