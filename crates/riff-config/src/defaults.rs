//! Platform default directories.
//!
//! There is exactly one fallback: the conventional music and REAPER template
//! locations for the current OS. It is offered as a suggestion during setup
//! and used when `complete_setup` omits a directory.

use riff_common_fs::path::expand_tilde;
use std::path::PathBuf;

use crate::Settings;

/// Suggested directories, kept in their `~` form for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDefaults {
    /// Suggested project directory.
    pub project_dir: &'static str,
    /// Suggested template directory.
    pub template_dir: &'static str,
}

impl PlatformDefaults {
    /// Defaults for the OS this binary was built for.
    pub fn current() -> Self {
        Self::for_os(std::env::consts::OS)
    }

    /// Defaults for a named OS (`macos`, `windows`, anything else).
    pub fn for_os(os: &str) -> Self {
        let template_dir = match os {
            "macos" => "~/Library/Application Support/REAPER/ProjectTemplates",
            "windows" => "~/AppData/Roaming/REAPER/ProjectTemplates",
            _ => "~/Music/Templates",
        };
        Self {
            project_dir: "~/Music/Projects",
            template_dir,
        }
    }

    /// Expanded project directory.
    pub fn project_dir_path(&self) -> Option<PathBuf> {
        expand_tilde(self.project_dir)
    }

    /// Expanded template directory.
    pub fn template_dir_path(&self) -> Option<PathBuf> {
        expand_tilde(self.template_dir)
    }

    /// Settings built from these defaults, not marked initialized.
    pub fn settings(&self) -> Settings {
        let mut settings = Settings::default();
        if let Some(dir) = self.project_dir_path() {
            settings.set_project_dir(dir);
        }
        if let Some(dir) = self.template_dir_path() {
            settings.set_template_dir(dir);
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_dir_per_os() {
        assert!(PlatformDefaults::for_os("macos")
            .template_dir
            .contains("Application Support/REAPER"));
        assert!(PlatformDefaults::for_os("windows")
            .template_dir
            .contains("AppData/Roaming/REAPER"));
        assert_eq!(PlatformDefaults::for_os("linux").template_dir, "~/Music/Templates");
    }

    #[test]
    fn test_default_settings_not_initialized() {
        let settings = PlatformDefaults::for_os("linux").settings();
        assert!(!settings.initialized);
        if dirs::home_dir().is_some() {
            assert!(settings.is_configured());
            assert!(settings
                .default_template()
                .unwrap()
                .ends_with("Music/Templates/default.RPP"));
        }
    }
}
