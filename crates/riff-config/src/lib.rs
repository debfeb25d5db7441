//! Settings and agent context for Riff.
//!
//! The plugin persists two directory paths per agent, inside the agent's own
//! settings file under the `music_project_manager` key. The host tells the
//! plugin which agent is active through an [`AgentContext`].

pub mod defaults;
pub mod store;
pub mod types;

pub use defaults::PlatformDefaults;
pub use store::{SettingsError, SettingsResult, SettingsStore};
pub use types::*;

/// Key under which the plugin's section lives in the agent settings file.
pub const SETTINGS_NAMESPACE: &str = "music_project_manager";

/// File name of the template every new project is copied from.
pub const TEMPLATE_FILE_NAME: &str = "default.RPP";

/// Project file extension, compared case-insensitively.
pub const PROJECT_EXTENSION: &str = "RPP";
