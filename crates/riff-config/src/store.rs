//! Loading and persisting settings.

use riff_common_fs::{self as fs, FsError};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::{debug, info};

use crate::{AgentContext, Settings, SETTINGS_NAMESPACE};

/// Settings loading errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to parse agent settings at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("agent settings at {} must be a JSON object", path.display())]
    NotAnObject { path: PathBuf },

    #[error("invalid music_project_manager section in {}: {source}", path.display())]
    InvalidSection {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Fs(#[from] FsError),
}

/// Result alias for settings operations.
pub type SettingsResult<T> = std::result::Result<T, SettingsError>;

/// The single source of settings handed to every operation.
///
/// With an agent context the agent settings file is the source of truth and
/// is re-read on every [`load`](Self::load). Without one, settings only live
/// in memory for the lifetime of the store.
#[derive(Debug, Default)]
pub struct SettingsStore {
    agent: RwLock<Option<AgentContext>>,
    memory: RwLock<Settings>,
}

impl SettingsStore {
    /// Store bound to an agent (or memory-only when `None`).
    pub fn new(agent: Option<AgentContext>) -> Self {
        Self {
            agent: RwLock::new(agent),
            memory: RwLock::new(Settings::default()),
        }
    }

    /// Memory-only store seeded with `settings`.
    pub fn in_memory(settings: Settings) -> Self {
        Self {
            agent: RwLock::new(None),
            memory: RwLock::new(settings.normalize()),
        }
    }

    /// Switch to another agent's settings file.
    pub fn set_agent_context(&self, ctx: AgentContext) {
        debug!(agent = %ctx.name, settings = %ctx.settings_path.display(), "Agent context set");
        *write(&self.agent) = Some(ctx);
    }

    /// Current agent context, if any.
    pub fn agent_context(&self) -> Option<AgentContext> {
        read(&self.agent).clone()
    }

    /// Load the current settings.
    pub fn load(&self) -> SettingsResult<Settings> {
        let Some(ctx) = self.agent_context() else {
            return Ok(read(&self.memory).clone());
        };

        let settings = match read_section(&ctx)? {
            Some(section) => serde_json::from_value::<Settings>(Value::Object(section))
                .map_err(|source| SettingsError::InvalidSection {
                    path: ctx.settings_path.clone(),
                    source,
                })?
                .normalize(),
            None => Settings::default(),
        };

        *write(&self.memory) = settings.clone();
        Ok(settings)
    }

    /// Persist `settings`.
    ///
    /// Only the plugin's own key in the agent settings file is touched; other
    /// keys, and unknown keys inside the section, survive.
    pub fn save(&self, settings: &Settings) -> SettingsResult<()> {
        let settings = settings.clone().normalize();
        *write(&self.memory) = settings.clone();

        let Some(ctx) = self.agent_context() else {
            return Ok(());
        };
        let path = &ctx.settings_path;

        let mut root = read_root(&ctx)?.unwrap_or_default();
        let section = root
            .entry(SETTINGS_NAMESPACE.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !section.is_object() {
            *section = Value::Object(Map::new());
        }
        if let Value::Object(section) = section {
            if let Ok(Value::Object(values)) = serde_json::to_value(&settings) {
                section.extend(values);
            }
            section.insert(
                "path".to_string(),
                settings
                    .parent_path()
                    .map(|p| Value::String(p.to_string_lossy().into_owned()))
                    .unwrap_or(Value::Null),
            );
        }

        let data = serde_json::to_vec_pretty(&Value::Object(root)).map_err(|source| {
            SettingsError::Parse {
                path: path.clone(),
                source,
            }
        })?;
        fs::write_atomic(path, &data)?;

        info!(agent = %ctx.name, path = %path.display(), "Settings saved");
        Ok(())
    }
}

fn read_root(ctx: &AgentContext) -> SettingsResult<Option<Map<String, Value>>> {
    let path = &ctx.settings_path;
    let Some(bytes) = fs::read_optional(path)? else {
        return Ok(None);
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Some(Map::new()));
    }
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        Ok(_) => Err(SettingsError::NotAnObject { path: path.clone() }),
        Err(source) => Err(SettingsError::Parse {
            path: path.clone(),
            source,
        }),
    }
}

fn read_section(ctx: &AgentContext) -> SettingsResult<Option<Map<String, Value>>> {
    Ok(read_root(ctx)?.and_then(|mut root| match root.remove(SETTINGS_NAMESPACE) {
        Some(Value::Object(section)) => Some(section),
        _ => None,
    }))
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as stdfs;
    use tempfile::tempdir;

    fn store_in(dir: &std::path::Path) -> (SettingsStore, PathBuf) {
        let path = dir.join("agents/reaper/agent_settings.json");
        let store = SettingsStore::new(Some(AgentContext::with_settings_path("reaper", &path)));
        (store, path)
    }

    #[test]
    fn test_missing_file_means_unconfigured() {
        let dir = tempdir().unwrap();
        let (store, _) = store_in(dir.path());

        let settings = store.load().unwrap();
        assert!(!settings.is_configured());
        assert!(!settings.initialized);
    }

    #[test]
    fn test_save_creates_directories_and_namespaced_section() {
        let dir = tempdir().unwrap();
        let (store, path) = store_in(dir.path());

        store
            .save(&Settings::configured("/music/Projects", "/music/Templates"))
            .unwrap();

        let raw: Value = serde_json::from_str(&stdfs::read_to_string(&path).unwrap()).unwrap();
        let section = &raw[SETTINGS_NAMESPACE];
        assert_eq!(section["project_dir"], "/music/Projects");
        assert_eq!(section["template_dir"], "/music/Templates");
        assert_eq!(section["default_template"], "/music/Templates/default.RPP");
        assert_eq!(section["path"], "/music");
        assert_eq!(section["initialized"], true);
    }

    #[test]
    fn test_save_preserves_other_keys() {
        let dir = tempdir().unwrap();
        let (store, path) = store_in(dir.path());
        stdfs::create_dir_all(path.parent().unwrap()).unwrap();
        stdfs::write(
            &path,
            r#"{"other_plugin": {"token": "abc"}, "music_project_manager": {"custom": 1}}"#,
        )
        .unwrap();

        store.save(&Settings::configured("/p", "/t")).unwrap();

        let raw: Value = serde_json::from_str(&stdfs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["other_plugin"]["token"], "abc");
        assert_eq!(raw[SETTINGS_NAMESPACE]["custom"], 1);
        assert_eq!(raw[SETTINGS_NAMESPACE]["project_dir"], "/p");
    }

    #[test]
    fn test_round_trip_is_reread_from_disk() {
        let dir = tempdir().unwrap();
        let (store, path) = store_in(dir.path());
        store.save(&Settings::configured("/p", "/t")).unwrap();

        let mut raw: Value = serde_json::from_str(&stdfs::read_to_string(&path).unwrap()).unwrap();
        raw[SETTINGS_NAMESPACE]["project_dir"] = Value::String("/elsewhere".into());
        stdfs::write(&path, raw.to_string()).unwrap();

        let settings = store.load().unwrap();
        assert_eq!(settings.project_dir(), Some(std::path::Path::new("/elsewhere")));
        assert!(settings.initialized);
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let (store, path) = store_in(dir.path());
        stdfs::create_dir_all(path.parent().unwrap()).unwrap();
        stdfs::write(&path, "{not json").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
        assert!(err.to_string().contains("agent_settings.json"));
    }

    #[test]
    fn test_memory_store_without_agent() {
        let store = SettingsStore::new(None);
        assert!(store.agent_context().is_none());

        store.save(&Settings::configured("/p", "/t")).unwrap();
        assert!(store.load().unwrap().is_configured());
    }
}
