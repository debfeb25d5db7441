//! The sidecar registry file and the locks that serialize its writers.

use riff_common_fs as fs;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info};

use crate::error::{ProjectError, ProjectResult};
use crate::model::Project;

/// Sidecar file name inside the project directory.
pub const REGISTRY_FILE: &str = "registry.json";

/// Sidecar name used by older plugin generations, read when
/// [`REGISTRY_FILE`] is absent.
pub const LEGACY_REGISTRY_FILE: &str = "projects.json";

/// Reads and writes the registry of one project directory.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    path: PathBuf,
    legacy_path: PathBuf,
}

impl RegistryStore {
    /// Registry for `project_dir`.
    pub fn new(project_dir: &Path) -> Self {
        Self {
            path: project_dir.join(REGISTRY_FILE),
            legacy_path: project_dir.join(LEGACY_REGISTRY_FILE),
        }
    }

    /// File that [`save`](Self::save) writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all entries. `None` means no sidecar exists yet.
    pub fn load(&self) -> ProjectResult<Option<Vec<Project>>> {
        let (path, bytes) = match fs::read_optional(&self.path)? {
            Some(bytes) => (&self.path, bytes),
            None => match fs::read_optional(&self.legacy_path)? {
                Some(bytes) => {
                    debug!(path = %self.legacy_path.display(), "Reading legacy registry");
                    (&self.legacy_path, bytes)
                }
                None => return Ok(None),
            },
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Some(Vec::new()));
        }

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| ProjectError::Registry {
                path: path.clone(),
                source,
            })
    }

    /// Replace the sidecar with `projects`, atomically.
    pub fn save(&self, projects: &[Project]) -> ProjectResult<()> {
        let data = serde_json::to_vec_pretty(projects).map_err(|source| ProjectError::Registry {
            path: self.path.clone(),
            source,
        })?;
        fs::write_atomic(&self.path, &data)?;
        debug!(path = %self.path.display(), count = projects.len(), "Registry written");
        Ok(())
    }

    /// Insert `project`, replacing any entry with the same path.
    pub fn upsert(&self, project: Project) -> ProjectResult<()> {
        let mut projects = self.load()?.unwrap_or_default();
        match projects.iter_mut().find(|p| p.path == project.path) {
            Some(existing) => *existing = project,
            None => projects.push(project),
        }
        self.save(&projects)
    }
}

/// One async mutex per project directory.
///
/// Every writer of a sidecar holds the directory's lock for its whole
/// read-modify-write, so a scan and a create never overwrite each other.
#[derive(Debug, Default, Clone)]
pub struct RegistryLocks {
    locks: Arc<Mutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>>,
}

impl RegistryLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, project_dir: &Path) -> Arc<AsyncMutex<()>> {
        // "proj", "./proj" and "<cwd>/proj" share one lock
        let key = fs::path::absolute(project_dir);
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(key)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Wait for exclusive access to the registry of `project_dir`.
    pub async fn lock(&self, project_dir: &Path) -> RegistryGuard {
        let guard = self.entry(project_dir).lock_owned().await;
        RegistryGuard {
            store: RegistryStore::new(project_dir),
            _guard: guard,
        }
    }

    /// Whether someone currently holds the lock for `project_dir`.
    pub fn is_locked(&self, project_dir: &Path) -> bool {
        self.entry(project_dir).try_lock().is_err()
    }
}

/// Exclusive handle on one registry, released on drop.
#[derive(Debug)]
pub struct RegistryGuard {
    store: RegistryStore,
    _guard: OwnedMutexGuard<()>,
}

impl std::ops::Deref for RegistryGuard {
    type Target = RegistryStore;

    fn deref(&self) -> &RegistryStore {
        &self.store
    }
}

impl RegistryGuard {
    /// Replace the registry and log the new size.
    pub fn replace(&self, projects: &[Project]) -> ProjectResult<()> {
        self.save(projects)?;
        info!(path = %self.path().display(), count = projects.len(), "Registry replaced");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;
    use tempfile::tempdir;

    fn project(dir: &Path, name: &str, nanos: u32) -> Project {
        Project {
            name: name.to_string(),
            path: dir.join(name).join(format!("{name}.RPP")),
            last_modified: Utc.timestamp_opt(1_700_000_000, nanos).unwrap(),
            size: 512,
            bpm: 120.0,
        }
    }

    #[test]
    fn test_load_absent_is_none() {
        let dir = tempdir().unwrap();
        assert!(RegistryStore::new(dir.path()).load().unwrap().is_none());
    }

    #[test]
    fn test_round_trip_keeps_nanoseconds() {
        let dir = tempdir().unwrap();
        let store = RegistryStore::new(dir.path());
        let projects = vec![project(dir.path(), "a", 123_456_789)];

        store.save(&projects).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, projects);

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"lastModified\": \"2023-11-14T22:13:20.123456789Z\""));
    }

    #[test]
    fn test_empty_file_has_no_entries() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(REGISTRY_FILE), "").unwrap();
        assert_eq!(RegistryStore::new(dir.path()).load().unwrap(), Some(vec![]));
    }

    #[test]
    fn test_legacy_file_is_read() {
        let dir = tempdir().unwrap();
        let legacy = serde_json::to_vec(&vec![project(dir.path(), "old", 0)]).unwrap();
        std::fs::write(dir.path().join(LEGACY_REGISTRY_FILE), legacy).unwrap();

        let store = RegistryStore::new(dir.path());
        assert_eq!(store.load().unwrap().unwrap()[0].name, "old");

        store.upsert(project(dir.path(), "new", 0)).unwrap();
        assert!(dir.path().join(REGISTRY_FILE).exists());
        assert_eq!(store.load().unwrap().unwrap().len(), 2);
    }

    #[test]
    fn test_corrupt_file_is_registry_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(REGISTRY_FILE), "[{").unwrap();
        let err = RegistryStore::new(dir.path()).load().unwrap_err();
        assert!(matches!(err, ProjectError::Registry { .. }));
    }

    #[test]
    fn test_upsert_replaces_same_path() {
        let dir = tempdir().unwrap();
        let store = RegistryStore::new(dir.path());
        store.upsert(project(dir.path(), "a", 0)).unwrap();

        let mut updated = project(dir.path(), "a", 0);
        updated.bpm = 90.0;
        store.upsert(updated).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].bpm, 90.0);
    }

    #[tokio::test]
    async fn test_lock_serializes_access() {
        let dir = tempdir().unwrap();
        let locks = RegistryLocks::new();

        let guard = locks.lock(dir.path()).await;
        assert!(locks.is_locked(dir.path()));

        let other = locks.clone();
        let path = dir.path().to_path_buf();
        let waiter = tokio::spawn(async move {
            let guard = other.lock(&path).await;
            guard.load().unwrap().map(|p| p.len())
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        guard.replace(&[project(dir.path(), "a", 0)]).unwrap();
        drop(guard);

        assert_eq!(waiter.await.unwrap(), Some(1));
        assert!(!locks.is_locked(dir.path()));
    }

    #[tokio::test]
    async fn test_relative_and_absolute_dir_share_lock() {
        let locks = RegistryLocks::new();
        let absolute = std::env::current_dir().unwrap().join("riff-lock-key");

        let guard = locks.lock(&absolute).await;
        assert!(locks.is_locked(Path::new("riff-lock-key")));
        assert!(locks.is_locked(Path::new("./riff-lock-key")));
        drop(guard);
        assert!(!locks.is_locked(Path::new("riff-lock-key")));
    }
}
