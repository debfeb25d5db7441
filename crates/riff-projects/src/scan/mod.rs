//! Background scan of the project directory.

mod cancel;
mod status;

pub use cancel::{CancellationToken, CancellationWatcher};
pub use status::{ScanStatus, ScanTracker};

use chrono::Utc;
use riff_common_fs::{self as fs, FsError};
use riff_config::PROJECT_EXTENSION;
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument, warn, Instrument};
use walkdir::WalkDir;

use crate::context::ProjectContext;
use crate::error::ProjectResult;
use crate::model::Project;
use crate::registry::RegistryLocks;
use crate::NOT_CONFIGURED;

/// Walk `root` for project files. `Ok(None)` when cancelled.
///
/// Any walk error, including a missing or unreadable `root`, aborts the
/// walk. A project file whose metadata cannot be read is skipped.
pub fn collect_projects(
    root: &Path,
    cancel: &CancellationWatcher,
) -> ProjectResult<Option<Vec<Project>>> {
    let mut projects = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        if cancel.is_cancelled() {
            return Ok(None);
        }

        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            FsError::io("walk", &path, e.into())
        })?;
        if !entry.file_type().is_file() || !fs::has_extension(entry.path(), PROJECT_EXTENSION) {
            continue;
        }

        match Project::from_file(entry.path()) {
            Ok(project) => projects.push(project),
            Err(e) => warn!(path = %entry.path().display(), error = %e, "Skipping project file"),
        }
    }

    Ok(Some(projects))
}

/// Start a background scan and return immediately.
#[instrument(skip_all, fields(op_id = %ctx.operation_id))]
pub fn start_scan(
    ctx: &ProjectContext,
    locks: &RegistryLocks,
    tracker: &ScanTracker,
) -> ProjectResult<String> {
    let Some(project_dir) = ctx.project_dir() else {
        return Ok(NOT_CONFIGURED.to_string());
    };
    if !project_dir.is_dir() {
        return Ok(format!(
            "Project directory does not exist: {}",
            project_dir.display()
        ));
    }

    let project_dir = fs::path::absolute(project_dir);
    let Some(watcher) = tracker.begin(project_dir.clone()) else {
        return Ok(
            "A scan is already running. Use 'scan_status' to check progress or 'cancel_scan' to stop it."
                .to_string(),
        );
    };

    let span = tracing::info_span!("scan", dir = %project_dir.display());
    let handle = tokio::spawn(
        run_scan(project_dir.clone(), locks.clone(), tracker.clone(), watcher).instrument(span),
    );
    tracker.attach(handle);

    info!(dir = %project_dir.display(), "Scan started");
    Ok(format!(
        "Scanning {} in the background. Use 'list_projects' to see results once complete.",
        project_dir.display()
    ))
}

async fn run_scan(
    project_dir: PathBuf,
    locks: RegistryLocks,
    tracker: ScanTracker,
    watcher: CancellationWatcher,
) {
    let guard = locks.lock(&project_dir).await;

    let walk = tokio::task::spawn_blocking({
        let root = project_dir.clone();
        let watcher = watcher.clone();
        move || collect_projects(&root, &watcher)
    });
    let mut cancelled = watcher.clone();

    let outcome = tokio::select! {
        result = walk => Some(result),
        _ = cancelled.cancelled() => None,
    };

    let finished_at = Utc::now();
    let status = match outcome {
        None | Some(Ok(Ok(None))) => {
            info!("Scan cancelled");
            ScanStatus::Cancelled {
                project_dir,
                finished_at,
            }
        }
        Some(Ok(Ok(Some(projects)))) => match guard.replace(&projects) {
            Ok(()) => {
                info!(count = projects.len(), "Scan complete");
                ScanStatus::Done {
                    project_dir,
                    projects: projects.len(),
                    finished_at,
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to write registry");
                ScanStatus::Failed {
                    project_dir,
                    message: e.to_string(),
                    finished_at,
                }
            }
        },
        Some(Ok(Err(e))) => {
            error!(error = %e, "Scan aborted; registry left untouched");
            ScanStatus::Failed {
                project_dir,
                message: e.to_string(),
                finished_at,
            }
        }
        Some(Err(e)) => {
            error!(error = %e, "Scan task failed");
            ScanStatus::Failed {
                project_dir,
                message: e.to_string(),
                finished_at,
            }
        }
    };

    drop(guard);
    tracker.finish(status);
}

/// Describe the state of the last scan as indented JSON.
pub fn scan_status(tracker: &ScanTracker) -> ProjectResult<String> {
    Ok(serde_json::to_string_pretty(&tracker.status())?)
}

/// Stop a running scan.
pub fn cancel_scan(tracker: &ScanTracker) -> String {
    if tracker.cancel() {
        info!("Scan cancellation requested");
        "Cancelling the running scan. The registry will not be updated.".to_string()
    } else {
        "No scan is running.".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riff_config::Settings;
    use tempfile::tempdir;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_collect_matches_extension_case_insensitively() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("a/a.RPP"), "  TEMPO 100 4 4\n");
        write(&dir.path().join("b/nested/b.rpp"), "TEMPO 90 4 4\n");
        write(&dir.path().join("c/c.RPP-bak"), "");
        write(&dir.path().join("notes.txt"), "");

        let (_token, watcher) = CancellationToken::new();
        let mut projects = collect_projects(dir.path(), &watcher).unwrap().unwrap();
        projects.sort_by(|a, b| a.name.cmp(&b.name));

        let names: Vec<_> = projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(projects[0].bpm, 100.0);
        assert_eq!(projects[1].bpm, 90.0);
    }

    #[test]
    fn test_collect_stops_when_cancelled() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("a/a.RPP"), "");

        let (token, watcher) = CancellationToken::new();
        token.cancel();
        assert!(collect_projects(dir.path(), &watcher).unwrap().is_none());
    }

    #[test]
    fn test_collect_missing_root_is_error() {
        let dir = tempdir().unwrap();
        let (_token, watcher) = CancellationToken::new();
        let err = collect_projects(&dir.path().join("gone"), &watcher).unwrap_err();
        assert!(matches!(err, crate::ProjectError::Fs(ref e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn test_scan_writes_registry() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("song/song.RPP"), "TEMPO 128 4 4\n");

        let ctx = ProjectContext::new(Settings::configured(dir.path(), dir.path().join("t")));
        let locks = RegistryLocks::new();
        let tracker = ScanTracker::new();

        let msg = start_scan(&ctx, &locks, &tracker).unwrap();
        assert!(msg.starts_with("Scanning "));
        tracker.wait().await;

        match tracker.status() {
            ScanStatus::Done { projects, .. } => assert_eq!(projects, 1),
            other => panic!("unexpected status {other:?}"),
        }
        let raw = std::fs::read_to_string(dir.path().join("registry.json")).unwrap();
        assert!(raw.contains("\"bpm\": 128.0"));
    }

    #[tokio::test]
    async fn test_scan_missing_dir_is_message() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let ctx = ProjectContext::new(Settings::configured(&missing, dir.path()));

        let msg = start_scan(&ctx, &RegistryLocks::new(), &ScanTracker::new()).unwrap();
        assert_eq!(msg, format!("Project directory does not exist: {}", missing.display()));
    }

    #[tokio::test]
    async fn test_vanished_dir_fails_without_touching_registry() {
        let dir = tempdir().unwrap();
        let project_dir = dir.path().join("projects");
        write(&project_dir.join("song/song.RPP"), "TEMPO 100 4 4\n");
        let ctx = ProjectContext::new(Settings::configured(&project_dir, dir.path()));
        let locks = RegistryLocks::new();
        let tracker = ScanTracker::new();

        // Hold the lock so the directory can disappear before the walk.
        let guard = locks.lock(&project_dir).await;
        start_scan(&ctx, &locks, &tracker).unwrap();
        std::fs::remove_dir_all(&project_dir).unwrap();
        drop(guard);

        tracker.wait().await;
        match tracker.status() {
            ScanStatus::Failed { message, .. } => assert!(message.contains("projects")),
            other => panic!("unexpected status {other:?}"),
        }
        assert!(!project_dir.exists());
    }

    #[tokio::test]
    async fn test_cancelled_scan_leaves_registry_alone() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("song/song.RPP"), "");
        let ctx = ProjectContext::new(Settings::configured(dir.path(), dir.path()));
        let locks = RegistryLocks::new();
        let tracker = ScanTracker::new();

        let guard = locks.lock(dir.path()).await;
        start_scan(&ctx, &locks, &tracker).unwrap();
        assert!(start_scan(&ctx, &locks, &tracker).unwrap().contains("already running"));
        assert!(cancel_scan(&tracker).starts_with("Cancelling"));
        drop(guard);

        tracker.wait().await;
        assert!(matches!(tracker.status(), ScanStatus::Cancelled { .. }));
        assert!(!dir.path().join("registry.json").exists());
        assert_eq!(cancel_scan(&tracker), "No scan is running.");
    }
}
