//! Tracking the background scan.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::debug;

use super::cancel::{CancellationToken, CancellationWatcher};

/// State of the most recent scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScanStatus {
    /// No scan has run yet.
    Idle,
    /// A scan is walking the project directory.
    Running {
        /// Directory being scanned.
        project_dir: PathBuf,
        /// When the scan started.
        started_at: DateTime<Utc>,
    },
    /// The registry was written.
    Done {
        /// Directory that was scanned.
        project_dir: PathBuf,
        /// Number of project files recorded.
        projects: usize,
        /// When the registry was written.
        finished_at: DateTime<Utc>,
    },
    /// The scan stopped on an error; the registry was left as it was.
    Failed {
        /// Directory that was scanned.
        project_dir: PathBuf,
        /// What went wrong.
        message: String,
        /// When the scan stopped.
        finished_at: DateTime<Utc>,
    },
    /// The scan was cancelled before writing.
    Cancelled {
        /// Directory that was scanned.
        project_dir: PathBuf,
        /// When the scan stopped.
        finished_at: DateTime<Utc>,
    },
}

impl ScanStatus {
    /// Whether a scan is in progress.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

#[derive(Debug)]
struct TrackerState {
    status: ScanStatus,
    token: Option<CancellationToken>,
    handle: Option<JoinHandle<()>>,
}

/// Owns the single background scan slot.
#[derive(Debug, Clone)]
pub struct ScanTracker {
    state: Arc<Mutex<TrackerState>>,
}

impl Default for ScanTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanTracker {
    /// Create an idle tracker.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(TrackerState {
                status: ScanStatus::Idle,
                token: None,
                handle: None,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current status.
    pub fn status(&self) -> ScanStatus {
        self.state().status.clone()
    }

    /// Claim the slot for a scan of `project_dir`.
    ///
    /// Returns `None` while another scan is running.
    pub fn begin(&self, project_dir: PathBuf) -> Option<CancellationWatcher> {
        let mut state = self.state();
        if state.status.is_running() {
            return None;
        }
        let (token, watcher) = CancellationToken::new();
        state.status = ScanStatus::Running {
            project_dir,
            started_at: Utc::now(),
        };
        state.token = Some(token);
        Some(watcher)
    }

    /// Remember the task running the claimed scan.
    pub fn attach(&self, handle: JoinHandle<()>) {
        self.state().handle = Some(handle);
    }

    /// Record how the scan ended and release the slot.
    pub fn finish(&self, status: ScanStatus) {
        debug!(?status, "Scan finished");
        let mut state = self.state();
        state.status = status;
        state.token = None;
    }

    /// Cancel the running scan. Returns whether one was running.
    pub fn cancel(&self) -> bool {
        let state = self.state();
        match (&state.status, &state.token) {
            (ScanStatus::Running { .. }, Some(token)) => {
                token.cancel();
                true
            }
            _ => false,
        }
    }

    /// Wait until the last started scan task has exited.
    pub async fn wait(&self) {
        let handle = self.state().handle.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_claims_single_slot() {
        let tracker = ScanTracker::new();
        assert_eq!(tracker.status(), ScanStatus::Idle);

        let watcher = tracker.begin(PathBuf::from("/p"));
        assert!(watcher.is_some());
        assert!(tracker.status().is_running());
        assert!(tracker.begin(PathBuf::from("/p")).is_none());

        tracker.finish(ScanStatus::Done {
            project_dir: PathBuf::from("/p"),
            projects: 2,
            finished_at: Utc::now(),
        });
        assert!(tracker.begin(PathBuf::from("/p")).is_some());
    }

    #[test]
    fn test_cancel_only_when_running() {
        let tracker = ScanTracker::new();
        assert!(!tracker.cancel());

        let watcher = tracker.begin(PathBuf::from("/p")).unwrap();
        assert!(tracker.cancel());
        assert!(watcher.is_cancelled());
    }

    #[test]
    fn test_status_serializes_with_state_tag() {
        let json = serde_json::to_value(ScanStatus::Failed {
            project_dir: PathBuf::from("/p"),
            message: "denied".into(),
            finished_at: Utc::now(),
        })
        .unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["message"], "denied");
        assert_eq!(serde_json::to_value(ScanStatus::Idle).unwrap()["state"], "idle");
    }

    #[tokio::test]
    async fn test_wait_without_task_returns() {
        ScanTracker::new().wait().await;
    }
}
