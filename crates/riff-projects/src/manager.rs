//! Owner of the shared state behind every project operation.

use std::sync::Arc;

use crate::context::ProjectContext;
use crate::error::ProjectResult;
use crate::launch::{Launcher, SystemLauncher};
use crate::query::FilterCriteria;
use crate::registry::RegistryLocks;
use crate::scan::{ScanStatus, ScanTracker};
use crate::{create, open, query, rename, scan};

/// Registry locks, the scan slot and the launcher, shared by all calls.
#[derive(Clone)]
pub struct ProjectManager {
    locks: RegistryLocks,
    scans: ScanTracker,
    launcher: Arc<dyn Launcher>,
}

impl std::fmt::Debug for ProjectManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectManager")
            .field("scan", &self.scans.status())
            .finish_non_exhaustive()
    }
}

impl Default for ProjectManager {
    fn default() -> Self {
        Self::new(Arc::new(SystemLauncher::new()))
    }
}

impl ProjectManager {
    /// Manager using `launcher` for the DAW and file browser.
    pub fn new(launcher: Arc<dyn Launcher>) -> Self {
        Self {
            locks: RegistryLocks::new(),
            scans: ScanTracker::new(),
            launcher,
        }
    }

    /// Create a project from the template.
    pub async fn create_project(
        &self,
        ctx: &ProjectContext,
        name: &str,
        bpm: u32,
    ) -> ProjectResult<String> {
        create::create_project(ctx, &self.locks, self.launcher.as_ref(), name, bpm).await
    }

    /// Start a background scan.
    pub fn scan(&self, ctx: &ProjectContext) -> ProjectResult<String> {
        scan::start_scan(ctx, &self.locks, &self.scans)
    }

    /// State of the last scan as JSON.
    pub fn scan_status(&self) -> ProjectResult<String> {
        scan::scan_status(&self.scans)
    }

    /// Cancel the running scan.
    pub fn cancel_scan(&self) -> String {
        scan::cancel_scan(&self.scans)
    }

    /// Current scan state.
    pub fn scan_state(&self) -> ScanStatus {
        self.scans.status()
    }

    /// Wait for the last started scan to exit.
    pub async fn wait_for_scan(&self) {
        self.scans.wait().await;
    }

    /// Most recent projects.
    pub fn list_projects(&self, ctx: &ProjectContext) -> ProjectResult<String> {
        query::list_projects(ctx)
    }

    /// Projects matching `criteria`.
    pub fn filter_projects(
        &self,
        ctx: &ProjectContext,
        criteria: &FilterCriteria,
    ) -> ProjectResult<String> {
        query::filter_projects(ctx, criteria)
    }

    /// Rename a registered project.
    pub async fn rename_project(
        &self,
        ctx: &ProjectContext,
        old_name: &str,
        new_name: &str,
    ) -> ProjectResult<String> {
        rename::rename_project(ctx, &self.locks, old_name, new_name).await
    }

    /// Open a project file in the DAW.
    pub async fn open_project(&self, ctx: &ProjectContext, path: &str) -> ProjectResult<String> {
        open::open_project(ctx, self.launcher.as_ref(), path).await
    }

    /// Reveal a project by path or name.
    pub async fn open_in_finder(
        &self,
        ctx: &ProjectContext,
        path: Option<&str>,
        name: Option<&str>,
    ) -> ProjectResult<String> {
        open::open_in_finder(ctx, self.launcher.as_ref(), path, name).await
    }
}
