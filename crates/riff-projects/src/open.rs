//! Opening projects in the DAW and revealing them in the file browser.

use riff_common_fs::path::expand_tilde;
use std::path::{Path, PathBuf};
use tracing::instrument;

use crate::context::ProjectContext;
use crate::error::{ProjectError, ProjectResult};
use crate::launch::Launcher;
use crate::query::{is_project_file, missing_registry_message, resolve_by_name};
use crate::registry::RegistryStore;
use crate::NOT_CONFIGURED;

/// Check that `path` points at an existing project file.
pub fn validate_project_path(path: &str) -> ProjectResult<PathBuf> {
    if path.trim().is_empty() {
        return Err(ProjectError::validation(
            "project path is required and cannot be empty",
        ));
    }
    let resolved = expand_tilde(path).unwrap_or_else(|| PathBuf::from(path));
    check_project_file(&resolved)?;
    Ok(resolved)
}

/// The existence and extension checks, for paths that are already resolved.
fn check_project_file(resolved: &Path) -> ProjectResult<()> {
    if !resolved.exists() {
        return Err(ProjectError::NotFound {
            what: "project file",
            query: resolved.display().to_string(),
        });
    }
    if !is_project_file(&resolved) {
        let ext = resolved
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        return Err(ProjectError::validation(format!(
            "file must be a .RPP (Reaper project) file, got: {ext}"
        )));
    }
    Ok(())
}

/// Open the project file at `path` in the DAW.
#[instrument(skip(ctx, launcher), fields(op_id = %ctx.operation_id))]
pub async fn open_project(
    ctx: &ProjectContext,
    launcher: &dyn Launcher,
    path: &str,
) -> ProjectResult<String> {
    let path = validate_project_path(path)?;
    launcher.open_in_daw(&ctx.settings.daw_app, &path).await?;
    Ok(format!("Opened project: {}", path.display()))
}

/// Reveal a project in the file browser, by `path` or by registered `name`.
#[instrument(skip(ctx, launcher), fields(op_id = %ctx.operation_id))]
pub async fn open_in_finder(
    ctx: &ProjectContext,
    launcher: &dyn Launcher,
    path: Option<&str>,
    name: Option<&str>,
) -> ProjectResult<String> {
    let non_empty = |v: Option<&str>| v.filter(|s| !s.trim().is_empty()).map(str::to_string);

    let target = match (non_empty(path), non_empty(name)) {
        (Some(path), _) => validate_project_path(&path)?,
        (None, Some(name)) => {
            let Some(project_dir) = ctx.project_dir() else {
                return Ok(NOT_CONFIGURED.to_string());
            };
            let store = RegistryStore::new(project_dir);
            let Some(projects) = store.load()? else {
                return Ok(missing_registry_message(&store));
            };
            let index = resolve_by_name(&projects, &name)?;
            // The registry may predate a move or delete.
            check_project_file(&projects[index].path)?;
            projects[index].path.clone()
        }
        (None, None) => {
            return Err(ProjectError::validation(
                "either path or name is required to reveal a project",
            ))
        }
    };

    launcher.reveal(&target).await?;
    Ok(format!("Revealed in file browser: {}", target.display()))
}
