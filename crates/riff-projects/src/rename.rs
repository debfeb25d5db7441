//! Renaming a project folder and its project file.

use riff_common_fs::{self as fs, path::is_direct_child};
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument};

use crate::context::ProjectContext;
use crate::error::{ProjectError, ProjectResult};
use crate::model::Project;
use crate::query::{missing_registry_message, resolve_by_name};
use crate::registry::RegistryLocks;
use crate::validate::validate_project_name;
use crate::NOT_CONFIGURED;

fn file_name_for(new_name: &str, old_file: &Path) -> String {
    match old_file.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{new_name}.{ext}"),
        None => new_name.to_string(),
    }
}

/// Move the project at `old_file` so that it is called `new_name`.
///
/// Returns the new project file path. Nothing is touched if the target
/// already exists.
pub fn move_project(project_dir: &Path, old_file: &Path, new_name: &str) -> ProjectResult<PathBuf> {
    let new_file_name = file_name_for(new_name, old_file);

    let folder = match old_file.parent() {
        Some(parent) if !is_direct_child(old_file, project_dir) => parent,
        _ => {
            let new_file = old_file.with_file_name(&new_file_name);
            if new_file.exists() {
                return Err(ProjectError::AlreadyExists { path: new_file });
            }
            fs::rename(old_file, &new_file)?;
            return Ok(new_file);
        }
    };

    let new_folder = folder.with_file_name(new_name);
    if new_folder.exists() {
        return Err(ProjectError::AlreadyExists { path: new_folder });
    }

    fs::rename(folder, &new_folder)?;

    let moved_file = old_file
        .file_name()
        .map(|name| new_folder.join(name))
        .unwrap_or_else(|| new_folder.join(&new_file_name));
    let new_file = new_folder.join(&new_file_name);
    if moved_file == new_file {
        return Ok(new_file);
    }

    if let Err(e) = fs::rename(&moved_file, &new_file) {
        if let Err(rollback) = fs::rename(&new_folder, folder) {
            error!(
                folder = %new_folder.display(),
                error = %rollback,
                "Could not restore project folder name"
            );
        }
        return Err(e.into());
    }

    Ok(new_file)
}

/// Rename the registered project matching `old_name` to `new_name`.
#[instrument(skip(ctx, locks), fields(op_id = %ctx.operation_id))]
pub async fn rename_project(
    ctx: &ProjectContext,
    locks: &RegistryLocks,
    old_name: &str,
    new_name: &str,
) -> ProjectResult<String> {
    if old_name.trim().is_empty() {
        return Err(ProjectError::validation(
            "project name is required and cannot be empty",
        ));
    }
    validate_project_name(new_name, "new project name")?;

    let Some(project_dir) = ctx.project_dir() else {
        return Ok(NOT_CONFIGURED.to_string());
    };

    let guard = locks.lock(project_dir).await;
    let Some(mut projects) = guard.load()? else {
        return Ok(missing_registry_message(&guard));
    };

    let index = resolve_by_name(&projects, old_name)?;
    let previous = projects[index].clone();

    let new_file = move_project(project_dir, &previous.path, new_name)?;
    let updated = match Project::from_file(&new_file) {
        Ok(project) => project,
        Err(_) => Project {
            name: new_name.to_string(),
            path: new_file.clone(),
            ..previous.clone()
        },
    };
    projects[index] = updated;
    guard.save(&projects)?;

    info!(from = %previous.name, to = new_name, path = %new_file.display(), "Project renamed");
    Ok(format!(
        "Renamed project '{}' to '{}': {}",
        previous.name,
        new_name,
        new_file.display()
    ))
}
