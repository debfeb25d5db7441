//! Creating a project from the template.

use riff_common_fs::{self as fs, FsError};
use riff_config::PROJECT_EXTENSION;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

use crate::context::ProjectContext;
use crate::error::{ProjectError, ProjectResult};
use crate::launch::Launcher;
use crate::model::Project;
use crate::registry::RegistryLocks;
use crate::tempo::apply_tempo;
use crate::validate::{validate_project_name, validate_tempo};
use crate::NOT_CONFIGURED;

/// Copy the template into `project_dir/name/name.RPP`, set its tempo,
/// record it and open it in the DAW.
///
/// `bpm` of `0` keeps the template's tempo.
#[instrument(skip(ctx, locks, launcher), fields(op_id = %ctx.operation_id))]
pub async fn create_project(
    ctx: &ProjectContext,
    locks: &RegistryLocks,
    launcher: &dyn Launcher,
    name: &str,
    bpm: u32,
) -> ProjectResult<String> {
    validate_project_name(name, "project name")?;
    let bpm = validate_tempo(bpm, &ctx.settings)?;

    let (Some(project_dir), Some(template)) = (ctx.project_dir(), ctx.settings.default_template())
    else {
        return Ok(NOT_CONFIGURED.to_string());
    };

    let folder = project_dir.join(name);
    fs::ensure_dir(&folder)?;

    let content = fs::read_bytes(&template).map_err(|e| match e {
        FsError::NotFound { path } => ProjectError::TemplateNotFound { path },
        other => other.into(),
    })?;

    let dest: PathBuf = folder.join(format!("{name}.{PROJECT_EXTENSION}"));
    fs::write_atomic(&dest, &content)?;
    let applied = match bpm {
        Some(bpm) if apply_tempo(&dest, bpm)? => Some(bpm),
        Some(bpm) => {
            warn!(path = %dest.display(), bpm, "Template has no usable TEMPO line; tempo not set");
            None
        }
        None => None,
    };
    info!(path = %dest.display(), ?applied, "Project file written");

    match Project::from_file(&dest) {
        Ok(project) => {
            let guard = locks.lock(project_dir).await;
            if let Err(e) = guard.upsert(project) {
                warn!(error = %e, "Failed to record project in registry");
            }
        }
        Err(e) => warn!(error = %e, "Failed to describe new project"),
    }

    launcher.open_in_daw(&ctx.settings.daw_app, &dest).await?;

    let mut msg = format!("Created and launched project: {}", dest.display());
    if let Some(bpm) = applied {
        msg.push_str(&format!(" (BPM {bpm})"));
    }
    Ok(msg)
}
