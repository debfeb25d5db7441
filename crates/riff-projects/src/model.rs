//! Registry records.

use chrono::{DateTime, Local, Utc};
use riff_common_fs::{self as fs, FsError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::ProjectResult;
use crate::tempo::{extract_tempo, TEMPO_SCAN_LINES};

/// One project file found on disk.
///
/// Field names are part of the sidecar format and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// File name without extension.
    pub name: String,
    /// Absolute path of the project file.
    pub path: PathBuf,
    /// File modification time.
    #[serde(rename = "lastModified")]
    pub last_modified: DateTime<Utc>,
    /// File size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Tempo from the first TEMPO line, 0 when unknown.
    #[serde(default)]
    pub bpm: f64,
}

impl Project {
    /// Describe the project file at `path` from its metadata and tempo.
    ///
    /// A tempo that cannot be read is recorded as `0` and logged.
    pub fn from_file(path: &Path) -> ProjectResult<Self> {
        let metadata = std::fs::metadata(path).map_err(|source| FsError::Io {
            action: "stat",
            path: path.to_path_buf(),
            source,
        })?;
        let last_modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        let bpm = match extract_tempo(path, TEMPO_SCAN_LINES) {
            Ok(bpm) => bpm.unwrap_or(0.0),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read tempo");
                0.0
            }
        };

        Ok(Self {
            name: fs::path::stem(path).unwrap_or_default(),
            path: path.to_path_buf(),
            last_modified,
            size: metadata.len(),
            bpm,
        })
    }

    /// Reduced view returned by list and filter.
    pub fn summary(&self) -> ProjectSummary {
        ProjectSummary {
            name: self.name.clone(),
            path: self.path.clone(),
            date: self
                .last_modified
                .with_timezone(&Local)
                .format("%Y-%m-%d")
                .to_string(),
            bpm: self.bpm,
        }
    }

    /// Tempo truncated to whole beats, as used by exact filtering.
    pub fn whole_bpm(&self) -> i64 {
        self.bpm.trunc() as i64
    }
}

/// What list and filter show per project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    /// Project name.
    pub name: String,
    /// Project file path.
    pub path: PathBuf,
    /// Modification date, `YYYY-MM-DD` in local time.
    pub date: String,
    /// Tempo.
    pub bpm: f64,
}

/// Sort most recent first. The sort is stable, so equal timestamps keep
/// their registry order.
pub fn sort_recent_first(projects: &mut [Project]) {
    projects.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
}
