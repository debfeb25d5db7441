//! File system utilities for Riff.
//!
//! Everything that touches the sidecar registry, the agent settings file or a
//! freshly instantiated project goes through these helpers so that writes are
//! atomic and errors carry the path they failed on.

pub mod path;

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::debug;

/// File system errors.
#[derive(Debug, Error)]
pub enum FsError {
    /// The path does not exist.
    #[error("file not found: {}", path.display())]
    NotFound {
        /// Missing path.
        path: PathBuf,
    },

    /// Any other I/O failure, annotated with what was being done.
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        /// Short verb phrase, e.g. "create directory".
        action: &'static str,
        /// Path the action was applied to.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Wrap `source`; a missing path becomes [`FsError::NotFound`].
    pub fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io {
                action,
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Path the error refers to.
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path } | Self::Io { path, .. } => path,
        }
    }

    /// Whether the error means the path is missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result alias for file system helpers.
pub type FsResult<T> = std::result::Result<T, FsError>;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Read a whole file into memory.
pub fn read_bytes(path: impl AsRef<Path>) -> FsResult<Vec<u8>> {
    let path = path.as_ref();
    fs::read(path).map_err(|e| FsError::io("read", path, e))
}

/// Read a file if it exists. `Ok(None)` means the file is absent.
pub fn read_optional(path: impl AsRef<Path>) -> FsResult<Option<Vec<u8>>> {
    match read_bytes(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Write to a file atomically (write to temp, then rename).
///
/// Parent directories are created. When the rename crosses file systems the
/// temp file is copied over the target instead.
pub fn write_atomic(path: impl AsRef<Path>, contents: &[u8]) -> FsResult<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    ensure_dir(parent)?;

    let temp_path = temp_path_for(path);
    debug!(temp = %temp_path.display(), target = %path.display(), "Writing atomically");

    {
        let mut file =
            File::create(&temp_path).map_err(|e| FsError::io("create temporary file", &temp_path, e))?;
        file.write_all(contents)
            .map_err(|e| FsError::io("write temporary file", &temp_path, e))?;
        file.sync_all()
            .map_err(|e| FsError::io("sync temporary file", &temp_path, e))?;
    }

    match fs::rename(&temp_path, path) {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device(&e) => {
            debug!("Cross-filesystem rename, falling back to copy");
            let copied = fs::copy(&temp_path, path);
            let _ = fs::remove_file(&temp_path);
            copied
                .map(|_| ())
                .map_err(|e| FsError::io("copy temporary file to", path, e))
        }
        Err(e) => {
            let _ = fs::remove_file(&temp_path);
            Err(FsError::io("rename temporary file to", path, e))
        }
    }
}

/// Ensure a directory exists. Pre-existing directories are fine.
pub fn ensure_dir(path: impl AsRef<Path>) -> FsResult<()> {
    let path = path.as_ref();
    fs::create_dir_all(path).map_err(|e| FsError::Io {
        action: "create directory",
        path: path.to_path_buf(),
        source: e,
    })
}

/// Rename a file or directory.
pub fn rename(from: impl AsRef<Path>, to: impl AsRef<Path>) -> FsResult<()> {
    let from = from.as_ref();
    fs::rename(from, to.as_ref()).map_err(|e| FsError::io("rename", from, e))
}

/// Case-insensitive extension check. `ext` is given without the dot.
pub fn has_extension(path: impl AsRef<Path>, ext: &str) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");
    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{}.tmp.{}.{}", file_name, std::process::id(), seq))
}

fn is_cross_device(e: &io::Error) -> bool {
    // EXDEV on Unix
    e.raw_os_error() == Some(18) || e.to_string().contains("cross-device")
}
