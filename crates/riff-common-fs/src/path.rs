//! Path manipulation utilities.

use std::path::{Component, Path, PathBuf};

/// Expand a leading `~` or `~/` to the user's home directory.
///
/// Paths like `~other/x` are returned untouched. `None` only when the home
/// directory cannot be determined and the path needed it.
pub fn expand_tilde(path: &str) -> Option<PathBuf> {
    if path == "~" {
        return dirs::home_dir();
    }
    if let Some(rest) = path.strip_prefix("~/") {
        return dirs::home_dir().map(|home| home.join(rest));
    }
    Some(PathBuf::from(path))
}

/// Anchor a relative path at the current directory and drop `.` components.
///
/// Purely lexical: symlinks and `..` are left as they are. If the current
/// directory cannot be read the path is returned without anchoring.
pub fn absolute(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let anchored = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    anchored
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Get the file stem (name without the last extension).
pub fn stem(path: impl AsRef<Path>) -> Option<String> {
    path.as_ref()
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

/// Whether `child` is located directly inside `dir`.
pub fn is_direct_child(child: impl AsRef<Path>, dir: impl AsRef<Path>) -> bool {
    child.as_ref().parent() == Some(dir.as_ref())
}
