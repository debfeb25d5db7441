//! Riff projects - the project file registry.
//!
//! Everything the plugin does to project files on disk:
//!
//! - `create` - instantiate the template, set the tempo, open it
//! - `scan` - background walk that rebuilds the registry
//! - `query` - list, filter and look up registered projects
//! - `rename` - rename a project folder and file together
//! - `open` - open in the DAW or reveal in the file browser
//!
//! Operations that find no configuration answer with [`NOT_CONFIGURED`]
//! instead of an error.

#![warn(missing_docs)]

pub mod context;
pub mod create;
pub mod error;
pub mod launch;
pub mod manager;
pub mod model;
pub mod open;
pub mod query;
pub mod registry;
pub mod rename;
pub mod scan;
pub mod tempo;
pub mod validate;

// Re-exports
pub use context::ProjectContext;
pub use error::{ProjectError, ProjectResult};
pub use launch::{Launcher, NoopLauncher, OutputMode, SystemLauncher};
pub use manager::ProjectManager;
pub use model::{Project, ProjectSummary};
pub use query::FilterCriteria;
pub use registry::{RegistryLocks, RegistryStore, LEGACY_REGISTRY_FILE, REGISTRY_FILE};
pub use scan::{ScanStatus, ScanTracker};
pub use tempo::{apply_tempo, extract_tempo, patch_tempo, TEMPO_SCAN_LINES};

/// Maximum number of projects returned by list and filter.
pub const LIST_LIMIT: usize = 30;

/// Answer given when the project or template directory is not set.
pub const NOT_CONFIGURED: &str = "Music Project Manager needs to be set up first. Please run music_project_manager with operation 'init_setup' to begin the setup process, or configure project_dir and template_dir using 'set_project_dir' and 'set_template_dir' operations.";
