//! Handing project files to the DAW and the OS file browser.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, instrument};

use crate::error::{ProjectError, ProjectResult};

/// Opens projects in the DAW and reveals files in the file browser.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Launcher: Send + Sync {
    /// Open `path` with the DAW application `app`.
    async fn open_in_daw(&self, app: &str, path: &Path) -> ProjectResult<()>;

    /// Show `path` in the platform file browser.
    async fn reveal(&self, path: &Path) -> ProjectResult<()>;
}

/// Where launched programs write their output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Share the host's stdout and stderr.
    #[default]
    Inherit,
    /// Send everything to stderr, keeping stdout free for a protocol.
    Stderr,
}

/// A program invocation built for the current platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    /// Executable.
    pub program: OsString,
    /// Arguments.
    pub args: Vec<OsString>,
    /// Whether to wait for the exit status. Long-running programs such as
    /// the DAW itself are only spawned.
    pub wait: bool,
}

impl LaunchCommand {
    fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            wait: true,
        }
    }

    fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    fn detached(mut self) -> Self {
        self.wait = false;
        self
    }

    fn display_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

/// Command that opens `path` in `app` on `os`.
///
/// `find_binary` resolves the DAW executable on platforms without an
/// application launcher.
pub fn open_command(
    os: &str,
    app: &str,
    path: &Path,
    find_binary: impl Fn(&str) -> Option<PathBuf>,
) -> LaunchCommand {
    match os {
        "macos" => LaunchCommand::new("open").arg("-a").arg(app).arg(path),
        "windows" => LaunchCommand::new("cmd")
            .arg("/C")
            .arg("start")
            .arg("")
            .arg(path),
        _ => match find_binary(app).or_else(|| find_binary(&app.to_lowercase())) {
            Some(binary) => LaunchCommand::new(binary).arg(path).detached(),
            None => LaunchCommand::new("xdg-open").arg(path),
        },
    }
}

/// Command that reveals `path` in the file browser on `os`.
pub fn reveal_command(os: &str, path: &Path) -> LaunchCommand {
    match os {
        "macos" => LaunchCommand::new("open").arg("-R").arg(path),
        "windows" => {
            let mut select = OsString::from("/select,");
            select.push(path);
            LaunchCommand::new("explorer").arg(select)
        }
        _ => {
            let parent = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(path);
            LaunchCommand::new("xdg-open").arg(parent)
        }
    }
}

/// Launcher that runs the platform's own tools.
#[derive(Debug, Clone, Default)]
pub struct SystemLauncher {
    timeout: Option<Duration>,
    output: OutputMode,
}

impl SystemLauncher {
    /// Launcher that waits indefinitely and inherits output streams.
    pub fn new() -> Self {
        Self::default()
    }

    /// Give up on a launcher process after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Choose where child output goes.
    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    #[instrument(skip(self, command), fields(program = %command.display_name()))]
    async fn run(&self, command: LaunchCommand) -> ProjectResult<()> {
        let program = command.display_name();
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args).stdin(Stdio::null());
        match self.output {
            OutputMode::Inherit => {
                cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
            OutputMode::Stderr => {
                cmd.stdout(Stdio::from(std::io::stderr()))
                    .stderr(Stdio::inherit());
            }
        }

        debug!(args = ?command.args, wait = command.wait, "Spawning launcher");
        let mut child = cmd.spawn().map_err(|source| ProjectError::LaunchSpawn {
            program: program.clone(),
            source,
        })?;

        if !command.wait {
            return Ok(());
        }

        let status = match self.timeout {
            Some(duration) => match tokio::time::timeout(duration, child.wait()).await {
                Ok(status) => status,
                Err(_) => {
                    let _ = child.kill().await;
                    return Err(ProjectError::LaunchTimeout { program, duration });
                }
            },
            None => child.wait().await,
        }
        .map_err(|source| ProjectError::LaunchSpawn {
            program: program.clone(),
            source,
        })?;

        if !status.success() {
            return Err(ProjectError::LaunchFailed {
                program,
                exit_code: status.code(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Launcher for SystemLauncher {
    async fn open_in_daw(&self, app: &str, path: &Path) -> ProjectResult<()> {
        let command = open_command(std::env::consts::OS, app, path, |name| {
            which::which(name).ok()
        });
        self.run(command).await?;
        info!(app, path = %path.display(), "Opened in DAW");
        Ok(())
    }

    async fn reveal(&self, path: &Path) -> ProjectResult<()> {
        self.run(reveal_command(std::env::consts::OS, path)).await?;
        info!(path = %path.display(), "Revealed in file browser");
        Ok(())
    }
}

/// Launcher that only logs. Used when no desktop is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLauncher;

#[async_trait]
impl Launcher for NoopLauncher {
    async fn open_in_daw(&self, app: &str, path: &Path) -> ProjectResult<()> {
        info!(app, path = %path.display(), "Launch skipped");
        Ok(())
    }

    async fn reveal(&self, path: &Path) -> ProjectResult<()> {
        info!(path = %path.display(), "Reveal skipped");
        Ok(())
    }
}
