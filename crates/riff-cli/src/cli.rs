//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use riff_common_log::{LogConfig, LogLevel};
use riff_config::{AgentContext, SettingsStore};
use riff_plugin::MusicProjectTool;
use riff_projects::{Launcher, NoopLauncher, OutputMode, SystemLauncher};
use tracing::{debug, warn};

use crate::commands::{CallCommand, DefinitionCommand, InfoCommand, ServeCommand};
use crate::error::CliError;

/// Riff - music project manager for REAPER
///
/// Runs the `music_project_manager` tool once, or serves it over stdin/stdout.
#[derive(Debug, Parser)]
#[command(
    name = "riff",
    author,
    version,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Agent settings file to read and write
    #[arg(
        long,
        global = true,
        env = "RIFF_SETTINGS_PATH",
        value_hint = ValueHint::FilePath
    )]
    pub settings_path: Option<PathBuf>,

    /// Agent directory holding `agent_settings.json`
    #[arg(
        long,
        global = true,
        env = "RIFF_AGENT_DIR",
        value_hint = ValueHint::DirPath,
        conflicts_with = "settings_path"
    )]
    pub agent_dir: Option<PathBuf>,

    /// Name of the agent the settings belong to
    #[arg(long, global = true, default_value = "riff")]
    pub agent_name: String,

    /// Version of the agent host, checked against the plugin's requirement
    #[arg(long, global = true, env = "RIFF_AGENT_VERSION")]
    pub agent_version: Option<String>,

    /// Never start REAPER or a file browser
    #[arg(long, global = true)]
    pub no_launch: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one operation and print its result
    Call(CallCommand),

    /// Answer JSON requests read line by line from stdin
    Serve(ServeCommand),

    /// Print the tool's function definition
    Definition(DefinitionCommand),

    /// Print plugin and build information
    Info(InfoCommand),
}

impl Cli {
    /// Logging configuration from the environment and verbosity flags.
    pub fn log_config(&self) -> LogConfig {
        let config = LogConfig::from_env();
        let level = match self.verbose {
            _ if self.quiet => LogLevel::Error,
            0 if std::env::var_os("RIFF_LOG_LEVEL").is_some() => return config,
            0 => LogLevel::Warn,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        };
        config.with_level(level)
    }

    /// Agent whose settings the tool uses, if one was given.
    pub fn agent_context(&self) -> Option<AgentContext> {
        match (&self.settings_path, &self.agent_dir) {
            (Some(path), _) => Some(AgentContext::with_settings_path(&self.agent_name, path)),
            (None, Some(dir)) => Some(AgentContext::from_agent_dir(&self.agent_name, dir)),
            (None, None) => None,
        }
    }

    fn launcher(&self) -> Arc<dyn Launcher> {
        if self.no_launch {
            return Arc::new(NoopLauncher);
        }
        match self.command {
            // stdout carries responses
            Command::Serve(_) => Arc::new(SystemLauncher::new().with_output(OutputMode::Stderr)),
            _ => Arc::new(SystemLauncher::new()),
        }
    }

    /// Build the tool for this invocation.
    pub fn build_tool(&self) -> Result<MusicProjectTool, CliError> {
        let agent = self.agent_context();
        if agent.is_none() && matches!(self.command, Command::Call(_) | Command::Serve(_)) {
            warn!("No agent settings given; settings changes last for this process only");
        }

        let tool = MusicProjectTool::new(SettingsStore::new(agent), self.launcher())?;
        if let Some(version) = &self.agent_version {
            tool.manifest().check_agent_version(version).map_err(|e| {
                let min = tool.manifest().requirements.min_agent_version.as_deref();
                CliError::config_with_hint(
                    e.to_string(),
                    format!("this plugin needs agent version {} or newer", min.unwrap_or("any")),
                )
            })?;
        }
        debug!(version = %tool.manifest().version, "Tool ready");
        Ok(tool)
    }

    /// Execute the selected command
    pub async fn execute(self) -> Result<(), CliError> {
        let ctx = CommandContext {
            tool: self.build_tool()?,
        };

        match self.command {
            Command::Call(cmd) => cmd.execute(&ctx).await,
            Command::Serve(cmd) => cmd.execute(&ctx).await,
            Command::Definition(cmd) => cmd.execute(&ctx),
            Command::Info(cmd) => cmd.execute(&ctx),
        }
    }
}

/// Context passed to all commands
#[derive(Debug)]
pub struct CommandContext {
    pub tool: MusicProjectTool,
}
