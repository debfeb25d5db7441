//! The tool the host calls.

use async_trait::async_trait;
use riff_config::{AgentContext, SettingsStore};
use riff_projects::{FilterCriteria, Launcher, ProjectContext, ProjectManager};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::definition::ToolDefinition;
use crate::manifest::{BuildInfo, PluginManifest};
use crate::params::{Operation, ToolArgs};
use crate::{setup, Result};

/// A tool callable by an agent host.
#[async_trait]
pub trait PluginTool: Send + Sync {
    /// Function definition shown to the model.
    fn definition(&self) -> ToolDefinition;

    /// Run the tool with a JSON argument string.
    async fn call(&self, args: &str) -> Result<String>;
}

/// A tool whose settings belong to the active agent.
pub trait AgentAware {
    /// Switch to `ctx`; later calls read and write that agent's settings.
    fn set_agent_context(&self, ctx: AgentContext);
}

/// Manages music projects for one agent host.
#[derive(Debug)]
pub struct MusicProjectTool {
    manifest: PluginManifest,
    settings: SettingsStore,
    projects: ProjectManager,
}

impl MusicProjectTool {
    /// Tool with its own settings store and launcher.
    pub fn new(settings: SettingsStore, launcher: Arc<dyn Launcher>) -> Result<Self> {
        Ok(Self {
            manifest: PluginManifest::embedded()?,
            settings,
            projects: ProjectManager::new(launcher),
        })
    }

    /// The embedded manifest.
    pub fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    /// Build information.
    pub fn build_info(&self) -> BuildInfo {
        BuildInfo::current()
    }

    /// Settings store backing this tool.
    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Project operations and the scan they may have started.
    pub fn projects(&self) -> &ProjectManager {
        &self.projects
    }

    async fn dispatch(&self, op: Operation, args: &ToolArgs, ctx: &ProjectContext) -> Result<String> {
        let projects = &self.projects;
        let text = |v: &Option<String>| v.as_deref().unwrap_or_default().to_string();

        let out = match op {
            Operation::CreateProject => {
                projects
                    .create_project(ctx, &text(&args.name), args.bpm.unwrap_or(0))
                    .await?
            }
            Operation::Scan => projects.scan(ctx)?,
            Operation::ScanStatus => projects.scan_status()?,
            Operation::CancelScan => projects.cancel_scan(),
            Operation::ListProjects => projects.list_projects(ctx)?,
            Operation::OpenProject => projects.open_project(ctx, &text(&args.path)).await?,
            Operation::OpenInFinder => {
                projects
                    .open_in_finder(ctx, args.path.as_deref(), args.name.as_deref())
                    .await?
            }
            Operation::FilterProject => {
                let criteria = FilterCriteria {
                    name: args.name.clone(),
                    bpm: args.bpm.map(f64::from),
                    min_bpm: args.min_bpm.map(f64::from),
                    max_bpm: args.max_bpm.map(f64::from),
                };
                projects.filter_projects(ctx, &criteria)?
            }
            Operation::RenameProject => {
                projects
                    .rename_project(ctx, &text(&args.name), &text(&args.new_name))
                    .await?
            }
            Operation::GetSettings => setup::get_settings(&self.settings)?,
            Operation::InitSetup => setup::init_setup(&self.settings)?,
            Operation::CompleteSetup => setup::complete_setup(
                &self.settings,
                args.project_dir.as_deref(),
                args.template_dir.as_deref(),
            )?,
            Operation::SetProjectDir => {
                let dir = args.required("project_dir", &args.project_dir)?;
                setup::set_project_dir(&self.settings, dir)?
            }
            Operation::SetTemplateDir => {
                let dir = args.required("template_dir", &args.template_dir)?;
                setup::set_template_dir(&self.settings, dir)?
            }
        };
        Ok(out)
    }
}

#[async_trait]
impl PluginTool for MusicProjectTool {
    fn definition(&self) -> ToolDefinition {
        let settings = self.settings.load().unwrap_or_else(|e| {
            warn!(error = %e, "Using default settings for the tool definition");
            Default::default()
        });
        ToolDefinition::music_project_manager(
            &self.manifest.name,
            &self.manifest.description,
            &settings,
        )
    }

    #[instrument(skip_all, fields(operation))]
    async fn call(&self, args: &str) -> Result<String> {
        let args = ToolArgs::parse(args)?;
        let op = args.operation()?;
        tracing::Span::current().record("operation", op.as_str());

        let ctx = ProjectContext::new(self.settings.load()?);
        debug!(op_id = %ctx.operation_id, "Dispatching");

        let result = self.dispatch(op, &args, &ctx).await;
        match &result {
            Ok(_) => info!(op_id = %ctx.operation_id, "Operation completed"),
            Err(e) => warn!(op_id = %ctx.operation_id, error = %e, "Operation failed"),
        }
        result
    }
}

impl AgentAware for MusicProjectTool {
    fn set_agent_context(&self, ctx: AgentContext) {
        self.settings.set_agent_context(ctx);
    }
}
