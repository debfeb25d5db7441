//! Info command implementation.

use anyhow::Context;
use clap::Parser;
use serde_json::json;

use crate::cli::CommandContext;
use crate::error::CliError;

/// Print plugin and build information
#[derive(Debug, Parser)]
pub struct InfoCommand {}

impl InfoCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let tool = &ctx.tool;
        let settings_path = tool
            .settings()
            .agent_context()
            .map(|agent| agent.settings_path);

        let info = json!({
            "plugin": tool.manifest(),
            "build": tool.build_info(),
            "settings_path": settings_path,
        });
        let text = serde_json::to_string_pretty(&info).context("failed to serialize info")?;
        println!("{text}");
        Ok(())
    }
}
