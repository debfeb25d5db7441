//! Definition command implementation.

use anyhow::Context;
use clap::Parser;
use riff_plugin::PluginTool;

use crate::cli::CommandContext;
use crate::error::CliError;

/// Print the function definition
#[derive(Debug, Parser)]
pub struct DefinitionCommand {}

impl DefinitionCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let definition = serde_json::to_string_pretty(&ctx.tool.definition())
            .context("failed to serialize the tool definition")?;
        println!("{definition}");
        Ok(())
    }
}
