//! Call command implementation.

use anyhow::Context;
use clap::Parser;
use riff_plugin::PluginTool;
use tokio::io::AsyncReadExt;

use crate::cli::CommandContext;
use crate::error::CliError;

/// Run one operation
#[derive(Debug, Parser)]
pub struct CallCommand {
    /// Arguments as a JSON object, or `-` to read them from stdin
    #[arg(value_name = "JSON")]
    pub args: String,
}

impl CallCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let args = if self.args == "-" {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("failed to read arguments from stdin")?;
            buf
        } else {
            self.args.clone()
        };

        let result = ctx.tool.call(args.trim()).await;

        // A scan started by this call must finish before the process exits.
        ctx.tool.projects().wait_for_scan().await;

        println!("{}", result?);
        Ok(())
    }
}
