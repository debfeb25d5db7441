//! Serve command implementation.
//!
//! One JSON request per stdin line, one JSON response per stdout line:
//!
//! ```text
//! {"args": {"operation": "list_projects"}, "agent": {"name": "...", "settings_path": "..."}}
//! {"ok": true, "result": "..."}
//! ```

use anyhow::Context;
use clap::Parser;
use riff_config::AgentContext;
use riff_plugin::{AgentAware, MusicProjectTool, PluginTool};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use crate::cli::CommandContext;
use crate::error::CliError;

/// Serve requests over stdin/stdout
#[derive(Debug, Parser)]
pub struct ServeCommand {}

#[derive(Debug, Deserialize)]
struct Request {
    args: Value,
    #[serde(default)]
    agent: Option<AgentContext>,
}

#[derive(Debug, PartialEq, Serialize)]
struct Response {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Response {
    fn success(result: String) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    fn failure(error: impl ToString) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(error.to_string()),
        }
    }
}

async fn handle_line(tool: &MusicProjectTool, line: &str) -> Response {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => return Response::failure(format!("invalid request: {e}")),
    };

    if let Some(agent) = request.agent {
        debug!(agent = %agent.name, "Switching agent");
        tool.set_agent_context(agent);
    }

    match tool.call(&request.args.to_string()).await {
        Ok(result) => Response::success(result),
        Err(e) => Response::failure(e),
    }
}

impl ServeCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();
        info!("Serving requests on stdin");

        loop {
            let line = tokio::select! {
                line = lines.next_line() => line.context("failed to read request")?,
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted");
                    break;
                }
            };
            let Some(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }

            let response = handle_line(&ctx.tool, &line).await;
            let mut out =
                serde_json::to_vec(&response).context("failed to serialize response")?;
            out.push(b'\n');
            stdout.write_all(&out).await.context("failed to write response")?;
            stdout.flush().await.context("failed to write response")?;
        }

        ctx.tool.projects().wait_for_scan().await;
        Ok(())
    }
}
