//! Riff CLI - hosts the music project manager tool.
//!
//! Main entry point for the `riff` binary.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

mod cli;
mod commands;
mod error;

use cli::Cli;
use error::CliError;

/// Application exit codes
#[repr(u8)]
pub enum Exit {
    Success = 0,
    GeneralError = 1,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = riff_common_log::init(cli.log_config()) {
        eprintln!("warning: {e}");
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: failed to start the async runtime: {e}");
            return Exit::GeneralError.into();
        }
    };

    match runtime.block_on(cli.execute()) {
        Ok(()) => Exit::Success.into(),
        Err(e) => report(&e),
    }
}

fn report(e: &CliError) -> ExitCode {
    error!(code = e.code(), "{e}");
    eprintln!("error: {e}");
    if let Some(hint) = e.hint() {
        eprintln!("hint: {hint}");
    }
    e.exit_code()
}
