//! Command line interface for gh_release.

mod args;
pub mod commands;
mod output;

pub use args::{Args, FALLBACK_TOKEN_ENV};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    let output = OutputManager::new(args.quiet);
    execute_command(args, &output).await
}
