//! Command line interface for kodegen_bundler_installer.
//!
//! Stands in for an interactive editor: every project edit goes through a
//! command that loads the document, changes it, touches `modified` and saves.

mod args;
pub mod commands;
mod output;

pub use args::{Args, Command, Direction, ElementsAction, RuntimeConfig};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute_command(args).await
}

/// Validate arguments without executing (for testing)
pub fn validate_args(args: &Args) -> std::result::Result<(), String> {
    args.validate()
}
