//! New command implementation.

use super::helpers::save_edited;
use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::{CliError, Result};
use crate::project::ProjectConfig;

/// Output directory written into documents created without `--output-dir`
const DEFAULT_OUTPUT_DIR: &str = "dist";

/// Execute new command
pub(super) fn execute_new(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let Command::New {
        document,
        name,
        version,
        output_dir,
        force,
    } = &args.command
    else {
        unreachable!("execute_new called with non-New command");
    };

    if document.exists() && !force {
        return Err(CliError::InvalidArguments {
            reason: format!(
                "{} already exists (use --force to overwrite)",
                document.display()
            ),
        }
        .into());
    }

    let mut project = match name {
        Some(name) => ProjectConfig::new(name.trim()),
        None => ProjectConfig::default(),
    };
    if let Some(version) = version {
        project.version = version.trim().to_string();
    }
    project.output_dir = output_dir
        .clone()
        .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());

    save_edited(&mut project, document)?;

    config.success_println(&format!(
        "Created project '{}' at {}",
        project.name,
        document.display()
    ));
    config.indent(&format!("Installer: {}", project.artifact_file_name()));
    Ok(0)
}
