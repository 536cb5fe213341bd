//! Shared helper functions for command execution.

use crate::cli::RuntimeConfig;
use crate::error::Result;
use crate::project::{ProjectConfig, ValidationResult, save_project};
use std::path::Path;

/// Prompt user for confirmation with y/n input
pub(super) fn prompt_confirmation(prompt: &str) -> std::io::Result<bool> {
    use std::io::Write;

    print!("{} [y/N]: ", prompt);
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    let response = input.trim().to_lowercase();
    Ok(matches!(response.as_str(), "y" | "yes"))
}

/// Record the edit and write the document back.
pub(super) fn save_edited(project: &mut ProjectConfig, document: &Path) -> Result<()> {
    project.touch();
    save_project(project, document)?;
    Ok(())
}

/// Print every error and warning of a validation report.
pub(super) fn print_report(report: &ValidationResult, config: &RuntimeConfig) {
    for error in &report.errors {
        config.error_println(error);
    }
    for warning in &report.warnings {
        config.warning_println(warning);
    }
}
