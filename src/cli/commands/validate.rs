//! Validate command implementation.

use super::helpers::print_report;
use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;
use crate::project::{load_project, validate};

/// Execute validate command. Exit code 1 when the project has errors.
pub(super) fn execute_validate(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let Command::Validate { document, json } = &args.command else {
        unreachable!("execute_validate called with non-Validate command");
    };

    config.verbose_println(&format!("Validating {}...", document.display()));
    let project = load_project(document)?;
    let report = validate(&project);

    if *json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        config.println(&report.summary());
        print_report(&report, config);
    }

    Ok(if report.is_valid { 0 } else { 1 })
}
