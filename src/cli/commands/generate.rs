//! Generate command implementation.
//!
//! Writes the synthesized sources for inspection or for packaging by hand.

use super::helpers::print_report;
use crate::bundler::synth::{BUILD_SPEC_NAME, INSTALLER_SCRIPT_NAME};
use crate::bundler::{synthesize_build_spec, synthesize_installer_source};
use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::{ProjectError, Result};
use crate::project::{load_project, validate};

/// Execute generate command
pub(super) async fn execute_generate(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let Command::Generate { document, out_dir } = &args.command else {
        unreachable!("execute_generate called with non-Generate command");
    };

    let project = load_project(document)?;
    let report = validate(&project);
    if !report.is_valid {
        print_report(&report, config);
        return Err(ProjectError::Invalid {
            errors: report.errors,
        }
        .into());
    }
    for warning in &report.warnings {
        config.warning_println(warning);
    }

    let script = synthesize_installer_source(&project)?;
    let spec = synthesize_build_spec(&project)?;

    tokio::fs::create_dir_all(out_dir).await?;
    let script_path = out_dir.join(INSTALLER_SCRIPT_NAME);
    let spec_path = out_dir.join(BUILD_SPEC_NAME);
    tokio::fs::write(&script_path, script).await?;
    tokio::fs::write(&spec_path, spec).await?;

    config.success_println(&format!("Generated sources in {}", out_dir.display()));
    config.indent(&script_path.display().to_string());
    config.indent(&spec_path.display().to_string());
    Ok(0)
}
