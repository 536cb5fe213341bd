//! Build command implementation.
//!
//! Validates the project, confirms warnings, runs the installer builder and
//! streams its events to the terminal. Ctrl-C cancels the run.

use super::helpers::{print_report, prompt_confirmation};
use crate::bundler::{BuildOptions, BuildRequest, InstallerBuilder, PyInstaller};
use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::{CliError, ProjectError, Result};
use crate::project::{load_project, validate};

/// Execute build command
pub(super) async fn execute_build(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let Command::Build {
        document,
        output_dir,
        yes,
        packager,
        keep_workspace,
        workspace_root,
    } = &args.command
    else {
        unreachable!("execute_build called with non-Build command");
    };

    let mut project = load_project(document)?;
    if let Some(output_dir) = output_dir {
        project.output_dir = output_dir.display().to_string();
    }

    let report = validate(&project);
    if !report.is_valid {
        print_report(&report, config);
        return Err(ProjectError::Invalid {
            errors: report.errors,
        }
        .into());
    }
    if report.has_warnings() {
        print_report(&report, config);
        if !yes {
            let prompt = format!("Continue with {} warning(s)?", report.warnings.len());
            if !prompt_confirmation(&prompt)? {
                return Err(CliError::Aborted.into());
            }
        }
    }

    let packager = match packager {
        Some(command_line) => PyInstaller::from_command_line(command_line)?,
        None => PyInstaller::detect()?,
    };
    config.verbose_println(&format!("Packaging with {}", packager.program().display()));

    let options = BuildOptions {
        workspace_root: workspace_root.clone(),
        keep_workspace: *keep_workspace,
        ..BuildOptions::default()
    };
    let builder = InstallerBuilder::new(packager, options);
    let request = BuildRequest::new(&project, &project.output_dir);

    let _ = config.output().section(&format!(
        "Building {} {}",
        project.display_name(),
        project.version
    ));
    let mut handle = builder.start(request)?;

    let cancel = handle.cancellation_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cancelling build");
            cancel.cancel();
        }
    });

    while let Some(event) = handle.next_event().await {
        let _ = config.output().event(&event);
    }
    interrupt.abort();

    let outcome = handle.wait().await;
    if let Some(phase) = outcome.failed_phase {
        config.verbose_println(&format!("Build stopped during {}", phase));
    }
    Ok(if outcome.success { 0 } else { 1 })
}
