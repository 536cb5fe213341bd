//! Command execution functions.

mod add_file;
mod build;
mod elements;
mod generate;
mod helpers;
mod new;
mod validate;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;

use add_file::execute_add_file;
use build::execute_build;
use elements::execute_elements;
use generate::execute_generate;
use new::execute_new;
use validate::execute_validate;

/// Execute the main command based on parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        // Never quiet for argument errors
        let output = super::OutputManager::new(false, false);
        output.error(&format!("Invalid arguments: {}", validation_error));
        return Ok(1);
    }

    let config = RuntimeConfig::from(&args);

    let result = match &args.command {
        Command::New { .. } => execute_new(&args, &config),
        Command::Validate { .. } => execute_validate(&args, &config),
        Command::Generate { .. } => execute_generate(&args, &config).await,
        Command::Build { .. } => execute_build(&args, &config).await,
        Command::Elements { .. } => execute_elements(&args, &config),
        Command::AddFile { .. } => execute_add_file(&args, &config),
    };

    match result {
        Ok(exit_code) => Ok(exit_code),
        Err(e) => {
            config.error_println(&format!(
                "Command '{}' failed: {}",
                args.command.name(),
                e
            ));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() && !config.is_quiet() {
                config.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    config.println(&format!("  • {}", suggestion));
                }
            }

            Ok(1)
        }
    }
}
