//! Add-file command implementation.

use super::helpers::save_edited;
use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;
use crate::project::{FileEntry, load_project};

/// Execute add-file command
pub(super) fn execute_add_file(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let Command::AddFile {
        document,
        source,
        install_path,
    } = &args.command
    else {
        unreachable!("execute_add_file called with non-AddFile command");
    };

    let mut project = load_project(document)?;
    let entry = FileEntry::new(source.as_str(), install_path.as_str());
    if !entry.source_exists() {
        config.warning_println(&format!("File not found: {}", entry.source_path));
    }

    let summary = if entry.is_directory {
        format!("Added directory {} -> {}", entry.source_path, entry.install_path)
    } else if entry.hash.is_empty() {
        format!("Added {} -> {}", entry.source_path, entry.install_path)
    } else {
        format!(
            "Added {} -> {} (sha256 {})",
            entry.source_path,
            entry.install_path,
            &entry.hash[..12.min(entry.hash.len())]
        )
    };

    project.files.push(entry);
    save_edited(&mut project, document)?;
    config.success_println(&summary);
    Ok(0)
}
