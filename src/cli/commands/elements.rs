//! Elements command implementation.

use super::helpers::save_edited;
use crate::cli::{Args, Command, Direction, ElementsAction, RuntimeConfig};
use crate::error::Result;
use crate::project::{ProjectConfig, ScriptElementId, load_project};

/// Execute elements command
pub(super) fn execute_elements(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let Command::Elements { document, action } = &args.command else {
        unreachable!("execute_elements called with non-Elements command");
    };

    let mut project = load_project(document)?;

    match action {
        ElementsAction::List => list(&project, config),
        ElementsAction::Remove { id } => {
            let removed = project.remove_script_element(&ScriptElementId::from(id.as_str()))?;
            save_edited(&mut project, document)?;
            config.success_println(&format!("Removed '{}' ({})", removed.name, removed.id));
        }
        ElementsAction::Move { id, direction } => {
            let id = ScriptElementId::from(id.as_str());
            let moved = match direction {
                Direction::Up => project.move_script_element_up(&id)?,
                Direction::Down => project.move_script_element_down(&id)?,
            };
            if moved {
                save_edited(&mut project, document)?;
                config.success_println(&format!("Moved {}", id));
                list(&project, config);
            } else {
                config.warning_println(&format!("{} is already at the boundary", id));
            }
        }
    }
    Ok(0)
}

fn list(project: &ProjectConfig, config: &RuntimeConfig) {
    if project.script_elements.is_empty() {
        config.println("No script elements");
        return;
    }
    for (index, element) in project.script_elements.iter().enumerate() {
        let mut flags = String::new();
        if !element.enabled {
            flags.push_str(" (disabled)");
        }
        if element.critical {
            flags.push_str(" (critical)");
        }
        if element.is_inert() {
            flags.push_str(" (unreadable parameters, skipped)");
        }
        config.println(&format!(
            "{:>3}. [{}] {}: {}{}",
            index + 1,
            element.id,
            element.kind(),
            element.name,
            flags
        ));
    }
}
