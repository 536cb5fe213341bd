//! PyInstaller build spec synthesis.

use super::literal::{python_bool, python_str, to_python};
use super::render;
use crate::bundler::Result;
use crate::project::ProjectConfig;
use serde::Serialize;
use std::path::Path;

const BUILD_SPEC_TEMPLATE: &str = include_str!("templates/installer.spec.hbs");

/// Modules the generated installer loads dynamically for shortcuts and registry access.
pub const BASE_HIDDEN_IMPORTS: [&str; 2] = ["win32com.client", "winreg"];

#[derive(Serialize)]
struct BuildSpecTemplateData {
    name: String,
    pathex: String,
    hidden_imports: String,
    hookspath: String,
    excludes: String,
    upx: &'static str,
    console: &'static str,
    icon: String,
}

/// Hidden imports passed to PyInstaller: the fixed list, then the project's, without duplicates.
pub fn hidden_imports(project: &ProjectConfig) -> Vec<String> {
    let mut imports: Vec<String> = Vec::new();
    let mut push = |module: &str| {
        if !module.is_empty() && !imports.iter().any(|m| m == module) {
            imports.push(module.to_string());
        }
    };
    for module in BASE_HIDDEN_IMPORTS {
        push(module);
    }
    for module in &project.hidden_imports {
        push(module.trim());
    }
    imports
}

/// Render the PyInstaller spec producing `<safe name>_Setup`.
pub fn synthesize_build_spec(project: &ProjectConfig) -> Result<String> {
    let icon = if project.icon_path.is_empty() {
        "None".to_string()
    } else if Path::new(&project.icon_path).is_file() {
        python_str(&absolute(&project.icon_path))
    } else {
        log::warn!(
            "Icon {} not found, building without an icon",
            project.icon_path
        );
        "None".to_string()
    };

    let data = BuildSpecTemplateData {
        name: python_str(&project.artifact_stem()),
        pathex: to_python(&absolute_all(&project.search_paths))?,
        hidden_imports: to_python(&hidden_imports(project))?,
        hookspath: to_python(&absolute_all(&project.additional_hooks))?,
        excludes: to_python(&non_empty(&project.exclude_modules))?,
        upx: python_bool(project.compression.eq_ignore_ascii_case("upx")),
        console: python_bool(project.console),
        icon,
    };

    render("installer.spec", BUILD_SPEC_TEMPLATE, &data)
}

fn non_empty(values: &[String]) -> Vec<&str> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect()
}

/// The spec is evaluated from inside the scratch workspace, so relative paths are anchored first.
fn absolute(path: &str) -> String {
    std::path::absolute(path)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| path.to_string())
}

fn absolute_all(values: &[String]) -> Vec<String> {
    non_empty(values).into_iter().map(absolute).collect()
}
