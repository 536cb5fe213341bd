//! Installer program synthesis.

use super::literal::{python_bool, python_str, to_python, to_python_pretty};
use super::render;
use crate::bundler::Result;
use crate::project::{ProjectConfig, ScriptElementId, ScriptLanguage};
use serde::Serialize;

const INSTALLER_TEMPLATE: &str = include_str!("templates/installer.py.hbs");

/// Install routine steps with a failure policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallStep {
    Dependencies,
    Files,
    Shortcuts,
    Registry,
    PostInstall,
}

/// What the generated installer does when one item of a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the install and report the error.
    Abort,
    /// Swallow the failure and move to the next item.
    Continue,
    /// Decided by each element's `critical` flag.
    PerElement,
}

impl InstallStep {
    pub const ALL: [InstallStep; 5] = [
        Self::Dependencies,
        Self::Files,
        Self::Shortcuts,
        Self::Registry,
        Self::PostInstall,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dependencies => "dependencies",
            Self::Files => "files",
            Self::Shortcuts => "shortcuts",
            Self::Registry => "registry",
            Self::PostInstall => "post_install",
        }
    }

    pub fn policy(self) -> FailurePolicy {
        match self {
            Self::Dependencies | Self::Files => FailurePolicy::Abort,
            Self::Shortcuts | Self::Registry => FailurePolicy::Continue,
            Self::PostInstall => FailurePolicy::PerElement,
        }
    }
}

/// A post-install command embedded in the installer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostInstallStep {
    pub id: ScriptElementId,
    pub name: String,
    pub language: ScriptLanguage,
    pub content: String,
    pub critical: bool,
}

/// Enabled script elements the installer runs after copying files, in list order.
pub fn post_install_steps(project: &ProjectConfig) -> Vec<PostInstallStep> {
    project
        .script_elements
        .iter()
        .filter(|element| element.enabled)
        .filter_map(|element| {
            element
                .post_install_command()
                .map(|command| PostInstallStep {
                    id: element.id.clone(),
                    name: element.name.clone(),
                    language: command.language,
                    content: command.content.to_string(),
                    critical: element.critical,
                })
        })
        .collect()
}

#[derive(Serialize)]
struct InstallerTemplateData {
    title_comment: String,
    project_name: String,
    project_version: String,
    project_description: String,
    project_company: String,
    project_copyright: String,
    installer_title: String,
    installer_style: String,
    stylesheet: String,
    default_install_dir: String,
    license_text: String,
    create_uninstaller: &'static str,
    overwrite_existing: &'static str,
    silent_mode: &'static str,
    require_admin: &'static str,
    files: String,
    shortcuts: String,
    registry_entries: String,
    script_elements: String,
    dependencies: String,
    post_install_steps: String,
    step_policy: String,
}

/// Render the standalone installer program for a project.
///
/// Output depends only on project content (and the license file it names),
/// with list order preserved.
pub fn synthesize_installer_source(project: &ProjectConfig) -> Result<String> {
    let mut step_policy = serde_json::Map::new();
    for step in InstallStep::ALL {
        step_policy.insert(
            step.as_str().to_string(),
            serde_json::to_value(step.policy())?,
        );
    }

    let data = InstallerTemplateData {
        title_comment: title_comment(project.display_name()),
        project_name: python_str(project.display_name()),
        project_version: python_str(&project.version),
        project_description: python_str(&project.description),
        project_company: python_str(&project.company),
        project_copyright: python_str(&project.copyright),
        installer_title: python_str(&project.resolved_installer_title()),
        installer_style: python_str(&project.installer_style),
        stylesheet: python_str(&stylesheet(project)),
        default_install_dir: python_str(&project.resolved_install_dir()),
        license_text: python_str(license_text(project).as_deref().unwrap_or_default()),
        create_uninstaller: python_bool(project.create_uninstaller),
        overwrite_existing: python_bool(project.overwrite_existing),
        silent_mode: python_bool(project.silent_mode),
        require_admin: python_bool(project.require_admin),
        files: to_python_pretty(&project.files)?,
        shortcuts: to_python_pretty(&project.shortcuts)?,
        registry_entries: to_python_pretty(&project.registry_entries)?,
        script_elements: to_python_pretty(&project.script_elements)?,
        dependencies: to_python_pretty(&project.dependencies)?,
        post_install_steps: to_python_pretty(&post_install_steps(project))?,
        step_policy: to_python(&step_policy)?,
    };

    render("installer.py", INSTALLER_TEMPLATE, &data)
}

/// App name for the banner comment, with control characters blanked.
fn title_comment(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// License shown before installing, if the gate is enabled.
fn license_text(project: &ProjectConfig) -> Option<String> {
    if !project.license_enabled {
        return None;
    }
    if !project.license_text.trim().is_empty() {
        return Some(project.license_text.clone());
    }
    if project.license_file.is_empty() {
        return None;
    }
    match std::fs::read_to_string(&project.license_file) {
        Ok(text) => Some(text),
        Err(e) => {
            log::warn!(
                "License file {} could not be read, skipping license page: {}",
                project.license_file,
                e
            );
            None
        }
    }
}

/// Qt stylesheet built from the project's styling fields.
fn stylesheet(project: &ProjectConfig) -> String {
    let mut rules = Vec::new();

    let mut window = Vec::new();
    if !project.background_color.is_empty() {
        window.push(format!("background-color: {};", project.background_color));
    }
    if !project.text_color.is_empty() {
        window.push(format!("color: {};", project.text_color));
    }
    if !window.is_empty() {
        rules.push(format!("QMainWindow, QWidget {{ {} }}", window.join(" ")));
    }

    if !project.button_color.is_empty() {
        rules.push(format!(
            "QPushButton {{ background-color: {}; }}",
            project.button_color
        ));
    }

    if !project.custom_css.trim().is_empty() {
        rules.push(project.custom_css.trim().to_string());
    }

    rules.join("\n")
}
