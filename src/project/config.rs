//! The project aggregate root.

use crate::error::ProjectError;
use crate::project::{
    Dependency, FileEntry, RegistryEntry, ScriptElement, ScriptElementId, ShortcutConfig,
};
use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Placeholder substituted with the project name in templates.
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Extension of the produced installer executable.
pub const EXECUTABLE_EXTENSION: &str = "exe";

/// Characters replaced by [`sanitize_filename`].
const INVALID_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Complete description of an installer project.
///
/// Absent fields in older documents fall back to [`ProjectConfig::default`],
/// except the few with dedicated backfill functions below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub version: String,
    pub author: String,
    pub company: String,
    pub description: String,
    #[serde(default = "default_copyright")]
    pub copyright: String,
    pub icon_path: String,
    pub output_dir: String,
    /// Install location template, expected to contain [`NAME_PLACEHOLDER`].
    pub default_install_dir: String,
    pub python_version: String,

    // Installer options
    pub require_admin: bool,
    pub compression: String,
    pub license_enabled: bool,
    pub license_text: String,
    pub license_file: String,
    #[serde(default = "default_true")]
    pub create_uninstaller: bool,
    pub silent_mode: bool,
    #[serde(default = "default_true")]
    pub overwrite_existing: bool,

    // Installer window styling
    #[serde(default = "default_installer_title")]
    pub installer_title: String,
    #[serde(default = "default_installer_style")]
    pub installer_style: String,
    pub background_color: String,
    pub text_color: String,
    pub button_color: String,
    pub custom_css: String,

    // Packaging options
    pub onefile: bool,
    pub console: bool,
    pub hidden_imports: Vec<String>,
    pub additional_hooks: Vec<String>,
    pub exclude_modules: Vec<String>,

    pub script_elements: Vec<ScriptElement>,
    pub shortcuts: Vec<ShortcutConfig>,
    pub registry_entries: Vec<RegistryEntry>,
    pub dependencies: Vec<Dependency>,
    pub search_paths: Vec<String>,
    pub files: Vec<FileEntry>,

    // Code signing
    pub sign_installer: bool,
    pub certificate_path: String,
    pub certificate_password: String,
    pub timestamp_server: String,

    pub created: NaiveDateTime,
    pub modified: NaiveDateTime,
}

fn default_true() -> bool {
    true
}

fn default_copyright() -> String {
    format!("Copyright © {}", chrono::Local::now().year())
}

fn default_installer_title() -> String {
    format!("{NAME_PLACEHOLDER} Setup")
}

fn default_installer_style() -> String {
    "default".to_string()
}

fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        let created = now();
        Self {
            name: "New Project".to_string(),
            version: "1.0.0".to_string(),
            author: String::new(),
            company: String::new(),
            description: String::new(),
            copyright: String::new(),
            icon_path: String::new(),
            output_dir: String::new(),
            default_install_dir: format!("%PROGRAMFILES%\\{NAME_PLACEHOLDER}"),
            python_version: "3.12".to_string(),
            require_admin: true,
            compression: "upx".to_string(),
            license_enabled: false,
            license_text: String::new(),
            license_file: String::new(),
            create_uninstaller: true,
            silent_mode: false,
            overwrite_existing: true,
            installer_title: default_installer_title(),
            installer_style: default_installer_style(),
            background_color: String::new(),
            text_color: String::new(),
            button_color: String::new(),
            custom_css: String::new(),
            onefile: true,
            console: false,
            hidden_imports: Vec::new(),
            additional_hooks: Vec::new(),
            exclude_modules: Vec::new(),
            script_elements: Vec::new(),
            shortcuts: Vec::new(),
            registry_entries: Vec::new(),
            dependencies: Vec::new(),
            search_paths: Vec::new(),
            files: Vec::new(),
            sign_installer: false,
            certificate_path: String::new(),
            certificate_password: String::new(),
            timestamp_server: "http://timestamp.digicert.com".to_string(),
            created,
            modified: created,
        }
    }
}

impl ProjectConfig {
    /// Empty project with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Record a modification.
    pub fn touch(&mut self) {
        self.modified = now();
    }

    /// Display name used by the generated installer.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "My Application"
        } else {
            &self.name
        }
    }

    /// Filesystem-safe project name with spaces and hyphens as underscores.
    pub fn safe_name(&self) -> String {
        sanitize_filename(&self.name).replace([' ', '-'], "_")
    }

    /// Base name of the packaged installer, e.g. `Demo_Setup`.
    pub fn artifact_stem(&self) -> String {
        format!("{}_Setup", self.safe_name())
    }

    /// File name of the packaged installer, e.g. `Demo_Setup.exe`.
    pub fn artifact_file_name(&self) -> String {
        format!("{}.{}", self.artifact_stem(), EXECUTABLE_EXTENSION)
    }

    /// Window title with the name placeholder substituted.
    pub fn resolved_installer_title(&self) -> String {
        self.installer_title
            .replace(NAME_PLACEHOLDER, self.display_name())
    }

    /// Install location template with the name placeholder substituted.
    pub fn resolved_install_dir(&self) -> String {
        self.default_install_dir
            .replace(NAME_PLACEHOLDER, &self.safe_name())
    }

    /// Append a script element, returning its id.
    pub fn add_script_element(&mut self, element: ScriptElement) -> ScriptElementId {
        let id = element.id.clone();
        self.script_elements.push(element);
        id
    }

    /// Look up a script element by id.
    pub fn script_element(&self, id: &ScriptElementId) -> Option<&ScriptElement> {
        self.script_elements.iter().find(|e| &e.id == id)
    }

    fn position_of(&self, id: &ScriptElementId) -> Result<usize, ProjectError> {
        self.script_elements
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| ProjectError::ElementNotFound { id: id.to_string() })
    }

    /// Replace the element sharing `element.id`, keeping its position.
    pub fn replace_script_element(&mut self, element: ScriptElement) -> Result<(), ProjectError> {
        let index = self.position_of(&element.id)?;
        self.script_elements[index] = element;
        Ok(())
    }

    /// Remove and return the element with the given id.
    pub fn remove_script_element(
        &mut self,
        id: &ScriptElementId,
    ) -> Result<ScriptElement, ProjectError> {
        let index = self.position_of(id)?;
        Ok(self.script_elements.remove(index))
    }

    /// Move an element one slot towards the front. Returns false if already first.
    pub fn move_script_element_up(&mut self, id: &ScriptElementId) -> Result<bool, ProjectError> {
        let index = self.position_of(id)?;
        if index == 0 {
            return Ok(false);
        }
        self.script_elements.swap(index - 1, index);
        Ok(true)
    }

    /// Move an element one slot towards the back. Returns false if already last.
    pub fn move_script_element_down(
        &mut self,
        id: &ScriptElementId,
    ) -> Result<bool, ProjectError> {
        let index = self.position_of(id)?;
        if index + 1 >= self.script_elements.len() {
            return Ok(false);
        }
        self.script_elements.swap(index, index + 1);
        Ok(true)
    }
}

/// Make a string safe to use as a file name.
pub fn sanitize_filename(filename: &str) -> String {
    let replaced: String = filename
        .chars()
        .map(|c| if INVALID_FILENAME_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim_matches(|c| c == '.' || c == ' ');
    if trimmed.is_empty() {
        "unnamed".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{ScriptAction, ScriptElementKind};

    fn element(name: &str) -> ScriptElement {
        ScriptElement::new(name, ScriptAction::empty(ScriptElementKind::CreateDir))
    }

    fn names(project: &ProjectConfig) -> Vec<&str> {
        project
            .script_elements
            .iter()
            .map(|e| e.name.as_str())
            .collect()
    }

    #[test]
    fn test_new_project_has_blank_copyright() {
        assert_eq!(ProjectConfig::new("Demo").copyright, "");
        let backfilled: ProjectConfig = serde_json::from_str(r#"{"name": "Demo"}"#).expect("parse");
        assert!(backfilled.copyright.starts_with("Copyright © "));
        let kept: ProjectConfig =
            serde_json::from_str(r#"{"name": "Demo", "copyright": ""}"#).expect("parse");
        assert_eq!(kept.copyright, "");
    }

    #[test]
    fn test_artifact_names() {
        let project = ProjectConfig::new("My Cool-App");
        assert_eq!(project.safe_name(), "My_Cool_App");
        assert_eq!(project.artifact_file_name(), "My_Cool_App_Setup.exe");
        assert_eq!(ProjectConfig::new("Demo").artifact_stem(), "Demo_Setup");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("a<b>c:d"), "a_b_c_d");
        assert_eq!(sanitize_filename(" .hidden. "), "hidden");
        assert_eq!(sanitize_filename(" .. "), "unnamed");
    }

    #[test]
    fn test_placeholders_are_resolved() {
        let project = ProjectConfig::new("Demo App");
        assert_eq!(project.resolved_installer_title(), "Demo App Setup");
        assert_eq!(project.resolved_install_dir(), "%PROGRAMFILES%\\Demo_App");
    }

    #[test]
    fn test_move_and_remove_by_id() {
        let mut project = ProjectConfig::new("Demo");
        let a = project.add_script_element(element("a"));
        let b = project.add_script_element(element("b"));
        let c = project.add_script_element(element("c"));

        assert!(project.move_script_element_up(&c).expect("move up"));
        assert_eq!(names(&project), ["a", "c", "b"]);
        assert!(!project.move_script_element_up(&a).expect("first"));
        assert!(!project.move_script_element_down(&b).expect("last"));

        let removed = project.remove_script_element(&c).expect("remove");
        assert_eq!(removed.name, "c");
        assert_eq!(names(&project), ["a", "b"]);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut project = ProjectConfig::new("Demo");
        project.add_script_element(element("a"));
        let b = project.add_script_element(element("b"));
        project.add_script_element(element("c"));

        let mut edited = project.script_element(&b).expect("exists").clone();
        edited.name = "b2".into();
        project.replace_script_element(edited).expect("replace");
        assert_eq!(names(&project), ["a", "b2", "c"]);
    }

    #[test]
    fn test_unknown_id_is_reported() {
        let mut project = ProjectConfig::new("Demo");
        let err = project
            .remove_script_element(&ScriptElementId::from("missing"))
            .expect_err("should fail");
        assert!(matches!(err, ProjectError::ElementNotFound { id } if id == "missing"));
    }
}
