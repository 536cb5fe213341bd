//! Declarative description of an installer project.
//!
//! A [`ProjectConfig`] is loaded from (or saved to) a project document, checked
//! with [`validate`], and handed read-only to the bundler.

mod config;
mod dependency;
mod document;
mod file_entry;
mod registry;
mod script;
mod shortcut;
mod validator;

pub use config::{
    EXECUTABLE_EXTENSION, NAME_PLACEHOLDER, ProjectConfig, sanitize_filename,
};
pub use dependency::{Dependency, DependencyKind};
pub use document::{DocumentFormat, load_project, save_project};
pub use file_entry::{FileEntry, is_binary_file, sha256_file};
pub use registry::{RegistryAction, RegistryEntry, RegistryHive, RegistryValueType};
pub use script::{
    PostInstallCommand, ScriptAction, ScriptElement, ScriptElementId, ScriptElementKind,
    ScriptEvent, ScriptLanguage,
};
pub use shortcut::{ShortcutConfig, ShortcutLocation};
pub use validator::{ValidationResult, validate};
