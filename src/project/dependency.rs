//! Software dependencies installed before the project files.

use serde::{Deserialize, Serialize};

/// How a dependency is installed.
///
/// Only `Pip` is actioned by the generated installer; the other kinds are
/// carried through as declarations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    #[default]
    Pip,
    Installer,
    Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub installer_path: String,
    /// Command whose zero exit status means the dependency is already present.
    #[serde(default)]
    pub check_command: String,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub kind: DependencyKind,
}

fn default_required() -> bool {
    true
}

impl Dependency {
    /// A required pip dependency.
    pub fn pip(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            installer_path: String::new(),
            check_command: String::new(),
            required: true,
            kind: DependencyKind::Pip,
        }
    }
}
