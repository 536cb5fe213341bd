//! Shortcuts created at install time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a shortcut is placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortcutLocation {
    #[default]
    Desktop,
    StartMenu,
    Both,
}

impl ShortcutLocation {
    /// Whether a desktop link is created.
    pub fn includes_desktop(self) -> bool {
        matches!(self, Self::Desktop | Self::Both)
    }

    /// Whether a start menu link is created.
    pub fn includes_start_menu(self) -> bool {
        matches!(self, Self::StartMenu | Self::Both)
    }
}

impl fmt::Display for ShortcutLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Desktop => "desktop",
            Self::StartMenu => "start_menu",
            Self::Both => "both",
        })
    }
}

/// A `.lnk` shortcut pointing into the install root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutConfig {
    /// Link name without extension.
    pub name: String,
    /// Install-relative path of the launched file.
    pub target: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub working_dir: String,
    #[serde(default)]
    pub arguments: String,
    #[serde(default)]
    pub location: ShortcutLocation,
    #[serde(default)]
    pub description: String,
}

impl ShortcutConfig {
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            icon: String::new(),
            working_dir: String::new(),
            arguments: String::new(),
            location: ShortcutLocation::default(),
            description: String::new(),
        }
    }
}
