//! Script elements: ordered actions attached to a project.
//!
//! Each element's parameters are a tagged union keyed by the action kind, so
//! adding a kind forces every consumer (notably the installer synthesizer) to
//! decide what to do with it. The persisted shape keeps the open
//! `{type, name, parameters, id, enabled, critical}` layout.

use crate::project::{RegistryHive, RegistryValueType, ShortcutLocation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Stable identifier of a script element. Equality of elements is by id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScriptElementId(String);

impl ScriptElementId {
    /// Fresh 8-character identifier.
    pub fn generate() -> Self {
        let uuid = uuid::Uuid::new_v4().to_string();
        Self(uuid[..8].to_string())
    }

    /// Identifier prefixed with the element kind, used to replace blank ids.
    pub fn for_kind(kind: ScriptElementKind) -> Self {
        let hex = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("{}_{}", kind.as_str(), &hex[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ScriptElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ScriptElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ScriptElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The action kind of a script element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptElementKind {
    InstallFile,
    CreateDir,
    CreateShortcut,
    ExecuteCommand,
    SetRegistry,
    CreateUninstaller,
    ShowLicense,
    RequireAdmin,
    CheckDiskSpace,
    DownloadFile,
    CreateService,
    SetEnvironment,
    RunScript,
}

impl ScriptElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InstallFile => "install_file",
            Self::CreateDir => "create_dir",
            Self::CreateShortcut => "create_shortcut",
            Self::ExecuteCommand => "execute_command",
            Self::SetRegistry => "set_registry",
            Self::CreateUninstaller => "create_uninstaller",
            Self::ShowLicense => "show_license",
            Self::RequireAdmin => "require_admin",
            Self::CheckDiskSpace => "check_disk_space",
            Self::DownloadFile => "download_file",
            Self::CreateService => "create_service",
            Self::SetEnvironment => "set_environment",
            Self::RunScript => "run_script",
        }
    }
}

impl fmt::Display for ScriptElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Installer lifecycle point a script is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptEvent {
    PreInstall,
    PostInstall,
    PreUninstall,
    PostUninstall,
}

/// Interpreter for script content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptLanguage {
    #[default]
    Python,
    Cmd,
}

impl ScriptLanguage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Cmd => "cmd",
        }
    }
}

/// Kind-specific parameters of a script element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "parameters", rename_all = "snake_case")]
pub enum ScriptAction {
    InstallFile {
        #[serde(default)]
        source: String,
        #[serde(default)]
        destination: String,
        #[serde(default)]
        overwrite: bool,
    },
    CreateDir {
        #[serde(default)]
        path: String,
    },
    CreateShortcut {
        #[serde(default)]
        target: String,
        #[serde(default)]
        location: ShortcutLocation,
        #[serde(default)]
        arguments: String,
    },
    ExecuteCommand {
        #[serde(default)]
        command: String,
        #[serde(default)]
        working_dir: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        event: Option<ScriptEvent>,
    },
    SetRegistry {
        #[serde(default)]
        hive: RegistryHive,
        #[serde(default)]
        key: String,
        #[serde(default)]
        value_name: String,
        #[serde(default)]
        value_type: RegistryValueType,
        #[serde(default)]
        value_data: String,
    },
    CreateUninstaller {},
    ShowLicense {
        #[serde(default)]
        license_file: String,
        #[serde(default)]
        license_text: String,
    },
    RequireAdmin {},
    CheckDiskSpace {
        #[serde(default)]
        required_mb: u64,
    },
    DownloadFile {
        #[serde(default)]
        url: String,
        #[serde(default)]
        destination: String,
    },
    CreateService {
        #[serde(default)]
        service_name: String,
        #[serde(default)]
        display_name: String,
        #[serde(default)]
        executable: String,
        #[serde(default)]
        start_type: String,
    },
    SetEnvironment {
        #[serde(default)]
        variable: String,
        #[serde(default)]
        value: String,
        #[serde(default)]
        system: bool,
    },
    RunScript {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        event: Option<ScriptEvent>,
        #[serde(default)]
        language: ScriptLanguage,
        #[serde(default)]
        content: String,
    },
}

/// A command the generated installer runs after copying files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostInstallCommand<'a> {
    pub language: ScriptLanguage,
    pub content: &'a str,
}

impl ScriptAction {
    pub fn kind(&self) -> ScriptElementKind {
        match self {
            Self::InstallFile { .. } => ScriptElementKind::InstallFile,
            Self::CreateDir { .. } => ScriptElementKind::CreateDir,
            Self::CreateShortcut { .. } => ScriptElementKind::CreateShortcut,
            Self::ExecuteCommand { .. } => ScriptElementKind::ExecuteCommand,
            Self::SetRegistry { .. } => ScriptElementKind::SetRegistry,
            Self::CreateUninstaller {} => ScriptElementKind::CreateUninstaller,
            Self::ShowLicense { .. } => ScriptElementKind::ShowLicense,
            Self::RequireAdmin {} => ScriptElementKind::RequireAdmin,
            Self::CheckDiskSpace { .. } => ScriptElementKind::CheckDiskSpace,
            Self::DownloadFile { .. } => ScriptElementKind::DownloadFile,
            Self::CreateService { .. } => ScriptElementKind::CreateService,
            Self::SetEnvironment { .. } => ScriptElementKind::SetEnvironment,
            Self::RunScript { .. } => ScriptElementKind::RunScript,
        }
    }

    /// Empty parameters for the given kind.
    pub fn empty(kind: ScriptElementKind) -> Self {
        match kind {
            ScriptElementKind::InstallFile => Self::InstallFile {
                source: String::new(),
                destination: String::new(),
                overwrite: false,
            },
            ScriptElementKind::CreateDir => Self::CreateDir { path: String::new() },
            ScriptElementKind::CreateShortcut => Self::CreateShortcut {
                target: String::new(),
                location: ShortcutLocation::default(),
                arguments: String::new(),
            },
            ScriptElementKind::ExecuteCommand => Self::ExecuteCommand {
                command: String::new(),
                working_dir: String::new(),
                event: None,
            },
            ScriptElementKind::SetRegistry => Self::SetRegistry {
                hive: RegistryHive::default(),
                key: String::new(),
                value_name: String::new(),
                value_type: RegistryValueType::default(),
                value_data: String::new(),
            },
            ScriptElementKind::CreateUninstaller => Self::CreateUninstaller {},
            ScriptElementKind::ShowLicense => Self::ShowLicense {
                license_file: String::new(),
                license_text: String::new(),
            },
            ScriptElementKind::RequireAdmin => Self::RequireAdmin {},
            ScriptElementKind::CheckDiskSpace => Self::CheckDiskSpace { required_mb: 0 },
            ScriptElementKind::DownloadFile => Self::DownloadFile {
                url: String::new(),
                destination: String::new(),
            },
            ScriptElementKind::CreateService => Self::CreateService {
                service_name: String::new(),
                display_name: String::new(),
                executable: String::new(),
                start_type: String::new(),
            },
            ScriptElementKind::SetEnvironment => Self::SetEnvironment {
                variable: String::new(),
                value: String::new(),
                system: false,
            },
            ScriptElementKind::RunScript => Self::RunScript {
                event: None,
                language: ScriptLanguage::default(),
                content: String::new(),
            },
        }
    }

    /// The command this action contributes to the post-install pass, if any.
    ///
    /// Only `run_script` and `execute_command` attached to `post_install` are
    /// actioned; every other kind is descriptive.
    pub fn post_install_command(&self) -> Option<PostInstallCommand<'_>> {
        match self {
            Self::RunScript {
                event: Some(ScriptEvent::PostInstall),
                language,
                content,
            } => Some(PostInstallCommand {
                language: *language,
                content,
            }),
            Self::ExecuteCommand {
                command,
                event: Some(ScriptEvent::PostInstall),
                ..
            } => Some(PostInstallCommand {
                language: ScriptLanguage::Cmd,
                content: command,
            }),
            Self::RunScript { .. }
            | Self::ExecuteCommand { .. }
            | Self::InstallFile { .. }
            | Self::CreateDir { .. }
            | Self::CreateShortcut { .. }
            | Self::SetRegistry { .. }
            | Self::CreateUninstaller {}
            | Self::ShowLicense { .. }
            | Self::RequireAdmin {}
            | Self::CheckDiskSpace { .. }
            | Self::DownloadFile { .. }
            | Self::CreateService { .. }
            | Self::SetEnvironment { .. } => None,
        }
    }
}

/// An element of the installer script.
///
/// Two elements are equal when their ids are equal, regardless of content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RawScriptElement", into = "RawScriptElement")]
pub struct ScriptElement {
    pub id: ScriptElementId,
    pub name: String,
    pub action: ScriptAction,
    pub enabled: bool,
    /// Abort the remaining post-install steps when this element fails.
    pub critical: bool,
    /// Parameter keys `action` does not model, written back untouched on save.
    pub extra_parameters: Map<String, Value>,
    /// Why the stored parameters could not be read. Such an element keeps its
    /// raw parameters in `extra_parameters` and is never actioned.
    pub load_error: Option<String>,
}

impl ScriptElement {
    /// New enabled, non-critical element with a fresh id.
    pub fn new(name: impl Into<String>, action: ScriptAction) -> Self {
        Self {
            id: ScriptElementId::generate(),
            name: name.into(),
            action,
            enabled: true,
            critical: false,
            extra_parameters: Map::new(),
            load_error: None,
        }
    }

    pub fn kind(&self) -> ScriptElementKind {
        self.action.kind()
    }

    /// Whether the element was loaded with unreadable parameters.
    pub fn is_inert(&self) -> bool {
        self.load_error.is_some()
    }

    /// Command for the post-install pass, if this element contributes one.
    pub fn post_install_command(&self) -> Option<PostInstallCommand<'_>> {
        if self.is_inert() {
            return None;
        }
        self.action.post_install_command()
    }

    pub fn critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl PartialEq for ScriptElement {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ScriptElement {}

/// Persisted form of a script element.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawScriptElement {
    #[serde(rename = "type")]
    kind: ScriptElementKind,
    name: String,
    #[serde(default)]
    parameters: Map<String, Value>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    critical: bool,
}

fn default_enabled() -> bool {
    true
}

fn action_parameters(action: &ScriptAction) -> Map<String, Value> {
    match serde_json::to_value(action) {
        Ok(Value::Object(mut tagged)) => match tagged.remove("parameters") {
            Some(Value::Object(parameters)) => parameters,
            _ => Map::new(),
        },
        _ => Map::new(),
    }
}

impl From<RawScriptElement> for ScriptElement {
    fn from(raw: RawScriptElement) -> Self {
        let tagged = serde_json::json!({
            "type": raw.kind,
            "parameters": raw.parameters,
        });
        let (action, extra_parameters, load_error) =
            match serde_json::from_value::<ScriptAction>(tagged) {
                Ok(action) => {
                    let known = action_parameters(&action);
                    let mut extra = raw.parameters;
                    extra.retain(|key, _| !known.contains_key(key));
                    (action, extra, None)
                }
                Err(e) => (ScriptAction::empty(raw.kind), raw.parameters, Some(e.to_string())),
            };

        let id = match raw.id {
            None => ScriptElementId::generate(),
            Some(id) if id.trim().is_empty() => ScriptElementId::for_kind(raw.kind),
            Some(id) => ScriptElementId::from(id),
        };

        Self {
            id,
            name: raw.name,
            action,
            enabled: raw.enabled,
            critical: raw.critical,
            extra_parameters,
            load_error,
        }
    }
}

impl From<ScriptElement> for RawScriptElement {
    fn from(element: ScriptElement) -> Self {
        let kind = element.kind();
        let mut parameters = element.extra_parameters;
        if element.load_error.is_none() {
            parameters.extend(action_parameters(&element.action));
        }

        Self {
            kind,
            name: element.name,
            parameters,
            id: Some(element.id.0),
            enabled: element.enabled,
            critical: element.critical,
        }
    }
}
