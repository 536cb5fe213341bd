//! Project document persistence.
//!
//! Documents are pretty-printed JSON unless the path ends in `.toml`. Saves
//! go through a temporary sibling file and a rename so a crash never leaves a
//! half-written document behind.

use crate::error::ProjectError;
use crate::project::ProjectConfig;
use std::fs;
use std::io::Write;
use std::path::Path;

/// On-disk encoding of a project document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    /// Pick the format from the path extension. Paths without one are JSON.
    pub fn from_path(path: &Path) -> Result<Self, ProjectError> {
        match path.extension().and_then(|e| e.to_str()) {
            None => Ok(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            Some(ext) => Err(ProjectError::UnsupportedFormat {
                extension: ext.to_string(),
            }),
        }
    }

    /// Decode a project read from `path`, backfilling absent fields.
    pub fn decode(self, path: &Path, text: &str) -> Result<ProjectConfig, ProjectError> {
        match self {
            Self::Json => serde_json::from_str(text).map_err(|source| ProjectError::Json {
                path: path.to_path_buf(),
                source,
            }),
            Self::Toml => toml::from_str(text).map_err(|source| ProjectError::Toml {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Encode a project destined for `path`.
    pub fn encode(self, path: &Path, project: &ProjectConfig) -> Result<String, ProjectError> {
        match self {
            Self::Json => {
                serde_json::to_string_pretty(project).map_err(|source| ProjectError::Json {
                    path: path.to_path_buf(),
                    source,
                })
            }
            Self::Toml => {
                toml::to_string_pretty(project).map_err(|source| ProjectError::TomlRender {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }
}

/// Read a project document.
pub fn load_project(path: &Path) -> Result<ProjectConfig, ProjectError> {
    let format = DocumentFormat::from_path(path)?;
    if !path.exists() {
        return Err(ProjectError::DocumentNotFound {
            path: path.to_path_buf(),
        });
    }

    let text = fs::read_to_string(path).map_err(|source| ProjectError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let project = format.decode(path, &text)?;

    for element in project.script_elements.iter().filter(|e| e.is_inert()) {
        log::warn!(
            "{}: script element '{}' ({}) is kept but skipped: {}",
            path.display(),
            element.name,
            element.id,
            element.load_error.as_deref().unwrap_or_default()
        );
    }

    log::debug!(
        "Loaded project '{}' from {} ({} files, {} script elements)",
        project.name,
        path.display(),
        project.files.len(),
        project.script_elements.len()
    );
    Ok(project)
}

/// Write a project document atomically.
pub fn save_project(project: &ProjectConfig, path: &Path) -> Result<(), ProjectError> {
    let format = DocumentFormat::from_path(path)?;
    let save_failed = |reason: String| ProjectError::Save {
        path: path.to_path_buf(),
        reason,
    };

    let serialized = format.encode(path, project)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| save_failed(format!("Failed to create parent directory: {}", e)))?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_file_path = std::path::PathBuf::from(temp_name);

    {
        let mut file = fs::File::create(&temp_file_path)
            .map_err(|e| save_failed(format!("Failed to create temp file: {}", e)))?;
        file.write_all(serialized.as_bytes())
            .map_err(|e| save_failed(format!("Failed to write project: {}", e)))?;
        file.sync_all()
            .map_err(|e| save_failed(format!("Failed to sync file: {}", e)))?;
    }

    fs::rename(&temp_file_path, path)
        .map_err(|e| save_failed(format!("Failed to rename temp file: {}", e)))?;

    log::debug!("Saved project '{}' to {}", project.name, path.display());
    Ok(())
}
