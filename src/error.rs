//! Error types for kodegen_bundler_installer operations.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for kodegen_bundler_installer operations
pub type Result<T> = std::result::Result<T, InstallerError>;

/// Main error type for all kodegen_bundler_installer operations
#[derive(Error, Debug)]
pub enum InstallerError {
    /// Project document and model errors
    #[error("Project error: {0}")]
    Project(#[from] ProjectError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// Bundler errors
    #[error("Bundler error: {0}")]
    Bundler(#[from] crate::bundler::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Project document and model errors
#[derive(Error, Debug)]
pub enum ProjectError {
    /// Project document not found
    #[error("Project document not found at {path}")]
    DocumentNotFound {
        /// Path where the document was expected
        path: PathBuf,
    },

    /// Project document could not be read
    #[error("Failed to read project document {path}: {source}")]
    Read {
        /// Document path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// JSON project document could not be decoded or encoded
    #[error("Invalid JSON project document {path}: {source}")]
    Json {
        /// Document path
        path: PathBuf,
        /// The underlying serde_json error
        #[source]
        source: serde_json::Error,
    },

    /// TOML project document could not be decoded
    #[error("Invalid TOML project document {path}: {source}")]
    Toml {
        /// Document path
        path: PathBuf,
        /// The underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// Project could not be encoded as TOML
    #[error("Failed to encode project document {path} as TOML: {source}")]
    TomlRender {
        /// Document path
        path: PathBuf,
        /// The underlying TOML error
        #[source]
        source: toml::ser::Error,
    },

    /// Project document could not be written
    #[error("Failed to save project document {path}: {reason}")]
    Save {
        /// Document path
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Document extension is not a known format
    #[error("Unsupported project document format '{extension}' (expected .json or .toml)")]
    UnsupportedFormat {
        /// Extension found on the path
        extension: String,
    },

    /// No script element with the given id
    #[error("Script element '{id}' not found")]
    ElementNotFound {
        /// Id that was looked up
        id: String,
    },

    /// Project failed validation
    #[error("Project is invalid: {}", errors.join("; "))]
    Invalid {
        /// Blocking validation errors
        errors: Vec<String>,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// User declined to continue
    #[error("Aborted by user")]
    Aborted,
}

impl InstallerError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        use crate::bundler::Error as BundlerError;

        match self {
            InstallerError::Project(ProjectError::DocumentNotFound { path }) => vec![
                format!("Create the document first: kodegen_bundler_installer new {}", path.display()),
                "Check the path passed on the command line".to_string(),
            ],
            InstallerError::Project(ProjectError::Invalid { .. }) => vec![
                "Run `kodegen_bundler_installer validate <document>` for the full report".to_string(),
                "Fill in name, version and output_dir in the project document".to_string(),
            ],
            InstallerError::Project(
                ProjectError::Json { .. } | ProjectError::Toml { .. },
            ) => vec![
                "Fix the syntax error reported above in the project document".to_string(),
                "Documents ending in .toml are read as TOML, everything else as JSON".to_string(),
            ],
            InstallerError::Project(ProjectError::ElementNotFound { .. }) => vec![
                "List element ids: kodegen_bundler_installer elements <document> list".to_string(),
            ],
            InstallerError::Bundler(BundlerError::PackagerNotFound) => vec![
                "Install PyInstaller: python -m pip install pyinstaller".to_string(),
                "Or point KODEGEN_PACKAGER at a packaging tool command line".to_string(),
            ],
            InstallerError::Bundler(BundlerError::PackagingFailed { .. }) => vec![
                "Re-run with --keep-workspace to inspect installer.py and installer.spec"
                    .to_string(),
                "Check the PyInstaller output above for missing modules".to_string(),
            ],
            InstallerError::Bundler(BundlerError::BuildInProgress) => vec![
                "Wait for the running build to finish before starting another".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}
