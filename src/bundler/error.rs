//! Error types for bundler operations.
//!
//! Provides filesystem errors with path context and the
//! failure conditions of an installer build.
//!
//! # Example
//!
//! ```no_run
//! use kodegen_bundler_installer::bundler::{ErrorExt, Result};
//! use std::path::Path;
//!
//! fn read_spec(path: &Path) -> Result<String> {
//!     let contents = std::fs::read_to_string(path).fs_context("reading build spec", path)?;
//!     if contents.contains('\0') {
//!         kodegen_bundler_installer::bail!("build spec {} is not text", path.display());
//!     }
//!     Ok(contents)
//! }
//! ```

use crate::bundler::BuildPhase;
use std::{io, path::PathBuf};
use thiserror::Error as DeriveError;

/// Errors returned by the bundler.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// File system error with path context.
    ///
    /// Created by the [`ErrorExt`] trait's `fs_context` method.
    #[error("{context} {path}: {error}")]
    Fs {
        /// Context describing the operation (e.g., "writing installer script")
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        error: io::Error,
    },

    /// Child process could not be started or awaited.
    #[error("failed to run command {command}: {error}")]
    CommandFailed {
        /// Command that failed to execute
        command: String,
        /// The underlying error
        error: io::Error,
    },

    /// Generic I/O error.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// Handlebars template rendering error.
    #[error("{0}")]
    HandleBarsError(#[from] handlebars::RenderError),

    /// Handlebars template parsing error.
    #[error("{0}")]
    Template(#[from] handlebars::TemplateError),

    /// JSON serialization/deserialization error.
    #[error("{0}")]
    JsonError(#[from] serde_json::error::Error),

    /// No packaging tool could be located.
    #[error("PyInstaller not found: install it or set KODEGEN_PACKAGER")]
    PackagerNotFound,

    /// The packaging tool exited with a non-zero status.
    #[error("{tool} failed (exit code {}):\n{stderr}", exit_code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    PackagingFailed {
        /// Name of the packaging tool
        tool: String,
        /// Exit status, `None` when terminated by a signal
        exit_code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// The packaging tool did not create its output directory.
    #[error("Dist directory not found: {}", path.display())]
    DistNotFound {
        /// Expected dist directory
        path: PathBuf,
    },

    /// The output directory holds no executable.
    #[error("No .exe file found in {}. Files present: {found:?}", dir.display())]
    ExecutableNotFound {
        /// Dist directory that was searched
        dir: PathBuf,
        /// Entry names found in the directory
        found: Vec<String>,
    },

    /// Another build is already running on this builder.
    #[error("an installer build is already in progress")]
    BuildInProgress,

    /// The build was cancelled by the caller.
    #[error("build cancelled during {phase}")]
    Cancelled {
        /// Phase that was active when cancellation was observed
        phase: BuildPhase,
    },

    /// Code signing failed.
    #[error("failed to sign installer: {0}")]
    Sign(String),

    /// Generic error with custom message.
    #[error("{0}")]
    GenericError(String),
}

/// Convenient type alias for Result.
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for filesystem operations with automatic path context.
pub trait ErrorExt<T> {
    /// Add filesystem context to an I/O error.
    ///
    /// The `context` should be a present-tense verb phrase describing the operation,
    /// e.g., "reading file", "creating directory", "moving installer".
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

impl Error {
    /// Whether the build stopped because the caller cancelled it.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Macro for early return with error.
///
/// Converts the message into a [`Error::GenericError`] and returns immediately.
///
/// # Examples
///
/// ```ignore
/// bail!("operation failed");
/// bail!("invalid value: {}", value);
/// ```
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::Error::GenericError($msg.into()))
    };
    ($err:expr $(,)?) => {
        return Err($crate::bundler::Error::GenericError($err.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($fmt, $($arg)*)))
    };
}
