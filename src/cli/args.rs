//! Command line argument parsing and validation.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Build Windows installers from installer project documents
#[derive(Parser, Debug)]
#[command(
    name = "kodegen_bundler_installer",
    version,
    about = "Build Windows installers from installer project documents",
    long_about = "Create, validate and build installer projects.

A project document (.json or .toml) describes the application, its files,
shortcuts, registry entries, dependencies and script elements. `build`
synthesizes an installer program and a PyInstaller spec, then freezes them
into <Name>_Setup.exe.

Usage:
  kodegen_bundler_installer new demo.json --name \"Demo App\"
  kodegen_bundler_installer validate demo.json
  kodegen_bundler_installer build demo.json --yes"
)]
pub struct Args {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Show log lines of the build
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Installer project commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create a new project document
    New {
        /// Path of the document to create (.json or .toml)
        document: PathBuf,

        /// Application name
        #[arg(long)]
        name: Option<String>,

        /// Application version
        #[arg(long)]
        version: Option<String>,

        /// Directory the built installer is written to
        #[arg(long)]
        output_dir: Option<String>,

        /// Overwrite an existing document
        #[arg(long)]
        force: bool,
    },

    /// Check a project document for errors and warnings
    Validate {
        /// Project document
        document: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write installer.py and installer.spec without packaging
    Generate {
        /// Project document
        document: PathBuf,

        /// Directory to write the sources into
        #[arg(long)]
        out_dir: PathBuf,
    },

    /// Build the installer executable
    Build {
        /// Project document
        document: PathBuf,

        /// Override the project's output directory
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Continue without confirming validation warnings
        #[arg(short, long)]
        yes: bool,

        /// Packaging tool command line (default: detect PyInstaller)
        #[arg(long, env = "KODEGEN_PACKAGER")]
        packager: Option<String>,

        /// Keep the scratch workspace for debugging
        #[arg(long, env = "KODEGEN_KEEP_WORKSPACE")]
        keep_workspace: bool,

        /// Parent directory for scratch workspaces
        #[arg(long, env = "KODEGEN_WORKSPACE_ROOT")]
        workspace_root: Option<PathBuf>,
    },

    /// Maintain the ordered script element list
    Elements {
        /// Project document
        document: PathBuf,

        #[command(subcommand)]
        action: ElementsAction,
    },

    /// Add a file to install
    AddFile {
        /// Project document
        document: PathBuf,

        /// File or directory on this machine
        source: String,

        /// Path relative to the install directory
        install_path: String,
    },
}

/// Script element list operations
#[derive(Subcommand, Debug, Clone)]
pub enum ElementsAction {
    /// List elements in order
    List,

    /// Remove an element
    Remove {
        /// Element id
        id: String,
    },

    /// Move an element one position
    Move {
        /// Element id
        id: String,

        /// Direction to move in
        #[arg(value_enum)]
        direction: Direction,
    },
}

/// Direction of an element move
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Command {
    /// Command name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::New { .. } => "new",
            Command::Validate { .. } => "validate",
            Command::Generate { .. } => "generate",
            Command::Build { .. } => "build",
            Command::Elements { .. } => "elements",
            Command::AddFile { .. } => "add-file",
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Command::New { name: Some(name), .. } if name.trim().is_empty() => {
                Err("--name must not be empty".to_string())
            }
            Command::Build {
                packager: Some(packager),
                ..
            } if packager.trim().is_empty() => {
                Err("--packager must not be empty".to_string())
            }
            Command::AddFile { install_path, .. } if install_path.trim().is_empty() => {
                Err("Install path is required".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(verbose, quiet),
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print verbose message
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }

    /// Check if verbose output is enabled
    pub fn is_verbose(&self) -> bool {
        self.output.is_verbose()
    }

    /// Check if quiet output is enabled
    pub fn is_quiet(&self) -> bool {
        self.output.is_quiet()
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.verbose, args.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elements_move_parses() {
        let args = Args::try_parse_from([
            "kodegen_bundler_installer",
            "elements",
            "demo.json",
            "move",
            "abc123",
            "down",
        ])
        .expect("parse");
        match args.command {
            Command::Elements {
                action: ElementsAction::Move { id, direction },
                ..
            } => {
                assert_eq!(id, "abc123");
                assert_eq!(direction, Direction::Down);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_blank_packager_is_rejected() {
        let args = Args::try_parse_from([
            "kodegen_bundler_installer",
            "build",
            "demo.json",
            "--packager",
            " ",
        ])
        .expect("parse");
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(
            Args::try_parse_from(["kodegen_bundler_installer", "-v", "-q", "validate", "x.json"])
                .is_err()
        );
    }
}
