//! # Kodegen Installer Bundler
//!
//! Turns a declarative installer project into a self-contained Windows setup
//! executable.
//!
//! A project document describes the application, the files it installs,
//! shortcuts, registry entries, dependencies and ordered script elements.
//! From it the bundler synthesizes a standalone installer program and a
//! PyInstaller build spec, freezes both into a single executable in a scratch
//! workspace, and moves the result to the output directory.
//!
//! ## Features
//!
//! - **Project documents**: JSON or TOML, with defaults backfilled on load
//! - **Validation**: blocking errors and advisory warnings before any build
//! - **Deterministic synthesis**: identical projects give identical sources
//! - **Observable builds**: progress and log events, one terminal outcome
//! - **Cancellation**: between phases and during the packaging run
//! - **Optional signing**: Authenticode after relocation
//!
//! ## Usage
//!
//! ```bash
//! kodegen_bundler_installer new demo.json --name "Demo App"
//! kodegen_bundler_installer add-file demo.json dist/demo.exe demo.exe
//! kodegen_bundler_installer validate demo.json
//! kodegen_bundler_installer build demo.json --yes
//! ```

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod bundler;
pub mod cli;
pub mod error;
pub mod project;

pub use bundler::{
    BuildEvent, BuildHandle, BuildOptions, BuildPhase, BuildReport, BuildRequest,
    InstallerBuilder, Packager, PyInstaller,
};
pub use cli::Args;
pub use error::{CliError, InstallerError, ProjectError, Result};
pub use project::{ProjectConfig, ValidationResult, load_project, save_project, validate};
