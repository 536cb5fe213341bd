//! Windows installer generation from a [`ProjectConfig`](crate::project::ProjectConfig).
//!
//! A build synthesizes a standalone installer program and a PyInstaller build
//! spec into a scratch workspace, runs the packaging tool there, and moves
//! the resulting executable to the requested output directory:
//!
//! ```text
//! ProjectConfig ──► installer.py ──┐
//!              └──► installer.spec ─┴──► PyInstaller ──► dist/*.exe ──► <out>/<Name>_Setup.exe
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use kodegen_bundler_installer::bundler::{BuildOptions, BuildRequest, InstallerBuilder, PyInstaller};
//! use kodegen_bundler_installer::project::load_project;
//!
//! # async fn example() -> kodegen_bundler_installer::Result<()> {
//! let project = load_project("demo.json".as_ref())?;
//! let builder = InstallerBuilder::new(PyInstaller::detect()?, BuildOptions::default());
//! let (events, report) = builder.start(BuildRequest::new(&project, "out"))?.collect().await;
//! println!("{} events, success = {}", events.len(), report.success);
//! # Ok(())
//! # }
//! ```
//!
//! # Code Signing
//!
//! When the project enables `sign_installer`, the relocated executable is
//! signed with `signtool` on Windows or `osslsigncode` elsewhere.

mod builder;
mod error;
mod events;
mod packager;
mod sign;
pub mod synth;
mod utils;
mod workspace;

pub use builder::{
    BuildHandle, BuildOptions, BuildReport, BuildRequest, InstallerBuilder, WORKSPACE_PREFIX,
};
pub use error::{Error, ErrorExt, Result};
pub use events::{BuildEvent, BuildPhase, EventReceiver, EventSender, EventSink, channel};
pub use packager::{PACKAGER_FLAGS, Packager, PackagerInvocation, PackagerOutput, PyInstaller};
pub use sign::{SignConfig, sign_file};
pub use synth::{synthesize_build_spec, synthesize_installer_source};
pub use workspace::{Cleanup, DIST_DIR_NAME, ScratchWorkspace};
