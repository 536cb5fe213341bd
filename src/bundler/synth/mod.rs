//! Source synthesis for the generated installer.
//!
//! Two text artifacts are produced from a [`ProjectConfig`](crate::project::ProjectConfig):
//! the installer program (`installer.py`) and the PyInstaller build spec
//! (`installer.spec`). Both are rendered from templates compiled into the
//! binary. Every value substituted into a template is already a Python
//! literal, so rendering never escapes anything.

mod build_spec;
mod installer;
pub mod literal;

pub use build_spec::{BASE_HIDDEN_IMPORTS, hidden_imports, synthesize_build_spec};
pub use installer::{
    FailurePolicy, InstallStep, PostInstallStep, post_install_steps, synthesize_installer_source,
};

use crate::bundler::Result;
use handlebars::Handlebars;
use serde::Serialize;

/// File name of the installer program inside the workspace.
pub const INSTALLER_SCRIPT_NAME: &str = "installer.py";

/// File name of the build spec inside the workspace.
pub const BUILD_SPEC_NAME: &str = "installer.spec";

fn render<T: Serialize>(name: &str, template: &str, data: &T) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.register_template_string(name, template)?;
    Ok(handlebars.render(name, data)?)
}
