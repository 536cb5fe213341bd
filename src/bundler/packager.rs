//! The external packaging tool.
//!
//! The build orchestrator only depends on the [`Packager`] trait, so tests
//! can drive the whole state machine with a stub that drops a fake
//! executable into `dist/`.

use crate::bundler::{Error, Result};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Fixed non-interactive flags passed before the spec file.
pub const PACKAGER_FLAGS: [&str; 2] = ["--noconfirm", "--clean"];

/// Inputs of one packaging run.
#[derive(Debug, Clone)]
pub struct PackagerInvocation {
    /// Working directory of the tool; its output lands in `<workspace>/dist`.
    pub workspace: PathBuf,
    /// Build spec inside the workspace.
    pub spec_file: PathBuf,
}

/// Captured result of a packaging run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackagerOutput {
    /// Exit status, `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl PackagerOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Capability that turns a build spec into a native executable.
///
/// Implementations must not outlive the returned future: dropping it is how
/// the orchestrator cancels a run, so any child process should be killed on
/// drop.
pub trait Packager: Send + Sync + 'static {
    /// Short tool name used in messages.
    fn name(&self) -> &str;

    /// Human-readable command line, for logs.
    fn describe(&self, invocation: &PackagerInvocation) -> String {
        format!(
            "{} {} {}",
            self.name(),
            PACKAGER_FLAGS.join(" "),
            invocation.spec_file.display()
        )
    }

    /// Run the tool to completion.
    ///
    /// A tool that starts and exits non-zero is `Ok` with its exit code; `Err`
    /// is reserved for failing to run it at all.
    fn package(
        &self,
        invocation: PackagerInvocation,
    ) -> impl Future<Output = Result<PackagerOutput>> + Send;
}

/// PyInstaller, either as its own launcher or as `python -m PyInstaller`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PyInstaller {
    program: PathBuf,
    base_args: Vec<String>,
}

impl PyInstaller {
    pub fn new(program: impl Into<PathBuf>, base_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            base_args,
        }
    }

    /// Locate PyInstaller on `PATH`.
    ///
    /// Prefers the `pyinstaller` launcher, then `python -m PyInstaller` with
    /// `python` or `python3`.
    pub fn detect() -> Result<Self> {
        if let Ok(path) = which::which("pyinstaller") {
            log::debug!("Found pyinstaller at: {}", path.display());
            return Ok(Self::new(path, Vec::new()));
        }
        for python in ["python", "python3"] {
            if let Ok(path) = which::which(python) {
                log::debug!("Using {} -m PyInstaller ({})", python, path.display());
                return Ok(Self::new(path, vec!["-m".into(), "PyInstaller".into()]));
            }
        }
        Err(Error::PackagerNotFound)
    }

    /// Parse a whitespace separated command line such as `python3 -m PyInstaller`.
    pub fn from_command_line(command_line: &str) -> Result<Self> {
        let mut parts = command_line.split_whitespace();
        let Some(program) = parts.next() else {
            crate::bail!("packager command line is empty");
        };
        Ok(Self::new(program, parts.map(str::to_string).collect()))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn base_args(&self) -> &[String] {
        &self.base_args
    }
}

impl Packager for PyInstaller {
    fn name(&self) -> &str {
        "PyInstaller"
    }

    fn describe(&self, invocation: &PackagerInvocation) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.base_args.iter().cloned());
        parts.extend(PACKAGER_FLAGS.iter().map(|f| f.to_string()));
        parts.push(invocation.spec_file.display().to_string());
        parts.join(" ")
    }

    async fn package(&self, invocation: PackagerInvocation) -> Result<PackagerOutput> {
        let command = self.describe(&invocation);
        log::debug!("Running: {} (cwd {})", command, invocation.workspace.display());

        let child = Command::new(&self.program)
            .args(&self.base_args)
            .args(PACKAGER_FLAGS)
            .arg(&invocation.spec_file)
            .current_dir(&invocation.workspace)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|error| Error::CommandFailed {
                command: command.clone(),
                error,
            })?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|error| Error::CommandFailed { command, error })?;

        Ok(PackagerOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_command_line() {
        let p = PyInstaller::from_command_line("  python3 -m   PyInstaller ").expect("parse");
        assert_eq!(p.program(), Path::new("python3"));
        assert_eq!(p.base_args(), ["-m", "PyInstaller"]);
        assert!(PyInstaller::from_command_line("   ").is_err());
    }

    #[test]
    fn test_describe_includes_fixed_flags() {
        let p = PyInstaller::new("pyinstaller", Vec::new());
        let inv = PackagerInvocation {
            workspace: PathBuf::from("ws"),
            spec_file: PathBuf::from("installer.spec"),
        };
        assert_eq!(p.describe(&inv), "pyinstaller --noconfirm --clean installer.spec");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_code_and_stderr_are_captured() {
        let dir = tempfile::tempdir().expect("tempdir");
        let p = PyInstaller::new(
            "sh",
            vec!["-c".into(), "echo boom >&2; exit 3".into(), "sh".into()],
        );
        let out = p
            .package(PackagerInvocation {
                workspace: dir.path().to_path_buf(),
                spec_file: PathBuf::from("installer.spec"),
            })
            .await
            .expect("spawn");
        assert_eq!(out.exit_code, Some(3));
        assert!(!out.success());
        assert_eq!(out.stderr.trim(), "boom");
    }
}
