//! Installer build orchestration.
//!
//! [`InstallerBuilder`] runs one build at a time on a background tokio task
//! and drives it through the phases of [`BuildPhase`]:
//!
//! 1. `preparing`: create a scratch workspace
//! 2. `scripting`: write `installer.py`
//! 3. `specifying`: write `installer.spec`
//! 4. `packaging`: run the packaging tool inside the workspace
//! 5. `collecting`: find the produced executable in `dist/`
//! 6. `relocating`: move it to `<output_dir>/<safe name>_Setup.exe`
//! 7. `signing`: optional Authenticode signature
//!
//! The workspace is cleaned up on every exit path. The caller observes the
//! run only through [`BuildEvent`]s, and [`BuildEvent::Finished`] is always
//! the last one.
//!
//! # Example
//!
//! ```no_run
//! use kodegen_bundler_installer::bundler::{BuildOptions, BuildRequest, InstallerBuilder, PyInstaller};
//! use kodegen_bundler_installer::project::ProjectConfig;
//!
//! # async fn example() -> kodegen_bundler_installer::bundler::Result<()> {
//! let builder = InstallerBuilder::new(PyInstaller::detect()?, BuildOptions::default());
//! let mut handle = builder.start(BuildRequest::new(&ProjectConfig::new("Demo"), "dist"))?;
//! while let Some(event) = handle.next_event().await {
//!     println!("{event:?}");
//! }
//! let report = handle.wait().await;
//! assert!(report.success);
//! # Ok(())
//! # }
//! ```

use crate::bundler::events::{self, BuildEvent, BuildPhase, EventReceiver, EventSink};
use crate::bundler::packager::{Packager, PackagerInvocation};
use crate::bundler::sign::{SignConfig, sign_file};
use crate::bundler::synth::{synthesize_build_spec, synthesize_installer_source};
use crate::bundler::utils::fs;
use crate::bundler::workspace::{Cleanup, ScratchWorkspace};
use crate::bundler::{Error, ErrorExt, Result};
use crate::project::{EXECUTABLE_EXTENSION, ProjectConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Default prefix of scratch workspace directory names.
pub const WORKSPACE_PREFIX: &str = "instgen_";

/// Orchestrator settings shared by every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Parent directory of scratch workspaces; the system temp dir when `None`.
    pub workspace_root: Option<PathBuf>,
    pub workspace_prefix: String,
    /// Leave the workspace on disk after the run, for debugging.
    pub keep_workspace: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            workspace_root: None,
            workspace_prefix: WORKSPACE_PREFIX.to_string(),
            keep_workspace: false,
        }
    }
}

/// A project snapshot and where its installer should land.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub project: ProjectConfig,
    pub output_dir: PathBuf,
}

impl BuildRequest {
    pub fn new(project: &ProjectConfig, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            project: project.clone(),
            output_dir: output_dir.into(),
        }
    }

    /// Final location of the installer.
    pub fn artifact_path(&self) -> PathBuf {
        self.output_dir.join(self.project.artifact_file_name())
    }
}

/// Summary of a finished run, matching its final [`BuildEvent::Finished`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub success: bool,
    pub message: String,
    /// Installer location on success.
    pub artifact: Option<PathBuf>,
    /// Phase that was active when the run failed.
    pub failed_phase: Option<BuildPhase>,
    pub cancelled: bool,
}

/// Runs installer builds, one at a time.
#[derive(Debug)]
pub struct InstallerBuilder<P: Packager> {
    packager: Arc<P>,
    options: BuildOptions,
    running: Arc<AtomicBool>,
}

impl<P: Packager> InstallerBuilder<P> {
    pub fn new(packager: P, options: BuildOptions) -> Self {
        Self {
            packager: Arc::new(packager),
            options,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Whether a run started by this builder has not finished yet.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Start a build on a background task.
    ///
    /// Must be called from within a tokio runtime. Fails with
    /// [`Error::BuildInProgress`] while a previous run is still active.
    pub fn start(&self, request: BuildRequest) -> Result<BuildHandle> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::BuildInProgress);
        }
        let guard = RunGuard(Arc::clone(&self.running));

        let (tx, rx) = events::channel();
        let sink = EventSink::new(tx);
        let cancel = CancellationToken::new();

        let run = BuildRun {
            packager: Arc::clone(&self.packager),
            options: self.options.clone(),
            request,
            sink,
            cancel: cancel.clone(),
            phase: BuildPhase::Idle,
        };

        let task = tokio::spawn(async move {
            let (report, sink) = run.execute().await;
            drop(guard);
            sink.finished(report.success, report.message.clone());
            report
        });

        Ok(BuildHandle {
            events: rx,
            cancel,
            task,
        })
    }
}

/// Clears the builder's running flag when the run ends, even on panic.
struct RunGuard(Arc<AtomicBool>);

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Caller side of a running build.
#[derive(Debug)]
pub struct BuildHandle {
    events: EventReceiver,
    cancel: CancellationToken,
    task: JoinHandle<BuildReport>,
}

impl BuildHandle {
    /// Next event, or `None` once the run has ended and all events were read.
    pub async fn next_event(&mut self) -> Option<BuildEvent> {
        self.events.recv().await
    }

    /// Request cancellation. Observed between phases, and kills the
    /// packaging tool if it is running.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this run.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the run to end, discarding unread events.
    pub async fn wait(self) -> BuildReport {
        match self.task.await {
            Ok(report) => report,
            Err(e) => BuildReport {
                success: false,
                message: format!("Installer generation failed: build task aborted: {}", e),
                artifact: None,
                failed_phase: None,
                cancelled: e.is_cancelled(),
            },
        }
    }

    /// Wait for the run to end and return every event it emitted.
    pub async fn collect(mut self) -> (Vec<BuildEvent>, BuildReport) {
        let mut collected = Vec::new();
        while let Some(event) = self.events.recv().await {
            collected.push(event);
        }
        let report = self.wait().await;
        (collected, report)
    }
}

/// State of a single run on the worker task.
struct BuildRun<P: Packager> {
    packager: Arc<P>,
    options: BuildOptions,
    request: BuildRequest,
    sink: EventSink,
    cancel: CancellationToken,
    phase: BuildPhase,
}

impl<P: Packager> BuildRun<P> {
    /// Run all phases, clean up, and produce the report. The sink is handed
    /// back so the terminal event is sent after the running flag is cleared.
    async fn execute(mut self) -> (BuildReport, EventSink) {
        self.sink.progress(0, "Starting installer generation...");
        self.sink.log("=== Installer Generation Started ===");

        let mut workspace = None;
        let result = self.run_phases(&mut workspace).await;

        let failed_phase = result.is_err().then_some(self.phase);
        if result.is_err() {
            self.transition(BuildPhase::Failed);
        }

        if let Some(workspace) = workspace {
            self.cleanup(workspace).await;
        }

        let report = match result {
            Ok(artifact) => BuildReport {
                success: true,
                message: artifact.display().to_string(),
                artifact: Some(artifact),
                failed_phase: None,
                cancelled: false,
            },
            Err(e) => {
                let message = format!("Installer generation failed: {}", e);
                self.sink.log(format!("ERROR: {}", message));
                BuildReport {
                    success: false,
                    message,
                    artifact: None,
                    failed_phase,
                    cancelled: e.is_cancelled(),
                }
            }
        };
        (report, self.sink)
    }

    fn transition(&mut self, next: BuildPhase) {
        log::debug!("Build phase: {} -> {}", self.phase, next);
        self.phase = next;
    }

    /// Enter a phase unless the run was cancelled.
    fn enter(&mut self, next: BuildPhase) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled { phase: next });
        }
        self.transition(next);
        Ok(())
    }

    async fn run_phases(&mut self, workspace: &mut Option<ScratchWorkspace>) -> Result<PathBuf> {
        self.enter(BuildPhase::Preparing)?;
        let ws = workspace.insert(self.prepare().await?);

        self.enter(BuildPhase::Scripting)?;
        let source = synthesize_installer_source(&self.request.project)?;
        let script = ws.installer_script();
        fs::write_file(&script, &source).await?;
        self.sink.progress(20, "Generated installer script");
        self.sink.log(format!("Installer script written: {}", script.display()));

        self.enter(BuildPhase::Specifying)?;
        let spec = synthesize_build_spec(&self.request.project)?;
        let spec_file = ws.build_spec();
        fs::write_file(&spec_file, &spec).await?;
        self.sink.progress(35, "Generated PyInstaller spec");

        self.enter(BuildPhase::Packaging)?;
        let invocation = PackagerInvocation {
            workspace: ws.path().to_path_buf(),
            spec_file,
        };
        self.package(invocation).await?;

        self.enter(BuildPhase::Collecting)?;
        let produced = self.collect(&ws.dist_dir()).await?;

        self.enter(BuildPhase::Relocating)?;
        let artifact = self.relocate(&produced).await?;

        if let Some(config) = SignConfig::from_project(&self.request.project) {
            self.enter(BuildPhase::Signing)?;
            self.sink.progress(97, "Signing installer...");
            let hash = sign_file(&artifact, &config).await?;
            self.sink.log(format!("Installer signed (SHA-256: {})", hash));
        }

        self.transition(BuildPhase::Done);
        self.sink.progress(100, "Installer build completed");
        self.sink.log("=== Installer Generation Completed Successfully ===");
        log::info!("Installer ready at {}", artifact.display());
        Ok(artifact)
    }

    async fn prepare(&self) -> Result<ScratchWorkspace> {
        let root = self.options.workspace_root.clone();
        let ws = ScratchWorkspace::create(
            root.clone(),
            self.options.workspace_prefix.clone(),
            self.options.keep_workspace,
        )
        .await
        .fs_context(
            "creating scratch workspace in",
            root.unwrap_or_else(std::env::temp_dir),
        )?;

        self.sink.progress(
            5,
            format!("Created temp directory: {}", ws.path().display()),
        );
        if !self.request.project.onefile {
            self.sink.log(
                "Warning: onefile = false is not supported, building a single-file installer",
            );
        }
        Ok(ws)
    }

    async fn package(&self, invocation: PackagerInvocation) -> Result<()> {
        self.sink.progress(40, "Running PyInstaller...");
        self.sink.log(format!(
            "Running: {}",
            self.packager.describe(&invocation)
        ));

        let output = tokio::select! {
            output = self.packager.package(invocation) => output?,
            _ = self.cancel.cancelled() => {
                return Err(Error::Cancelled { phase: BuildPhase::Packaging });
            }
        };

        self.sink
            .progress(80, "PyInstaller finished, checking output...");
        for line in output.stdout.lines().filter(|l| !l.trim().is_empty()) {
            log::debug!("[{}] {}", self.packager.name(), line);
        }

        if !output.success() {
            self.sink.log(format!(
                "{} stderr: {}",
                self.packager.name(),
                output.stderr
            ));
            return Err(Error::PackagingFailed {
                tool: self.packager.name().to_string(),
                exit_code: output.exit_code,
                stderr: output.stderr,
            });
        }
        Ok(())
    }

    async fn collect(&self, dist: &Path) -> Result<PathBuf> {
        if !fs::is_dir(dist).await {
            return Err(Error::DistNotFound {
                path: dist.to_path_buf(),
            });
        }

        let names = fs::list_dir_names(dist).await?;
        self.sink.log(format!("Files in dist: {:?}", names));

        let mut found = None;
        for path in names.iter().map(|name| dist.join(name)) {
            if is_executable(&path).await {
                found = Some(path);
                break;
            }
        }

        match found {
            Some(path) => {
                self.sink
                    .log(format!("Found generated installer: {}", path.display()));
                Ok(path)
            }
            None => Err(Error::ExecutableNotFound {
                dir: dist.to_path_buf(),
                found: names,
            }),
        }
    }

    async fn relocate(&self, produced: &Path) -> Result<PathBuf> {
        let target = self.request.artifact_path();
        fs::create_dir_all(&self.request.output_dir).await?;
        fs::move_file(produced, &target).await?;

        self.sink
            .log(format!("Installer created → {}", target.display()));
        self.sink
            .progress(95, "Installer file moved to output location");
        Ok(target)
    }

    async fn cleanup(&self, workspace: ScratchWorkspace) {
        let path = workspace.path().to_path_buf();
        match workspace.close().await {
            Ok(Cleanup::Removed(path)) => {
                self.sink
                    .log(format!("Cleaned up temp directory: {}", path.display()));
            }
            Ok(Cleanup::Kept(path)) => {
                self.sink
                    .log(format!("Keeping temp directory: {}", path.display()));
            }
            Err(e) => {
                log::warn!("Could not clean temp directory {}: {}", path.display(), e);
                self.sink
                    .log(format!("Warning: Could not clean temp directory: {}", e));
            }
        }
    }
}

async fn is_executable(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(EXECUTABLE_EXTENSION))
        && fs::is_file(path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_path() {
        let request = BuildRequest::new(&ProjectConfig::new("My App"), "/out");
        assert_eq!(request.artifact_path(), PathBuf::from("/out/My_App_Setup.exe"));
    }

    #[tokio::test]
    async fn test_executable_extension_is_case_insensitive() {
        let dir = tempfile::tempdir().expect("tempdir");
        let upper = dir.path().join("SETUP.EXE");
        std::fs::write(&upper, "MZ").expect("write");
        assert!(is_executable(&upper).await);
        assert!(!is_executable(&dir.path().join("missing.exe")).await);

        let sub = dir.path().join("folder.exe");
        std::fs::create_dir(&sub).expect("mkdir");
        assert!(!is_executable(&sub).await);
    }
}
