//! Scratch workspace owned by a single build run.

use crate::bundler::synth::{BUILD_SPEC_NAME, INSTALLER_SCRIPT_NAME};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Conventional PyInstaller output directory name.
pub const DIST_DIR_NAME: &str = "dist";

/// Result of closing a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cleanup {
    Removed(PathBuf),
    Kept(PathBuf),
}

/// Uniquely named temporary directory holding the synthesized sources and
/// the packaging tool's output.
///
/// Dropping the workspace removes it silently; [`ScratchWorkspace::close`]
/// reports removal failures instead.
#[derive(Debug)]
pub struct ScratchWorkspace {
    dir: TempDir,
    keep: bool,
}

impl ScratchWorkspace {
    /// Create a fresh workspace named `<prefix><random>` under `root`, or the
    /// system temp dir when `root` is `None`.
    pub async fn create(root: Option<PathBuf>, prefix: String, keep: bool) -> io::Result<Self> {
        tokio::task::spawn_blocking(move || -> io::Result<Self> {
            let mut builder = tempfile::Builder::new();
            builder.prefix(&prefix);
            let dir = match root {
                Some(root) => {
                    std::fs::create_dir_all(&root)?;
                    builder.tempdir_in(root)?
                }
                None => builder.tempdir()?,
            };
            Ok(Self { dir, keep })
        })
        .await
        .map_err(io::Error::other)?
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn installer_script(&self) -> PathBuf {
        self.path().join(INSTALLER_SCRIPT_NAME)
    }

    pub fn build_spec(&self) -> PathBuf {
        self.path().join(BUILD_SPEC_NAME)
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.path().join(DIST_DIR_NAME)
    }

    /// Remove the workspace, or leave it on disk when it was created with `keep`.
    pub async fn close(self) -> io::Result<Cleanup> {
        if self.keep {
            return Ok(Cleanup::Kept(self.dir.keep()));
        }
        tokio::task::spawn_blocking(move || -> io::Result<Cleanup> {
            let path = self.dir.path().to_path_buf();
            self.dir.close()?;
            Ok(Cleanup::Removed(path))
        })
        .await
        .map_err(io::Error::other)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_workspace_is_prefixed_and_removed() {
        let root = tempfile::tempdir().expect("root");
        let ws = ScratchWorkspace::create(Some(root.path().to_path_buf()), "instgen_".into(), false)
            .await
            .expect("create");
        let path = ws.path().to_path_buf();
        assert!(
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("instgen_"))
        );
        assert_eq!(ws.dist_dir(), path.join("dist"));

        assert_eq!(ws.close().await.expect("close"), Cleanup::Removed(path.clone()));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_kept_workspace_survives_close() {
        let root = tempfile::tempdir().expect("root");
        let ws = ScratchWorkspace::create(Some(root.path().to_path_buf()), "instgen_".into(), true)
            .await
            .expect("create");
        let path = ws.path().to_path_buf();
        assert_eq!(ws.close().await.expect("close"), Cleanup::Kept(path.clone()));
        assert!(path.is_dir());
    }
}
