//! File system utilities for collecting and relocating build output.

use crate::bundler::error::{ErrorExt, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Creates all of the directories of the specified path if missing.
pub async fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Writes a text file, replacing any existing content.
pub async fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents.as_bytes())
        .await
        .fs_context("writing file", path)
}

/// Lists the entry names of a directory, sorted.
pub async fn list_dir_names(dir: &Path) -> Result<Vec<String>> {
    let mut entries = fs::read_dir(dir).await.fs_context("reading directory", dir)?;
    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .fs_context("reading directory", dir)?
    {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

/// Whether `path` is an existing regular file.
pub async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_file())
}

/// Whether `path` is an existing directory.
pub async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

/// Moves a regular file, replacing the destination.
///
/// Falls back to copying into a sibling `.partial` file and renaming that over
/// the destination when a direct rename is not possible, e.g. across file
/// systems. An existing destination is only replaced once the new file is
/// complete.
pub async fn move_file(from: &Path, to: &Path) -> Result<()> {
    if !is_file(from).await {
        return Err(crate::bundler::error::Error::GenericError(format!(
            "{from:?} is not a file"
        )));
    }
    if let Some(dest_dir) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(dest_dir).await?;
    }

    let Err(e) = fs::rename(from, to).await else {
        return Ok(());
    };
    log::debug!(
        "rename {} -> {} failed ({}), copying instead",
        from.display(),
        to.display(),
        e
    );

    let mut partial = to.as_os_str().to_owned();
    partial.push(".partial");
    let partial = PathBuf::from(partial);

    let copied = match fs::copy(from, &partial).await {
        Ok(_) => fs::rename(&partial, to).await,
        Err(e) => Err(e),
    };
    if let Err(e) = copied {
        let _ = fs::remove_file(&partial).await;
        return Err::<(), _>(e).fs_context("copying file", to);
    }

    fs::remove_file(from)
        .await
        .fs_context("removing moved file", from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_move_file_overwrites() {
        let dir = tempfile::tempdir().expect("tempdir");
        let from = dir.path().join("a.exe");
        let to = dir.path().join("out").join("b.exe");
        std::fs::write(&from, "new").expect("write");
        std::fs::create_dir_all(to.parent().expect("parent")).expect("mkdir");
        std::fs::write(&to, "old").expect("write");

        move_file(&from, &to).await.expect("move");
        assert!(!from.exists());
        assert_eq!(std::fs::read_to_string(&to).expect("read"), "new");
    }

    #[tokio::test]
    async fn test_failed_move_keeps_source_and_target() {
        let dir = tempfile::tempdir().expect("tempdir");
        let from = dir.path().join("a.exe");
        std::fs::write(&from, "new").expect("write");
        // A non-empty directory cannot be replaced by a file.
        let to = dir.path().join("b.exe");
        std::fs::create_dir(&to).expect("mkdir");
        std::fs::write(to.join("keep"), "old").expect("write");

        assert!(move_file(&from, &to).await.is_err());
        assert_eq!(std::fs::read_to_string(&from).expect("source"), "new");
        assert_eq!(std::fs::read_to_string(to.join("keep")).expect("target"), "old");
        assert!(!dir.path().join("b.exe.partial").exists());
    }

    #[tokio::test]
    async fn test_list_dir_names_sorted() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["b.txt", "a.exe", "c"] {
            std::fs::write(dir.path().join(name), "").expect("write");
        }
        assert_eq!(
            list_dir_names(dir.path()).await.expect("list"),
            ["a.exe", "b.txt", "c"]
        );
    }
}
