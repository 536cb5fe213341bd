//! Files deployed by the installer.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

/// Number of leading bytes inspected when sniffing for binary content.
const BINARY_SNIFF_LEN: usize = 1024;

/// A file (or directory) copied into the install root.
///
/// `hash` is computed once by [`FileEntry::new`] and never refreshed. It goes
/// stale as soon as the source changes, so it is informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path of the file on the authoring machine.
    pub source_path: String,
    /// Destination relative to the install root.
    pub install_path: String,
    /// Content contains NUL bytes.
    #[serde(default)]
    pub is_binary: bool,
    /// Source is a directory copied recursively.
    #[serde(default)]
    pub is_directory: bool,
    /// Compress when bundling.
    #[serde(default = "default_true")]
    pub compress: bool,
    /// SHA-256 hex digest at creation time, empty for directories or missing sources.
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
}

fn default_true() -> bool {
    true
}

impl FileEntry {
    /// Create an entry from an existing source, sniffing its type and hashing it.
    ///
    /// A missing source yields an entry with empty `hash`; the validator reports it.
    pub fn new(source_path: impl Into<String>, install_path: impl Into<String>) -> Self {
        let source_path = source_path.into();
        let path = Path::new(&source_path);
        let is_directory = path.is_dir();
        let (is_binary, hash) = if is_directory || !path.exists() {
            (false, String::new())
        } else {
            (is_binary_file(path), sha256_file(path).unwrap_or_default())
        };

        Self {
            source_path,
            install_path: install_path.into(),
            is_binary,
            is_directory,
            compress: true,
            hash,
            version: String::new(),
            description: String::new(),
        }
    }

    /// Create a directory entry without touching the filesystem.
    pub fn directory(source_path: impl Into<String>, install_path: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            install_path: install_path.into(),
            is_binary: false,
            is_directory: true,
            compress: true,
            hash: String::new(),
            version: String::new(),
            description: String::new(),
        }
    }

    /// Whether the source currently exists on disk.
    pub fn source_exists(&self) -> bool {
        Path::new(&self.source_path).exists()
    }
}

/// Returns true if the first kilobyte of the file contains a NUL byte.
pub fn is_binary_file(path: &Path) -> bool {
    let Ok(mut file) = std::fs::File::open(path) else {
        return false;
    };
    let mut chunk = [0u8; BINARY_SNIFF_LEN];
    match file.read(&mut chunk) {
        Ok(n) => chunk[..n].contains(&0),
        Err(_) => false,
    }
}

/// Hex-encoded SHA-256 digest of a file, read in 8KB chunks.
pub fn sha256_file(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_hashes_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("data.txt");
        std::fs::write(&source, b"hello").expect("write");

        let entry = FileEntry::new(source.to_string_lossy(), "app/data.txt");
        assert_eq!(
            entry.hash,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert!(!entry.is_binary);
        assert!(!entry.is_directory);
    }

    #[test]
    fn test_new_detects_binary_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("blob.bin");
        std::fs::write(&source, [0x4d, 0x5a, 0x00, 0x01]).expect("write");

        let entry = FileEntry::new(source.to_string_lossy(), "blob.bin");
        assert!(entry.is_binary);
    }

    #[test]
    fn test_missing_source_and_directory_have_no_hash() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = FileEntry::new(dir.path().join("nope").to_string_lossy(), "nope");
        assert!(missing.hash.is_empty());

        let folder = FileEntry::new(dir.path().to_string_lossy(), "assets");
        assert!(folder.is_directory);
        assert!(folder.hash.is_empty());
    }

    #[test]
    fn test_hash_is_not_recomputed_after_edit() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("data.txt");
        std::fs::write(&source, b"hello").expect("write");
        let entry = FileEntry::new(source.to_string_lossy(), "data.txt");

        std::fs::write(&source, b"changed").expect("rewrite");
        let reloaded: FileEntry =
            serde_json::from_str(&serde_json::to_string(&entry).expect("ser")).expect("de");
        assert_eq!(reloaded.hash, entry.hash);
    }
}
