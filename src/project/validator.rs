//! Pre-generation project checks.

use crate::project::{NAME_PLACEHOLDER, ProjectConfig};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static VERSION_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+(\.\d+)*$").expect("version format regex is valid")
});

/// Marker written into the output directory to probe writability.
const WRITE_PROBE: &str = ".test_write";

/// Outcome of [`validate`]. Warnings never block generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn summary(&self) -> String {
        match (self.is_valid, self.warnings.len()) {
            (true, 0) => "✅ Project is valid".to_string(),
            (true, n) => format!("⚠️  Project is valid with {} warning(s)", n),
            (false, n) => format!(
                "❌ Project has {} error(s) and {} warning(s)",
                self.errors.len(),
                n
            ),
        }
    }
}

/// Check a project before generation.
///
/// Every rule runs independently. The only side effect is a transient probe
/// file inside an existing output directory.
pub fn validate(project: &ProjectConfig) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if project.name.trim().is_empty() {
        errors.push("Project name is required".to_string());
    }

    if project.version.trim().is_empty() {
        errors.push("Version is required".to_string());
    }

    if project.output_dir.trim().is_empty() {
        errors.push("Output directory is required".to_string());
    } else {
        let output_dir = Path::new(&project.output_dir);
        if output_dir.exists() && !probe_writable(output_dir) {
            errors.push("Output directory is not writable".to_string());
        }
    }

    if !project.icon_path.is_empty() && !Path::new(&project.icon_path).exists() {
        warnings.push(format!("Icon file not found: {}", project.icon_path));
    }

    if project.license_enabled
        && !project.license_file.is_empty()
        && !Path::new(&project.license_file).exists()
    {
        warnings.push(format!("License file not found: {}", project.license_file));
    }

    if project.sign_installer
        && !project.certificate_path.is_empty()
        && !Path::new(&project.certificate_path).exists()
    {
        warnings.push(format!(
            "Certificate file not found: {}",
            project.certificate_path
        ));
    }

    for entry in project.files.iter().filter(|f| !f.is_directory) {
        if !entry.source_exists() {
            warnings.push(format!("File not found: {}", entry.source_path));
        }
    }

    if !project.version.is_empty() && !VERSION_FORMAT.is_match(&project.version) {
        warnings.push(format!(
            "Version format should be like '1.0.0': {}",
            project.version
        ));
    }

    if !project.default_install_dir.is_empty()
        && !project.default_install_dir.contains(NAME_PLACEHOLDER)
    {
        warnings.push(format!(
            "Default install directory should contain {} placeholder",
            NAME_PLACEHOLDER
        ));
    }

    log::debug!(
        "Validated project '{}': {} error(s), {} warning(s)",
        project.name,
        errors.len(),
        warnings.len()
    );

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

fn probe_writable(dir: &Path) -> bool {
    let probe = dir.join(WRITE_PROBE);
    match fs::write(&probe, b"test") {
        Ok(()) => {
            let _ = fs::remove_file(&probe);
            true
        }
        Err(e) => {
            log::debug!("Write probe failed in {}: {}", dir.display(), e);
            false
        }
    }
}
