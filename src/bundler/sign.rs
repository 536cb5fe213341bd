//! Authenticode signing of the relocated installer.
//!
//! Uses `signtool` on Windows and `osslsigncode` elsewhere.

use crate::bundler::{Error, Result};
use crate::project::{ProjectConfig, sha256_file};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Signing parameters taken from the project.
#[derive(Clone)]
pub struct SignConfig {
    pub cert_path: PathBuf,
    pub password: Option<String>,
    pub timestamp_url: Option<String>,
    pub app_name: String,
}

impl std::fmt::Debug for SignConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignConfig")
            .field("cert_path", &self.cert_path)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timestamp_url", &self.timestamp_url)
            .field("app_name", &self.app_name)
            .finish()
    }
}

impl SignConfig {
    /// Signing configuration, or `None` when signing is off or no certificate is set.
    pub fn from_project(project: &ProjectConfig) -> Option<Self> {
        if !project.sign_installer || project.certificate_path.trim().is_empty() {
            return None;
        }
        let non_empty = |s: &str| (!s.trim().is_empty()).then(|| s.to_string());
        Some(Self {
            cert_path: PathBuf::from(&project.certificate_path),
            password: non_empty(&project.certificate_password),
            timestamp_url: non_empty(&project.timestamp_server),
            app_name: project.display_name().to_string(),
        })
    }
}

/// Sign an executable in place and return its SHA-256 digest after signing.
pub async fn sign_file(binary_path: &Path, config: &SignConfig) -> Result<String> {
    log::info!("Signing {} with Authenticode", binary_path.display());

    if cfg!(windows) {
        sign_with_signtool(binary_path, config).await?;
    } else {
        sign_with_osslsigncode(binary_path, config).await?;
    }

    let path = binary_path.to_path_buf();
    let hash = tokio::task::spawn_blocking(move || sha256_file(&path))
        .await
        .map_err(|e| Error::Sign(format!("hash task failed: {}", e)))?
        .map_err(|e| Error::Sign(format!("Hash generation failed: {}", e)))?;

    log::info!(
        "✓ Successfully signed {} (SHA-256: {})",
        binary_path.display(),
        &hash[..16.min(hash.len())]
    );
    Ok(hash)
}

fn locate(tool: &str) -> Result<PathBuf> {
    which::which(tool).map_err(|e| Error::Sign(format!("{} not found: {}", tool, e)))
}

async fn sign_with_signtool(binary_path: &Path, config: &SignConfig) -> Result<()> {
    let signtool = locate("signtool")?;
    let mut cmd = Command::new(&signtool);
    cmd.arg("sign").arg("/fd").arg("sha256").arg("/f").arg(&config.cert_path);
    if let Some(password) = &config.password {
        cmd.arg("/p").arg(password);
    }
    if let Some(url) = &config.timestamp_url {
        cmd.arg("/tr").arg(url).arg("/td").arg("sha256");
    }
    cmd.arg("/d").arg(&config.app_name).arg(binary_path);

    run(cmd, "signtool").await
}

async fn sign_with_osslsigncode(binary_path: &Path, config: &SignConfig) -> Result<()> {
    let osslsigncode = locate("osslsigncode")?;
    let mut signed = binary_path.as_os_str().to_owned();
    signed.push(".signed");
    let signed = PathBuf::from(signed);

    let mut cmd = Command::new(&osslsigncode);
    cmd.arg("sign").arg("-pkcs12").arg(&config.cert_path);
    if let Some(password) = &config.password {
        cmd.arg("-pass").arg(password);
    }
    if let Some(url) = &config.timestamp_url {
        cmd.arg("-t").arg(url);
    }
    cmd.arg("-n")
        .arg(&config.app_name)
        .arg("-in")
        .arg(binary_path)
        .arg("-out")
        .arg(&signed);

    run(cmd, "osslsigncode").await?;
    tokio::fs::rename(&signed, binary_path)
        .await
        .map_err(|e| Error::Sign(format!("replacing unsigned binary: {}", e)))
}

async fn run(mut cmd: Command, tool: &str) -> Result<()> {
    let output = cmd
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|error| Error::CommandFailed {
            command: tool.to_string(),
            error,
        })?;

    if !output.status.success() {
        return Err(Error::Sign(format!(
            "{} exited with {:?}: {}",
            tool,
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_requires_flag_and_certificate() {
        let mut project = ProjectConfig::new("Demo");
        project.certificate_path = "cert.pfx".into();
        assert!(SignConfig::from_project(&project).is_none());

        project.sign_installer = true;
        let config = SignConfig::from_project(&project).expect("config");
        assert_eq!(config.cert_path, PathBuf::from("cert.pfx"));
        assert_eq!(config.password, None);
        assert_eq!(
            config.timestamp_url.as_deref(),
            Some("http://timestamp.digicert.com")
        );

        project.certificate_path = " ".into();
        assert!(SignConfig::from_project(&project).is_none());
    }

    #[test]
    fn test_debug_redacts_password() {
        let mut project = ProjectConfig::new("Demo");
        project.sign_installer = true;
        project.certificate_path = "cert.pfx".into();
        project.certificate_password = "hunter2".into();
        let config = SignConfig::from_project(&project).expect("config");
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
