//! Local collaborators that provide the version being released.
use async_trait::async_trait;
use log::*;
#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use std::{path::PathBuf, process::Stdio};
use tokio::{fs, process::Command};

use crate::error::{ReleaseBuilderError, Result};

#[derive(Debug, Deserialize)]
struct PackageInfo {
    version: Option<String>,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait VersionSource: Send + Sync {
    /// Push the release branch to its remote.
    async fn push_release_branch(&self) -> Result<()>;
    /// Read the semantic version from the package descriptor.
    async fn read_package_version(&self) -> Result<String>;
}

/// Runs the push script through `bash` and reads a JSON package descriptor,
/// both relative to the working directory.
pub struct LocalVersionSource {
    package_file: PathBuf,
    push_script: PathBuf,
}

impl LocalVersionSource {
    pub fn new(
        package_file: impl Into<PathBuf>,
        push_script: impl Into<PathBuf>,
    ) -> Self {
        Self {
            package_file: package_file.into(),
            push_script: push_script.into(),
        }
    }
}

#[async_trait]
impl VersionSource for LocalVersionSource {
    async fn push_release_branch(&self) -> Result<()> {
        info!("running push script: {}", self.push_script.display());

        let output = Command::new("bash")
            .arg(&self.push_script)
            .stdin(Stdio::null())
            .output()
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            info!("push script output:\n{}", stdout.trim_end());
        }

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map(|c| format!("exit code {c}"))
                .unwrap_or_else(|| "a signal".to_string());

            return Err(ReleaseBuilderError::PushScriptFailed {
                script: self.push_script.display().to_string(),
                code,
                stderr: String::from_utf8_lossy(&output.stderr)
                    .trim()
                    .to_string(),
            });
        }

        Ok(())
    }

    async fn read_package_version(&self) -> Result<String> {
        let path = self.package_file.display().to_string();

        debug!("reading package version from {path}");

        let content = fs::read_to_string(&self.package_file)
            .await
            .map_err(|err| {
                ReleaseBuilderError::invalid_descriptor(&path, err.to_string())
            })?;

        let info: PackageInfo = serde_json::from_str(&content).map_err(|err| {
            ReleaseBuilderError::invalid_descriptor(&path, err.to_string())
        })?;

        let version = info.version.ok_or_else(|| {
            ReleaseBuilderError::invalid_descriptor(&path, "missing version field")
        })?;

        semver::Version::parse(&version)?;

        Ok(version)
    }
}
