//! Configuration loading and parsing for `release-builder.toml` files.
//!
//! Every section falls back to its defaults so an absent or partial file
//! still describes a complete release run.
use serde::Deserialize;
use std::{path::Path, time::Duration};
use tokio::fs;

use crate::{
    error::{ReleaseBuilderError, Result},
    poll::PollPolicy,
};

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "release-builder.toml";
/// Default label marking the merge request that bumps the version.
pub const DEFAULT_RELEASE_LABEL: &str = "Version Update";

/// Access level granted on a protected branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessLevel {
    NoAccess,
    Developer,
    Maintainer,
    Admin,
}

/// Protection policy applied to a single branch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BranchProtection {
    /// Branch name or wildcard.
    pub name: String,
    /// Who may push directly.
    pub push_access_level: AccessLevel,
    /// Who may merge.
    pub merge_access_level: AccessLevel,
    /// Whether code owners must approve merges.
    #[serde(default)]
    pub code_owner_approval_required: bool,
}

impl BranchProtection {
    pub fn new(
        name: &str,
        push_access_level: AccessLevel,
        merge_access_level: AccessLevel,
        code_owner_approval_required: bool,
    ) -> Self {
        Self {
            name: name.into(),
            push_access_level,
            merge_access_level,
            code_owner_approval_required,
        }
    }
}

/// One protection phase: branches to unprotect first, then policies to
/// apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProtectionPhase {
    pub unprotect: Vec<String>,
    pub protect: Vec<BranchProtection>,
}

/// Branch protection used while the release runs and once it is done.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProtectionConfig {
    /// Applied before anything else; locks the integration branch.
    pub lock: ProtectionPhase,
    /// Applied at the end; restores normal merge access.
    pub restore: ProtectionPhase,
}

impl Default for ProtectionConfig {
    fn default() -> Self {
        Self {
            lock: ProtectionPhase {
                unprotect: vec!["test-develop".into(), "test-master".into()],
                protect: vec![BranchProtection::new(
                    "test-develop",
                    AccessLevel::NoAccess,
                    AccessLevel::NoAccess,
                    false,
                )],
            },
            restore: ProtectionPhase {
                unprotect: vec!["test-develop".into()],
                protect: vec![
                    BranchProtection::new(
                        "test-master",
                        AccessLevel::NoAccess,
                        AccessLevel::Maintainer,
                        true,
                    ),
                    BranchProtection::new(
                        "test-develop",
                        AccessLevel::NoAccess,
                        AccessLevel::Maintainer,
                        false,
                    ),
                ],
            },
        }
    }
}

/// Release tag settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TagConfig {
    /// Prepended to the package version to form the tag name.
    pub prefix: String,
    /// Branch or sha the tag points at.
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// Annotated tag message.
    pub message: String,
    /// Release description used until the release note is ready.
    pub release_description: String,
    /// Pause before tagging so the pushed branch replicates upstream.
    pub delay_secs: u64,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            prefix: "test-".into(),
            ref_name: "test-master".into(),
            message: "test message".into(),
            release_description: "test release".into(),
            delay_secs: 10,
        }
    }
}

/// Release note settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReleaseNotesConfig {
    /// Label carried by the merge requests that bound a release.
    pub label: String,
    /// Branch the merge requests target.
    pub target_branch: String,
}

impl Default for ReleaseNotesConfig {
    fn default() -> Self {
        Self {
            label: DEFAULT_RELEASE_LABEL.into(),
            target_branch: "develop".into(),
        }
    }
}

/// Pipeline lookup settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Optional pipeline name filter.
    pub name: Option<String>,
    pub poll_interval_secs: u64,
    pub max_attempts: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: Some("bo.dai".into()),
            poll_interval_secs: 3,
            max_attempts: 200,
        }
    }
}

/// Job selection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Stage name, compared case-insensitively.
    pub stage: String,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            stage: "prepare".into(),
        }
    }
}

/// Build artifact settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Path of the JSON file inside the job's artifacts archive.
    pub path: String,
    pub poll_interval_secs: u64,
    pub max_attempts: u32,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            path: "dist/build-info.json".into(),
            poll_interval_secs: 10,
            max_attempts: 360,
        }
    }
}

/// Root configuration structure for `release-builder.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON descriptor holding the package `version`.
    pub package_file: String,
    /// Script that pushes the release branch to its remote.
    pub push_script: String,
    pub tag: TagConfig,
    pub release_notes: ReleaseNotesConfig,
    pub pipeline: PipelineConfig,
    pub job: JobConfig,
    pub artifact: ArtifactConfig,
    pub protection: ProtectionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            package_file: "bronx/client/package.json".into(),
            push_script: "push-master.sh".into(),
            tag: TagConfig::default(),
            release_notes: ReleaseNotesConfig::default(),
            pipeline: PipelineConfig::default(),
            job: JobConfig::default(),
            artifact: ArtifactConfig::default(),
            protection: ProtectionConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, using defaults when the file does not
    /// exist.
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!(
                "configuration file {} not found: using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Reject values that would make a run meaningless or unbounded.
    pub fn validate(&self) -> Result<()> {
        if self.tag.prefix.is_empty() {
            return Err(ReleaseBuilderError::invalid_config(
                "tag.prefix must not be empty",
            ));
        }

        if self.pipeline.max_attempts == 0 {
            return Err(ReleaseBuilderError::invalid_config(
                "pipeline.max_attempts must be at least 1",
            ));
        }

        if self.artifact.max_attempts == 0 {
            return Err(ReleaseBuilderError::invalid_config(
                "artifact.max_attempts must be at least 1",
            ));
        }

        if self.artifact.path.is_empty() {
            return Err(ReleaseBuilderError::invalid_config(
                "artifact.path must not be empty",
            ));
        }

        Ok(())
    }

    /// Tag name for a package version.
    pub fn tag_name(&self, package_version: &str) -> String {
        format!("{}{}", self.tag.prefix, package_version)
    }

    pub fn tag_delay(&self) -> Duration {
        Duration::from_secs(self.tag.delay_secs)
    }

    pub fn pipeline_poll_policy(&self) -> PollPolicy {
        PollPolicy::new(
            Duration::from_secs(self.pipeline.poll_interval_secs),
            self.pipeline.max_attempts,
        )
    }

    pub fn artifact_poll_policy(&self) -> PollPolicy {
        PollPolicy::new(
            Duration::from_secs(self.artifact.poll_interval_secs),
            self.artifact.max_attempts,
        )
    }
}
