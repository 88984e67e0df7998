//! Custom error types for release-builder.

use thiserror::Error;

/// Main error type for release-builder operations.
#[derive(Error, Debug)]
pub enum ReleaseBuilderError {
    // Cli args errors
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Forge errors
    #[error("Forge operation failed: {0}")]
    ForgeError(String),

    #[error(
        "Expected at least two merged requests labeled '{label}' on '{branch}' to bound the release, found {found}"
    )]
    MissingReleaseBoundary {
        label: String,
        branch: String,
        found: usize,
    },

    #[error("Timed out waiting for {target} after {attempts} attempts")]
    PollTimeout { target: String, attempts: u32 },

    #[error("Job {job_id} finished with status '{status}'")]
    JobFailed { job_id: u64, status: String },

    // Local collaborator errors
    #[error("Push script '{script}' exited with {code}: {stderr}")]
    PushScriptFailed {
        script: String,
        code: String,
        stderr: String,
    },

    #[error("Package descriptor '{path}' is unusable: {reason}")]
    InvalidPackageDescriptor { path: String, reason: String },

    #[error("Git URL parse error: {0}")]
    GitUrlError(#[from] git_url_parse::GitUrlParseError),

    // Version/parsing errors - automatic conversions via #[from]
    #[error("Invalid version format: {0}")]
    InvalidVersion(#[from] semver::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Datetime parse error: {0}")]
    ChronoParseError(#[from] chrono::ParseError),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),

    // Generic wrapper for other errors
    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using ReleaseBuilderError
pub type Result<T> = std::result::Result<T, ReleaseBuilderError>;

impl ReleaseBuilderError {
    /// Create a forge error with context
    pub fn forge(msg: impl Into<String>) -> Self {
        Self::ForgeError(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a poll timeout error
    pub fn poll_timeout(target: impl Into<String>, attempts: u32) -> Self {
        Self::PollTimeout {
            target: target.into(),
            attempts,
        }
    }

    /// Create an invalid package descriptor error
    pub fn invalid_descriptor(
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidPackageDescriptor {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

// Implement From for std::io::Error - wraps in Other variant for generic I/O errors
impl From<std::io::Error> for ReleaseBuilderError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(color_eyre::Report::from(err))
    }
}

// Implement From for gitlab errors
impl From<gitlab::api::ApiError<gitlab::RestError>> for ReleaseBuilderError {
    fn from(err: gitlab::api::ApiError<gitlab::RestError>) -> Self {
        Self::ForgeError(format!("GitLab API error: {}", err))
    }
}

impl From<gitlab::GitlabError> for ReleaseBuilderError {
    fn from(err: gitlab::GitlabError) -> Self {
        Self::ForgeError(format!("GitLab error: {}", err))
    }
}

// Endpoint builder errors from derive_builder, both from the gitlab crate
// and from the endpoints defined in forge::gitlab::endpoints

macro_rules! builder_error {
    ($($err:path),+ $(,)?) => {
        $(
            impl From<$err> for ReleaseBuilderError {
                fn from(err: $err) -> Self {
                    Self::Other(color_eyre::Report::msg(format!(
                        "Builder error: {}",
                        err
                    )))
                }
            }
        )+
    };
}

builder_error!(
    gitlab::api::projects::merge_requests::MergeRequestsBuilderError,
    gitlab::api::projects::repository::tags::CreateTagBuilderError,
    gitlab::api::projects::releases::CreateReleaseBuilderError,
    gitlab::api::projects::protected_branches::ProtectBranchBuilderError,
    gitlab::api::projects::protected_branches::UnprotectBranchBuilderError,
    gitlab::api::projects::jobs::JobBuilderError,
    crate::forge::gitlab::endpoints::RefPipelinesBuilderError,
    crate::forge::gitlab::endpoints::ScopedPipelineJobsBuilderError,
    crate::forge::gitlab::endpoints::EditReleaseBuilderError,
    crate::forge::gitlab::endpoints::JobArtifactFileBuilderError,
);
