use chrono::{DateTime, Utc};
use serde::Deserialize;
use strum::{AsRefStr, Display, EnumString};

#[derive(Debug, Clone, PartialEq, Eq)]
/// A merged request as seen by release note composition.
pub struct MergeRequest {
    pub iid: u64,
    pub title: String,
    pub merged_at: Option<DateTime<Utc>>,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Request to list merged requests targeting a branch.
pub struct ListMergeRequestsRequest {
    pub target_branch: String,
    /// Only requests carrying all of these labels.
    pub labels: Vec<String>,
    pub updated_after: Option<DateTime<Utc>>,
    pub updated_before: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to create a tag and its release.
pub struct CreateTagRequest {
    pub tag_name: String,
    /// Branch or sha the tag points at.
    pub ref_name: String,
    pub message: String,
    pub release_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to list pipelines for a ref.
pub struct ListPipelinesRequest {
    pub ref_name: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
/// A CI pipeline.
pub struct Pipeline {
    pub id: u64,
}

/// Status of a CI job.
#[derive(Debug, Clone, PartialEq, Eq, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    Created,
    Pending,
    Running,
    Success,
    Failed,
    Canceled,
    Skipped,
    Manual,
    WaitingForResource,
    Preparing,
    Scheduled,
    #[strum(default)]
    Unknown(String),
}

impl JobStatus {
    /// Whether the job stopped without succeeding.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Canceled | Self::Skipped)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to list the jobs of a pipeline in the given states.
pub struct ListJobsRequest {
    pub pipeline_id: u64,
    pub scopes: Vec<JobStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A CI job.
pub struct Job {
    pub id: u64,
    pub name: String,
    pub stage: String,
    pub status: JobStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// Build information published by the release job.
pub struct Artifact {
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn job_status_parses_gitlab_values() {
        assert_eq!(JobStatus::from_str("success").unwrap(), JobStatus::Success);
        assert_eq!(
            JobStatus::from_str("waiting_for_resource").unwrap(),
            JobStatus::WaitingForResource
        );
        assert_eq!(
            JobStatus::from_str("something_new").unwrap(),
            JobStatus::Unknown("something_new".into())
        );
    }

    #[test]
    fn job_status_formats_as_gitlab_values() {
        assert_eq!(JobStatus::Running.as_ref(), "running");
        assert_eq!(JobStatus::Canceled.to_string(), "canceled");
    }

    #[test]
    fn only_stopped_jobs_are_failures() {
        assert!(JobStatus::Failed.is_failure());
        assert!(JobStatus::Canceled.is_failure());
        assert!(JobStatus::Skipped.is_failure());
        assert!(!JobStatus::Pending.is_failure());
        assert!(!JobStatus::Success.is_failure());
    }

    #[test]
    fn artifact_ignores_extra_fields() {
        let artifact: Artifact = serde_json::from_str(
            r#"{"version": "2.3.0+42", "commit": "abc123"}"#,
        )
        .unwrap();
        assert_eq!(artifact.version, "2.3.0+42");
    }
}
