//! Implements the Forge trait for Gitlab
use async_trait::async_trait;
use gitlab::{
    AsyncGitlab,
    api::{
        AsyncQuery, Pagination,
        common::ProtectedAccessLevel,
        ignore,
        merge_requests::MergeRequestState,
        paged,
        projects::{
            jobs::Job as JobEndpoint,
            merge_requests::MergeRequests,
            protected_branches::{ProtectBranch, UnprotectBranch},
            releases::CreateRelease,
            repository::tags::CreateTag,
        },
        raw,
    },
};
use log::*;
use secrecy::ExposeSecret;

use crate::{
    config::{AccessLevel, BranchProtection},
    error::Result,
    forge::{
        config::RemoteConfig,
        request::{
            CreateTagRequest, Job, ListJobsRequest, ListMergeRequestsRequest,
            ListPipelinesRequest, MergeRequest, Pipeline,
        },
        traits::Forge,
    },
};

pub mod endpoints;
pub mod types;

use endpoints::{EditRelease, JobArtifactFile, RefPipelines, ScopedPipelineJobs};
use types::{JobInfo, MergeRequestInfo};

fn protected_access_level(level: AccessLevel) -> ProtectedAccessLevel {
    match level {
        AccessLevel::NoAccess => ProtectedAccessLevel::NoAccess,
        AccessLevel::Developer => ProtectedAccessLevel::Developer,
        AccessLevel::Maintainer => ProtectedAccessLevel::Maintainer,
        AccessLevel::Admin => ProtectedAccessLevel::Admin,
    }
}

pub struct Gitlab {
    gl: AsyncGitlab,
    project_id: String,
}

impl Gitlab {
    /// Build an authenticated async client for the configured instance.
    pub async fn new(config: RemoteConfig) -> Result<Self> {
        let project_id = config.path.clone();

        let token = config.token.expose_secret();

        let mut builder =
            gitlab::GitlabBuilder::new(config.host_with_port(), token);

        if config.scheme == "http" {
            builder.insecure();
        }

        let gl = builder.build_async().await?;

        Ok(Self { gl, project_id })
    }
}

#[async_trait]
impl Forge for Gitlab {
    fn project_path(&self) -> String {
        self.project_id.clone()
    }

    async fn list_merged_merge_requests(
        &self,
        req: ListMergeRequestsRequest,
    ) -> Result<Vec<MergeRequest>> {
        let mut builder = MergeRequests::builder();

        builder
            .project(&self.project_id)
            .state(MergeRequestState::Merged)
            .target_branch(&req.target_branch);

        if !req.labels.is_empty() {
            builder.labels(req.labels.iter().map(String::as_str));
        }

        if let Some(after) = req.updated_after {
            builder.updated_after(after);
        }

        if let Some(before) = req.updated_before {
            builder.updated_before(before);
        }

        let endpoint = builder.build()?;

        let merge_requests: Vec<MergeRequestInfo> =
            paged(endpoint, Pagination::All)
                .query_async(&self.gl)
                .await?;

        debug!(
            "found {} merged requests targeting {}",
            merge_requests.len(),
            req.target_branch
        );

        merge_requests
            .into_iter()
            .map(MergeRequestInfo::into_merge_request)
            .collect()
    }

    async fn create_tag(&self, req: CreateTagRequest) -> Result<()> {
        let endpoint = CreateTag::builder()
            .project(&self.project_id)
            .tag_name(&req.tag_name)
            .ref_(&req.ref_name)
            .message(&req.message)
            .build()?;

        ignore(endpoint).query_async(&self.gl).await?;

        let endpoint = CreateRelease::builder()
            .project(&self.project_id)
            .tag_name(&req.tag_name)
            .name(&req.tag_name)
            .description(&req.release_description)
            .build()?;

        ignore(endpoint).query_async(&self.gl).await?;

        Ok(())
    }

    async fn update_release_notes(&self, tag: &str, notes: &str) -> Result<()> {
        let endpoint = EditRelease::builder()
            .project(self.project_id.as_str())
            .tag_name(tag)
            .description(notes)
            .build()?;

        ignore(endpoint).query_async(&self.gl).await?;

        Ok(())
    }

    async fn unprotect_branch(&self, branch: &str) -> Result<()> {
        let endpoint = UnprotectBranch::builder()
            .project(&self.project_id)
            .name(branch)
            .build()?;

        ignore(endpoint).query_async(&self.gl).await?;

        Ok(())
    }

    async fn protect_branch(&self, policy: &BranchProtection) -> Result<()> {
        let endpoint = ProtectBranch::builder()
            .project(&self.project_id)
            .name(&policy.name)
            .push_access_level(protected_access_level(
                policy.push_access_level,
            ))
            .merge_access_level(protected_access_level(
                policy.merge_access_level,
            ))
            .code_owner_approval_required(policy.code_owner_approval_required)
            .build()?;

        ignore(endpoint).query_async(&self.gl).await?;

        Ok(())
    }

    async fn list_pipelines(
        &self,
        req: ListPipelinesRequest,
    ) -> Result<Vec<Pipeline>> {
        let mut builder = RefPipelines::builder();

        builder
            .project(self.project_id.as_str())
            .ref_name(req.ref_name.as_str());

        if let Some(name) = req.name.as_deref() {
            builder.name(name);
        }

        let endpoint = builder.build()?;

        let pipelines: Vec<Pipeline> = endpoint.query_async(&self.gl).await?;

        Ok(pipelines)
    }

    async fn list_pipeline_jobs(
        &self,
        req: ListJobsRequest,
    ) -> Result<Vec<Job>> {
        let scopes = req
            .scopes
            .iter()
            .map(|s| s.as_ref().to_string())
            .collect::<Vec<String>>();

        let endpoint = ScopedPipelineJobs::builder()
            .project(self.project_id.as_str())
            .pipeline(req.pipeline_id)
            .scopes(scopes)
            .build()?;

        let jobs: Vec<JobInfo> = endpoint.query_async(&self.gl).await?;

        Ok(jobs.into_iter().map(Job::from).collect())
    }

    async fn get_job(&self, job_id: u64) -> Result<Job> {
        let endpoint = JobEndpoint::builder()
            .project(&self.project_id)
            .job(job_id)
            .build()?;

        let job: JobInfo = endpoint.query_async(&self.gl).await?;

        Ok(Job::from(job))
    }

    async fn download_job_artifact(
        &self,
        job_id: u64,
        path: &str,
    ) -> Result<Vec<u8>> {
        let endpoint = JobArtifactFile::builder()
            .project(self.project_id.as_str())
            .job(job_id)
            .artifact_path(path)
            .build()?;

        let content = raw(endpoint).query_async(&self.gl).await?;

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_access_levels() {
        assert!(matches!(
            protected_access_level(AccessLevel::NoAccess),
            ProtectedAccessLevel::NoAccess
        ));
        assert!(matches!(
            protected_access_level(AccessLevel::Developer),
            ProtectedAccessLevel::Developer
        ));
        assert!(matches!(
            protected_access_level(AccessLevel::Maintainer),
            ProtectedAccessLevel::Maintainer
        ));
        assert!(matches!(
            protected_access_level(AccessLevel::Admin),
            ProtectedAccessLevel::Admin
        ));
    }
}
