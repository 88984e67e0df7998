//! Manager that wraps the forge implementation
use log::*;

use crate::{
    config::BranchProtection,
    error::Result,
    forge::{
        request::{
            CreateTagRequest, Job, ListJobsRequest, ListMergeRequestsRequest,
            ListPipelinesRequest, MergeRequest, Pipeline,
        },
        traits::Forge,
    },
};

/// Options that change how the manager forwards calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForgeOptions {
    /// Log mutating calls instead of sending them.
    pub dry_run: bool,
}

pub struct ForgeManager {
    forge: Box<dyn Forge>,
    options: ForgeOptions,
}

impl ForgeManager {
    pub fn new(forge: Box<dyn Forge>, options: ForgeOptions) -> Self {
        Self { forge, options }
    }

    pub fn dry_run(&self) -> bool {
        self.options.dry_run
    }

    pub fn project_path(&self) -> String {
        self.forge.project_path()
    }

    pub async fn list_merged_merge_requests(
        &self,
        req: ListMergeRequestsRequest,
    ) -> Result<Vec<MergeRequest>> {
        debug!("listing merged requests: {:?}", req);
        self.forge.list_merged_merge_requests(req).await
    }

    pub async fn create_tag(&self, req: CreateTagRequest) -> Result<()> {
        if self.options.dry_run {
            warn!("dry_run: would create tag: req: {:#?}", req);
            return Ok(());
        }
        self.forge.create_tag(req).await
    }

    pub async fn update_release_notes(
        &self,
        tag: &str,
        notes: &str,
    ) -> Result<()> {
        if self.options.dry_run {
            warn!("dry_run: would update release notes: tag: {tag}, notes: {notes}");
            return Ok(());
        }
        self.forge.update_release_notes(tag, notes).await
    }

    pub async fn unprotect_branch(&self, branch: &str) -> Result<()> {
        if self.options.dry_run {
            warn!("dry_run: would unprotect branch: {branch}");
            return Ok(());
        }
        self.forge.unprotect_branch(branch).await
    }

    pub async fn protect_branch(&self, policy: &BranchProtection) -> Result<()> {
        if self.options.dry_run {
            warn!("dry_run: would protect branch: policy: {:#?}", policy);
            return Ok(());
        }
        self.forge.protect_branch(policy).await
    }

    pub async fn list_pipelines(
        &self,
        req: ListPipelinesRequest,
    ) -> Result<Vec<Pipeline>> {
        debug!("listing pipelines: {:?}", req);
        self.forge.list_pipelines(req).await
    }

    pub async fn list_pipeline_jobs(
        &self,
        req: ListJobsRequest,
    ) -> Result<Vec<Job>> {
        debug!("listing pipeline jobs: {:?}", req);
        self.forge.list_pipeline_jobs(req).await
    }

    pub async fn get_job(&self, job_id: u64) -> Result<Job> {
        self.forge.get_job(job_id).await
    }

    pub async fn download_job_artifact(
        &self,
        job_id: u64,
        path: &str,
    ) -> Result<Vec<u8>> {
        debug!("downloading artifact {path} from job {job_id}");
        self.forge.download_job_artifact(job_id, path).await
    }
}
