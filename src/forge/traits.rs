//! Traits related to the remote git forge
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{
    config::BranchProtection,
    error::Result,
    forge::request::{
        CreateTagRequest, Job, ListJobsRequest, ListMergeRequestsRequest,
        ListPipelinesRequest, MergeRequest, Pipeline,
    },
};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Forge: Send + Sync {
    fn project_path(&self) -> String;
    async fn list_merged_merge_requests(
        &self,
        req: ListMergeRequestsRequest,
    ) -> Result<Vec<MergeRequest>>;
    async fn create_tag(&self, req: CreateTagRequest) -> Result<()>;
    async fn update_release_notes(&self, tag: &str, notes: &str) -> Result<()>;
    async fn unprotect_branch(&self, branch: &str) -> Result<()>;
    async fn protect_branch(&self, policy: &BranchProtection) -> Result<()>;
    async fn list_pipelines(
        &self,
        req: ListPipelinesRequest,
    ) -> Result<Vec<Pipeline>>;
    async fn list_pipeline_jobs(&self, req: ListJobsRequest)
    -> Result<Vec<Job>>;
    async fn get_job(&self, job_id: u64) -> Result<Job>;
    async fn download_job_artifact(
        &self,
        job_id: u64,
        path: &str,
    ) -> Result<Vec<u8>>;
}
