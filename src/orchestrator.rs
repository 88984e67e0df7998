//! Drives a release from branch lock to published release note.
//!
//! The run is a fixed sequence of steps. The only concurrent work is the
//! release note, which is composed on a separate task as soon as the run
//! starts and joined right before the tag's release description is updated.
use derive_builder::Builder;
use log::*;
use std::sync::Arc;
use tokio::{task::JoinHandle, time::sleep};

use crate::{
    config::{Config, ProtectionPhase},
    error::{ReleaseBuilderError, Result},
    forge::{
        manager::ForgeManager,
        request::{
            Artifact, CreateTagRequest, JobStatus, ListJobsRequest,
            ListPipelinesRequest,
        },
    },
    poll::{PollOutcome, poll_until},
    release_notes,
    version_source::VersionSource,
};

/// Identifiers produced by a completed release run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseRun {
    /// Version read from the package descriptor.
    pub package_version: String,
    /// Tag created for the release.
    pub tag_name: String,
    /// Release note published on the tag; empty when it could not be built.
    pub release_note: String,
    /// Version reported by the build artifact.
    pub release_version: String,
    pub pipeline_id: u64,
    pub job_id: u64,
}

#[derive(Builder)]
#[builder(setter(into), build_fn(private, name = "_build"))]
pub struct OrchestratorParams {
    pub config: Arc<Config>,
    pub forge: Arc<ForgeManager>,
    pub version_source: Arc<dyn VersionSource>,
}

impl OrchestratorParamsBuilder {
    pub fn build(&self) -> Result<Orchestrator> {
        let params = self._build().map_err(|e| {
            ReleaseBuilderError::invalid_config(format!(
                "Failed to build release orchestrator: {}",
                e
            ))
        })?;
        Ok(Orchestrator::new(params))
    }
}

pub struct Orchestrator {
    config: Arc<Config>,
    forge: Arc<ForgeManager>,
    version_source: Arc<dyn VersionSource>,
}

impl Orchestrator {
    pub fn builder() -> OrchestratorParamsBuilder {
        OrchestratorParamsBuilder::default()
    }

    pub fn new(params: OrchestratorParams) -> Self {
        Self {
            config: params.config,
            forge: params.forge,
            version_source: params.version_source,
        }
    }

    /// Execute the full release. Any error aborts the run where it happened;
    /// branch protection and tags are left as they were at that point.
    pub async fn run(&self) -> Result<ReleaseRun> {
        info!("starting release for {}", self.forge.project_path());

        let note_task = self.spawn_release_note();

        self.start_branch_protection().await?;
        self.prepare_release_branch().await?;

        let package_version = self.read_package_version().await?;
        let tag_name = self.config.tag_name(&package_version);

        self.create_release_tag(&tag_name).await?;

        let (pipeline_id, job_id, release_version) = if self.forge.dry_run() {
            warn!(
                "dry_run: skipping pipeline, job and artifact lookup for {tag_name}"
            );
            (0, 0, String::new())
        } else {
            let pipeline_id = self.get_pipeline(&tag_name).await?;
            let job_id = self.get_job(pipeline_id).await?;
            let release_version = self.get_artifact(job_id).await?;
            (pipeline_id, job_id, release_version)
        };

        let release_note = match self.await_release_note(note_task).await {
            Some(note) => {
                self.update_tag(&tag_name, &note).await;
                note
            }
            None => String::new(),
        };

        self.end_branch_protection().await?;

        info!("release {tag_name} complete");

        Ok(ReleaseRun {
            package_version,
            tag_name,
            release_note,
            release_version,
            pipeline_id,
            job_id,
        })
    }

    /// Compose the release note without touching anything else.
    pub async fn compose_release_note(&self) -> Result<String> {
        release_notes::compose(&self.forge, &self.config.release_notes).await
    }

    /// Start composing the release note on its own task.
    pub fn spawn_release_note(&self) -> JoinHandle<Result<String>> {
        let forge = Arc::clone(&self.forge);
        let config = self.config.release_notes.clone();

        tokio::spawn(async move { release_notes::compose(&forge, &config).await })
    }

    /// Wait for the note task. A missing note is not fatal: the tag keeps its
    /// placeholder description.
    pub async fn await_release_note(
        &self,
        note_task: JoinHandle<Result<String>>,
    ) -> Option<String> {
        match note_task.await {
            Ok(Ok(note)) => Some(note),
            Ok(Err(err)) => {
                warn!("release note unavailable: {err}");
                None
            }
            Err(err) => {
                warn!("release note task did not finish: {err}");
                None
            }
        }
    }

    /// Lock the integration branch for the duration of the release.
    pub async fn start_branch_protection(&self) -> Result<()> {
        info!("protecting branches");
        self.apply_protection(&self.config.protection.lock).await
    }

    /// Restore normal merge access.
    pub async fn end_branch_protection(&self) -> Result<()> {
        info!("resetting branch protection");
        self.apply_protection(&self.config.protection.restore).await
    }

    async fn apply_protection(&self, phase: &ProtectionPhase) -> Result<()> {
        for branch in phase.unprotect.iter() {
            // GitLab answers 404 for a branch that is not protected
            if let Err(err) = self.forge.unprotect_branch(branch).await {
                warn!("failed to unprotect branch {branch}: {err}");
            }
        }

        for policy in phase.protect.iter() {
            debug!("protecting branch: {:?}", policy);
            self.forge.protect_branch(policy).await?;
        }

        Ok(())
    }

    /// Push the release branch through the external script.
    pub async fn prepare_release_branch(&self) -> Result<()> {
        if self.forge.dry_run() {
            warn!("dry_run: would run push script: {}", self.config.push_script);
            return Ok(());
        }

        info!("pushing release branch");
        self.version_source.push_release_branch().await
    }

    pub async fn read_package_version(&self) -> Result<String> {
        info!("reading package version");
        let version = self.version_source.read_package_version().await?;
        info!("package version: {version}");
        Ok(version)
    }

    /// Tag the release ref once the pushed branch had time to replicate.
    pub async fn create_release_tag(&self, tag_name: &str) -> Result<()> {
        if !self.forge.dry_run() {
            sleep(self.config.tag_delay()).await;
        }

        info!("creating release tag {tag_name}");

        self.forge
            .create_tag(CreateTagRequest {
                tag_name: tag_name.to_string(),
                ref_name: self.config.tag.ref_name.clone(),
                message: self.config.tag.message.clone(),
                release_description: self.config.tag.release_description.clone(),
            })
            .await
    }

    /// Wait for the pipeline started by the release tag.
    pub async fn get_pipeline(&self, tag_name: &str) -> Result<u64> {
        info!("waiting for pipeline on {tag_name}");

        let forge = self.forge.as_ref();
        let req = ListPipelinesRequest {
            ref_name: tag_name.to_string(),
            name: self.config.pipeline.name.clone(),
        };

        let pipeline_id = poll_until(
            &format!("pipeline on {tag_name}"),
            self.config.pipeline_poll_policy(),
            move || {
                let req = req.clone();
                async move {
                    let pipelines = forge.list_pipelines(req).await?;
                    Ok(match pipelines.first() {
                        Some(pipeline) => PollOutcome::Ready(pipeline.id),
                        None => PollOutcome::Pending,
                    })
                }
            },
        )
        .await?;

        info!("found pipeline {pipeline_id}");

        Ok(pipeline_id)
    }

    /// Wait for the configured stage's job to show up in the pipeline.
    pub async fn get_job(&self, pipeline_id: u64) -> Result<u64> {
        let stage = self.config.job.stage.as_str();

        info!("looking for {stage} job in pipeline {pipeline_id}");

        let forge = self.forge.as_ref();

        let job_id = poll_until(
            &format!("{stage} job in pipeline {pipeline_id}"),
            self.config.pipeline_poll_policy(),
            move || async move {
                let jobs = forge
                    .list_pipeline_jobs(ListJobsRequest {
                        pipeline_id,
                        scopes: vec![
                            JobStatus::Running,
                            JobStatus::Pending,
                            JobStatus::Created,
                        ],
                    })
                    .await?;

                Ok(jobs
                    .iter()
                    .find(|job| job.stage.eq_ignore_ascii_case(stage))
                    .map(|job| PollOutcome::Ready(job.id))
                    .unwrap_or(PollOutcome::Pending))
            },
        )
        .await?;

        info!("found job {job_id}");

        Ok(job_id)
    }

    /// Wait for the job to succeed and read the version from its artifact.
    pub async fn get_artifact(&self, job_id: u64) -> Result<String> {
        info!("waiting for artifact from job {job_id}");

        let forge = self.forge.as_ref();
        let path = self.config.artifact.path.as_str();

        let release_version = poll_until(
            &format!("job {job_id}"),
            self.config.artifact_poll_policy(),
            move || async move {
                let job = forge.get_job(job_id).await?;

                info!("job {job_id} status: {}", job.status);

                if job.status.is_failure() {
                    return Ok(PollOutcome::Failed(
                        ReleaseBuilderError::JobFailed {
                            job_id,
                            status: job.status.to_string(),
                        },
                    ));
                }

                if job.status != JobStatus::Success {
                    return Ok(PollOutcome::Pending);
                }

                let content = forge.download_job_artifact(job_id, path).await?;

                Ok(match serde_json::from_slice::<Artifact>(&content) {
                    Ok(artifact) => PollOutcome::Ready(artifact.version),
                    Err(err) => PollOutcome::Failed(err.into()),
                })
            },
        )
        .await?;

        info!("release version: {release_version}");

        Ok(release_version)
    }

    /// Publish the release note on the tag. Failure only warns so that the
    /// run still reaches branch restoration.
    pub async fn update_tag(&self, tag_name: &str, release_note: &str) {
        info!("updating release note on {tag_name}");

        if let Err(err) =
            self.forge.update_release_notes(tag_name, release_note).await
        {
            warn!("failed to update release note on {tag_name}: {err}");
        }
    }
}
