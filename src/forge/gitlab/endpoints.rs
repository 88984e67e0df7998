//! GitLab REST endpoints the `gitlab` crate does not expose in the shape
//! needed here.
use derive_builder::Builder;
use gitlab::api::{
    BodyError, Endpoint, FormParams, QueryParams,
    common::{NameOrId, path_escaped},
};
use reqwest::Method;
use std::borrow::Cow;

/// Pipelines for a ref, newest first, optionally filtered by name.
#[derive(Debug, Builder)]
#[builder(setter(strip_option))]
pub struct RefPipelines<'a> {
    #[builder(setter(into))]
    project: NameOrId<'a>,

    #[builder(setter(into))]
    ref_name: Cow<'a, str>,

    #[builder(setter(into), default)]
    name: Option<Cow<'a, str>>,
}

impl<'a> RefPipelines<'a> {
    pub fn builder() -> RefPipelinesBuilder<'a> {
        RefPipelinesBuilder::default()
    }
}

impl Endpoint for RefPipelines<'_> {
    fn method(&self) -> Method {
        Method::GET
    }

    fn endpoint(&self) -> Cow<'static, str> {
        format!("projects/{}/pipelines", self.project).into()
    }

    fn parameters(&self) -> QueryParams<'_> {
        let mut params = QueryParams::default();
        params
            .push("ref", self.ref_name.as_ref())
            .push_opt("name", self.name.as_deref())
            .push("order_by", "id")
            .push("sort", "desc");
        params
    }
}

/// Jobs of a pipeline restricted to a set of states.
#[derive(Debug, Builder)]
pub struct ScopedPipelineJobs<'a> {
    #[builder(setter(into))]
    project: NameOrId<'a>,

    pipeline: u64,

    scopes: Vec<String>,
}

impl<'a> ScopedPipelineJobs<'a> {
    pub fn builder() -> ScopedPipelineJobsBuilder<'a> {
        ScopedPipelineJobsBuilder::default()
    }
}

impl Endpoint for ScopedPipelineJobs<'_> {
    fn method(&self) -> Method {
        Method::GET
    }

    fn endpoint(&self) -> Cow<'static, str> {
        format!("projects/{}/pipelines/{}/jobs", self.project, self.pipeline)
            .into()
    }

    fn parameters(&self) -> QueryParams<'_> {
        let mut params = QueryParams::default();
        for scope in self.scopes.iter() {
            params.push("scope[]", scope.as_str());
        }
        params
    }
}

/// Replace the description of the release attached to a tag.
#[derive(Debug, Builder)]
pub struct EditRelease<'a> {
    #[builder(setter(into))]
    project: NameOrId<'a>,

    #[builder(setter(into))]
    tag_name: Cow<'a, str>,

    #[builder(setter(into))]
    description: Cow<'a, str>,
}

impl<'a> EditRelease<'a> {
    pub fn builder() -> EditReleaseBuilder<'a> {
        EditReleaseBuilder::default()
    }
}

impl Endpoint for EditRelease<'_> {
    fn method(&self) -> Method {
        Method::PUT
    }

    fn endpoint(&self) -> Cow<'static, str> {
        format!(
            "projects/{}/releases/{}",
            self.project,
            path_escaped(&self.tag_name)
        )
        .into()
    }

    fn body(&self) -> Result<Option<(&'static str, Vec<u8>)>, BodyError> {
        let mut params = FormParams::default();
        params.push("description", self.description.as_ref());
        params.into_body()
    }
}

/// A single file out of a job's artifacts archive.
#[derive(Debug, Builder)]
pub struct JobArtifactFile<'a> {
    #[builder(setter(into))]
    project: NameOrId<'a>,

    job: u64,

    /// Path inside the archive; slashes are kept as-is.
    #[builder(setter(into))]
    artifact_path: Cow<'a, str>,
}

impl<'a> JobArtifactFile<'a> {
    pub fn builder() -> JobArtifactFileBuilder<'a> {
        JobArtifactFileBuilder::default()
    }
}

impl Endpoint for JobArtifactFile<'_> {
    fn method(&self) -> Method {
        Method::GET
    }

    fn endpoint(&self) -> Cow<'static, str> {
        format!(
            "projects/{}/jobs/{}/artifacts/{}",
            self.project,
            self.job,
            self.artifact_path.trim_start_matches('/')
        )
        .into()
    }
}
