use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::str::FromStr;

use crate::{
    error::Result,
    forge::request::{Job, JobStatus, MergeRequest},
};

#[derive(Debug, Deserialize)]
pub struct MergeRequestInfo {
    pub iid: u64,
    pub title: String,
    pub merged_at: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl MergeRequestInfo {
    pub fn into_merge_request(self) -> Result<MergeRequest> {
        let merged_at = match self.merged_at {
            Some(ts) => Some(DateTime::parse_from_rfc3339(&ts)?.with_timezone(&Utc)),
            None => None,
        };

        Ok(MergeRequest {
            iid: self.iid,
            title: self.title,
            merged_at,
            labels: self.labels,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct JobInfo {
    pub id: u64,
    pub name: String,
    pub stage: String,
    pub status: String,
}

impl From<JobInfo> for Job {
    fn from(info: JobInfo) -> Self {
        let status = JobStatus::from_str(&info.status)
            .unwrap_or_else(|_| JobStatus::Unknown(info.status.clone()));

        Self {
            id: info.id,
            name: info.name,
            stage: info.stage,
            status,
        }
    }
}
