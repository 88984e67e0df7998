//! Common test utilities for orchestrator tests.

use chrono::{TimeZone, Utc};
use std::sync::Arc;

use crate::{
    config::Config,
    forge::{
        manager::{ForgeManager, ForgeOptions},
        request::{Job, JobStatus, MergeRequest},
        traits::{Forge, MockForge},
    },
    orchestrator::Orchestrator,
    version_source::MockVersionSource,
};

pub const PACKAGE_VERSION: &str = "2.3.0";
pub const TAG_NAME: &str = "test-2.3.0";
pub const PIPELINE_ID: u64 = 901;
pub const JOB_ID: u64 = 4411;

/// Configuration with short intervals so paused-time tests stay readable.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.tag.delay_secs = 1;
    config.pipeline.poll_interval_secs = 1;
    config.pipeline.max_attempts = 5;
    config.artifact.poll_interval_secs = 2;
    config.artifact.max_attempts = 5;
    config
}

/// Creates a test Orchestrator with the provided mocks and [`test_config`].
pub fn create_test_orchestrator(
    mock_forge: MockForge,
    mock_source: MockVersionSource,
) -> Orchestrator {
    create_test_orchestrator_with_options(
        mock_forge,
        mock_source,
        test_config(),
        ForgeOptions::default(),
    )
}

pub fn create_test_orchestrator_with_options(
    mock_forge: MockForge,
    mock_source: MockVersionSource,
    config: Config,
    options: ForgeOptions,
) -> Orchestrator {
    create_test_orchestrator_with_forge(
        Box::new(mock_forge),
        mock_source,
        config,
        options,
    )
}

/// Creates a test Orchestrator around any forge implementation, for tests
/// that need behavior a mock cannot express such as slow responses.
pub fn create_test_orchestrator_with_forge(
    forge: Box<dyn Forge>,
    mock_source: MockVersionSource,
    config: Config,
    options: ForgeOptions,
) -> Orchestrator {
    let forge = Arc::new(ForgeManager::new(forge, options));
    let version_source: Arc<dyn crate::version_source::VersionSource> =
        Arc::new(mock_source);

    Orchestrator::builder()
        .config(Arc::new(config))
        .forge(forge)
        .version_source(version_source)
        .build()
        .unwrap()
}

pub fn mock_forge() -> MockForge {
    let mut mock_forge = MockForge::new();
    mock_forge
        .expect_project_path()
        .returning(|| "group/project".to_string());
    mock_forge
}

pub fn merge_request(
    iid: u64,
    title: &str,
    labels: &[&str],
    merged_hour: Option<u32>,
) -> MergeRequest {
    MergeRequest {
        iid,
        title: title.into(),
        merged_at: merged_hour
            .map(|hour| Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()),
        labels: labels.iter().map(|l| l.to_string()).collect(),
    }
}

/// Boundary requests at 08:00 and 17:00 and two requests merged between
/// them, one without a ticket.
pub fn expect_release_notes(mock_forge: &mut MockForge) {
    mock_forge
        .expect_list_merged_merge_requests()
        .withf(|req| !req.labels.is_empty())
        .times(1)
        .returning(|_| {
            Ok(vec![
                merge_request(40, "Version Update", &["Version Update"], Some(17)),
                merge_request(30, "Version Update", &["Version Update"], Some(8)),
            ])
        });

    mock_forge
        .expect_list_merged_merge_requests()
        .withf(|req| req.labels.is_empty())
        .times(1)
        .returning(|_| {
            Ok(vec![
                merge_request(35, "[ABC-12] - Fix login", &["bug"], Some(10)),
                merge_request(36, "bump deps", &[], Some(11)),
            ])
        });
}

pub const EXPECTED_NOTE: &str = "ABC-12 - Fix login - `bug`\n";

pub fn expect_any_protection(mock_forge: &mut MockForge) {
    mock_forge.expect_unprotect_branch().returning(|_| Ok(()));
    mock_forge.expect_protect_branch().returning(|_| Ok(()));
}

pub fn job(id: u64, stage: &str, status: JobStatus) -> Job {
    Job {
        id,
        name: format!("{stage}-job"),
        stage: stage.into(),
        status,
    }
}

pub fn artifact_json(version: &str) -> Vec<u8> {
    format!(r#"{{"version": "{version}", "commit": "abc123"}}"#).into_bytes()
}
