//! Release orchestration for a single GitLab project: lock the integration
//! branch, tag the packaged version, wait for the build to publish its
//! artifact, and attach a release note composed from merged requests.
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod forge;
pub mod orchestrator;
pub mod poll;
pub mod release_notes;
pub mod version_source;

pub use cli::{Args, Command};
pub use error::{ReleaseBuilderError, Result};
pub use orchestrator::{Orchestrator, ReleaseRun};
