//! Command execution for release-builder.
//!
//! Each subcommand builds the same collaborators from the CLI arguments and
//! the run configuration, then drives the orchestrator:
//!
//! - **run**: the full release, from branch lock to branch restore
//! - **notes**: release note composition only
//!
//! Both honor `--dry-run`, which is applied by the forge manager.

/// Collaborator setup shared by every command.
pub mod common;

/// Compose and print the release note without releasing.
pub mod notes;

/// Execute a full release and print its identifiers.
pub mod run;
