//! Interface to the GitLab forge hosting the released project.
//!
//! Provides token-based authentication, merge request listing, tagging,
//! branch protection and CI pipeline/job access through a common trait.

/// Connection configuration for the forge.
pub mod config;

/// GitLab API client implementation for GitLab.com and self-hosted instances.
pub mod gitlab;

/// Wraps a forge implementation and applies dry-run.
pub mod manager;

/// Request and response types exchanged with the forge.
pub mod request;

/// Common trait for forge abstraction.
pub mod traits;
