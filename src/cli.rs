//! CLI argument parsing and GitLab connection configuration.
use clap::{Parser, Subcommand};
use git_url_parse::GitUrl;
use secrecy::SecretString;
use std::{env, path::PathBuf};

use crate::{
    config::DEFAULT_CONFIG_FILE,
    error::{ReleaseBuilderError, Result},
    forge::config::RemoteConfig,
};

/// Environment variable consulted when no token is passed on the command
/// line or embedded in the repository URL.
pub const TOKEN_ENV_VAR: &str = "GITLAB_TOKEN";

/// Global CLI arguments for the GitLab connection and run mode.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, default_value = "", global = true)]
    /// GitLab project URL. Supports GitLab.com and self-hosted instances.
    pub repo: String,

    #[arg(long, default_value = "", global = true)]
    /// GitLab personal access token. Falls back to GITLAB_TOKEN env var.
    pub token: String,

    #[arg(long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    /// Path to the release configuration file.
    pub config: PathBuf,

    #[arg(long, default_value_t = false, global = true)]
    /// Log mutating forge calls and skip them along with the push script.
    pub dry_run: bool,

    #[arg(long, default_value_t = false, global = true)]
    /// Enable debug logging.
    pub debug: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Release operation subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Lock branches, tag the release, wait for the build and publish the
    /// release note.
    Run,

    /// Print the release note for the release currently being cut.
    Notes,
}

impl Args {
    /// Configure the GitLab connection from CLI arguments.
    pub fn get_remote(&self) -> Result<RemoteConfig> {
        if self.repo.is_empty() {
            return Err(ReleaseBuilderError::InvalidArgs(
                "must configure a repo with --repo".into(),
            ));
        }

        get_gitlab_remote(&self.repo, &self.token)
    }
}

/// Validate repository URL uses HTTP or HTTPS scheme.
fn validate_scheme(scheme: git_url_parse::Scheme) -> Result<()> {
    match scheme {
        git_url_parse::Scheme::Http => Ok(()),
        git_url_parse::Scheme::Https => Ok(()),
        _ => Err(ReleaseBuilderError::InvalidArgs(
            "only http and https schemes are supported for repo urls".into(),
        )),
    }
}

/// First non-empty token from the flag, the repo URL and the environment.
fn resolve_token(
    flag_token: &str,
    url_token: Option<String>,
    env_token: Option<String>,
) -> Option<String> {
    let mut token = flag_token.to_string();

    if token.is_empty()
        && let Some(parsed_token) = url_token
    {
        token = parsed_token;
    }

    if token.is_empty()
        && let Some(env_var_token) = env_token
    {
        token = env_var_token;
    }

    if token.is_empty() { None } else { Some(token) }
}

/// Configure GitLab remote with URL parsing and token resolution.
fn get_gitlab_remote(gitlab_repo: &str, gitlab_token: &str) -> Result<RemoteConfig> {
    let parsed = GitUrl::parse(gitlab_repo)?;

    validate_scheme(parsed.scheme)?;

    let token =
        resolve_token(gitlab_token, parsed.token, env::var(TOKEN_ENV_VAR).ok())
            .ok_or_else(|| {
                ReleaseBuilderError::InvalidArgs("must set gitlab token".into())
            })?;

    let host = parsed.host.ok_or_else(|| {
        ReleaseBuilderError::InvalidArgs(
            "unable to parse host from gitlab repo".into(),
        )
    })?;

    let project_path = parsed
        .path
        .trim_start_matches('/')
        .trim_end_matches('/')
        .trim_end_matches(".git")
        .to_string();

    if project_path.is_empty() {
        return Err(ReleaseBuilderError::InvalidArgs(
            "unable to parse project path from gitlab repo".into(),
        ));
    }

    Ok(RemoteConfig {
        host,
        port: parsed.port,
        scheme: parsed.scheme.to_string(),
        path: project_path,
        token: SecretString::from(token),
    })
}
