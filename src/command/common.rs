//! Common functionality shared between commands
use log::*;
use std::sync::Arc;

use crate::{
    cli,
    config::Config,
    error::Result,
    forge::{
        gitlab::Gitlab,
        manager::{ForgeManager, ForgeOptions},
    },
    orchestrator::Orchestrator,
    version_source::{LocalVersionSource, VersionSource},
};

/// Load configuration, connect to GitLab and wire up the orchestrator.
pub async fn build_orchestrator(args: &cli::Args) -> Result<Orchestrator> {
    let remote = args.get_remote()?;
    let config = Config::load(&args.config).await?;

    info!(
        "connecting to {}://{} for project {}",
        remote.scheme,
        remote.host_with_port(),
        remote.path
    );

    let gitlab = Gitlab::new(remote).await?;

    let forge = ForgeManager::new(
        Box::new(gitlab),
        ForgeOptions {
            dry_run: args.dry_run,
        },
    );

    let version_source: Arc<dyn VersionSource> = Arc::new(
        LocalVersionSource::new(&config.package_file, &config.push_script),
    );

    Orchestrator::builder()
        .config(Arc::new(config))
        .forge(Arc::new(forge))
        .version_source(version_source)
        .build()
}
