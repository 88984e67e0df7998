//! Release note preview command implementation.
use crate::{cli, command::common, error::Result};

/// Execute the notes command: print the note the next release would carry.
pub async fn execute(args: &cli::Args) -> Result<()> {
    let orchestrator = common::build_orchestrator(args).await?;
    let note = orchestrator.compose_release_note().await?;

    print!("{note}");

    Ok(())
}
