//! Full release command implementation.
use crate::{
    cli, command::common, error::Result, orchestrator::ReleaseRun,
};

/// Execute the run command and print the release identifiers.
pub async fn execute(args: &cli::Args) -> Result<()> {
    let orchestrator = common::build_orchestrator(args).await?;
    let run = orchestrator.run().await?;

    println!("{}", summary(&run));

    Ok(())
}

/// Release version, package version and pipeline id, one per line.
pub fn summary(run: &ReleaseRun) -> String {
    format!(
        "{}\n{}\n{}",
        run.release_version, run.package_version, run.pipeline_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_identifiers_in_order() {
        let run = ReleaseRun {
            package_version: "2.3.0".into(),
            tag_name: "test-2.3.0".into(),
            release_note: "ABC-1 - Fix - `bug`\n".into(),
            release_version: "2.3.0+77".into(),
            pipeline_id: 901,
            job_id: 4411,
        };

        assert_eq!(summary(&run), "2.3.0+77\n2.3.0\n901");
    }
}
