//! Sequential phase runner for hosts without their own lifecycle.

use std::path::PathBuf;

use tracing::info;

use crate::context::PipelineContext;
use crate::error::DeployResult;
use crate::step::ArchivePublishStep;

/// What a successful deploy published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOutcome {
    /// Revision that was deployed.
    pub revision_key: String,
    /// Local archive file.
    pub archive_file: PathBuf,
    /// Bucket holding both objects.
    pub bucket: String,
    /// Object key of the archive.
    pub archive_key: String,
    /// Object key of the deploy descriptor.
    pub deploy_info_key: String,
}

/// Run every phase of `step` in order, stopping at the first failure.
pub async fn run(step: &ArchivePublishStep, ctx: &PipelineContext) -> DeployResult<DeployOutcome> {
    step.configure(ctx)?;
    let run = step.setup(ctx).await?;
    let config = step.resolve(ctx)?;

    info!(
        step = %step.name(),
        bucket = %config.bucket,
        revision = %config.revision_key,
        "deploying revision"
    );

    let archive_file = step.prepare(&config).await?;
    let archive_key = step.upload(&run, &config).await?;
    step.activate(&run, &config).await?;

    let outcome = DeployOutcome {
        revision_key: config.revision_key.clone(),
        archive_file,
        bucket: config.bucket.clone(),
        archive_key,
        deploy_info_key: config.deploy_info_key(),
    };

    info!(
        step = %step.name(),
        key = %outcome.archive_key,
        deploy_info = %outcome.deploy_info_key,
        "revision activated"
    );
    Ok(outcome)
}
