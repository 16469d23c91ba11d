//! fastboot-s3-deploy - archive a FastBoot build and publish it to S3.
//!
//! Packs the build output directory, uploads the archive, then writes the
//! deploy descriptor that FastBoot app servers poll for the active
//! revision.
//!
//! # Usage
//!
//! ```text
//! DEPLOY_BUCKET=my-bucket AWS_REGION=us-east-1 fastboot-s3-deploy --dist-dir tmp/deploy-dist
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DEPLOY_BUCKET` | *(required)* | Target bucket |
//! | `DEPLOY_PREFIX` | *(unset)* | Key prefix for both objects |
//! | `AWS_REGION` | *(unset)* | Client region |
//! | `S3_ENDPOINT_URL` | *(unset)* | S3-compatible endpoint |
//! | `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` | *(unset)* | Static credentials |
//! | `S3_FORCE_PATH_STYLE` | `false` | Path-style addressing |
//! | `DEPLOY_ARCHIVE_PATH` | `tmp/dist` | Local staging directory |
//! | `DEPLOY_ARCHIVE_TYPE` | `zip` | `zip`, `tar`, `tar.gz` or `tgz` |
//! | `DEPLOY_ARCHIVE` | `dist` | Archive base name and root folder |
//! | `DEPLOY_INFO` | `fastboot-deploy-info.json` | Descriptor key |
//! | `DEPLOY_DIST_DIR` | *(unset)* | Overrides `--dist-dir` |
//! | `DEPLOY_REVISION_KEY` | *(unset)* | Overrides revision detection |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod revision;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use fastboot_s3_core::step::PLUGIN_NAME;
use fastboot_s3_core::{
    ArchivePublishStep, DeploySettings, MemoryObjectStore, PipelineContext, pipeline,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Build output directory used when none is given.
const DEFAULT_DIST_DIR: &str = "tmp/deploy-dist";

/// Filter applied by `--verbose`.
const VERBOSE_FILTER: &str = "info,fastboot_s3_core=debug,fastboot_s3_deploy=debug";

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "fastboot-s3-deploy", version, about)]
struct Cli {
    /// JSON settings file; environment variables override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Build output directory to archive.
    #[arg(long, default_value = DEFAULT_DIST_DIR)]
    dist_dir: PathBuf,

    /// Revision key to deploy instead of the build's file hash.
    #[arg(long)]
    revision: Option<String>,

    /// Publish to an in-memory store instead of S3.
    #[arg(long)]
    dry_run: bool,

    /// Log level filter.
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Show per-phase progress.
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the given filter.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Layer environment variables over the optional settings file.
fn load_settings(cli: &Cli) -> Result<DeploySettings> {
    let base = match &cli.config {
        Some(path) => DeploySettings::from_json_file(path)?,
        None => DeploySettings::default(),
    };
    Ok(base.merge(DeploySettings::from_env()))
}

/// Build the pipeline context the step resolves against.
fn build_context(cli: &Cli, settings: &DeploySettings) -> Result<PipelineContext> {
    let mut ctx = PipelineContext::new(cli.dist_dir.clone());
    if let Some(revision) = &cli.revision {
        ctx = ctx.with_revision(revision.clone());
    }

    let dist_dir = settings.dist_dir.as_ref().unwrap_or(&cli.dist_dir);
    ctx.revision_data = revision::file_hash(dist_dir)?;

    if cli.dry_run {
        ctx = ctx.with_s3_client(Arc::new(MemoryObjectStore::new()));
    }
    Ok(ctx)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        VERBOSE_FILTER
    } else {
        cli.log_level.as_str()
    };
    init_tracing(log_level)?;

    let settings = load_settings(&cli)?;
    let ctx = build_context(&cli, &settings)?;
    let step = ArchivePublishStep::new(PLUGIN_NAME, settings);

    let outcome = pipeline::run(&step, &ctx).await.context("deploy failed")?;

    info!(
        revision = %outcome.revision_key,
        archive = %format!("s3://{}/{}", outcome.bucket, outcome.archive_key),
        deploy_info = %format!("s3://{}/{}", outcome.bucket, outcome.deploy_info_key),
        dry_run = cli.dry_run,
        "deploy complete",
    );
    Ok(())
}
