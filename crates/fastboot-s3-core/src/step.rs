//! The archive-and-publish step.
//!
//! [`ArchivePublishStep`] exposes the phases a host pipeline calls in
//! order:
//!
//! ```text
//! configure -> setup -> resolve -> prepare -> upload -> activate
//! ```
//!
//! `setup` returns a [`DeployRun`] holding the object store and `resolve`
//! returns the immutable [`DeployConfig`]; both are passed forward
//! explicitly instead of being stored on the step. The host guarantees
//! phases never overlap for one run.

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::archive::{self, ArchiveError, ArchiveFormat};
use crate::config::{DeployConfig, DeploySettings};
use crate::context::PipelineContext;
use crate::error::{ConfigError, DeployError, DeployResult, OperationCause, OperationError, Phase};
use crate::log::{LogOptions, PipelineLog, TracingLog};
use crate::store::{ObjectBody, ObjectStore, PutObjectRequest, S3ObjectStore};

/// Default plugin name used in logs.
pub const PLUGIN_NAME: &str = "fastboot-s3";

/// `Content-Type` of the deploy descriptor.
const DESCRIPTOR_CONTENT_TYPE: &str = "application/json";

/// Per-run state produced by [`ArchivePublishStep::setup`].
#[derive(Debug, Clone)]
pub struct DeployRun {
    store: Arc<dyn ObjectStore>,
}

impl DeployRun {
    /// Create run state around an object store.
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// The object store used for this run.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }
}

/// Packs the build output and publishes it with a deploy descriptor.
#[derive(Debug)]
pub struct ArchivePublishStep {
    name: String,
    settings: DeploySettings,
    log: Arc<dyn PipelineLog>,
}

impl ArchivePublishStep {
    /// Create a step that logs through `tracing`.
    #[must_use]
    pub fn new(name: impl Into<String>, settings: DeploySettings) -> Self {
        let name = name.into();
        let log = Arc::new(TracingLog::new(name.clone()));
        Self {
            name,
            settings,
            log,
        }
    }

    /// Replace the log sink.
    #[must_use]
    pub fn with_log(mut self, log: Arc<dyn PipelineLog>) -> Self {
        self.log = log;
        self
    }

    /// Step name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unresolved settings.
    #[must_use]
    pub fn settings(&self) -> &DeploySettings {
        &self.settings
    }

    /// Validate that a deploy can proceed, before any I/O.
    ///
    /// `bucket` must be set. With an object store override nothing else is
    /// checked; otherwise a `region` or an `endpoint` is required.
    pub fn configure(&self, ctx: &PipelineContext) -> DeployResult<()> {
        if self.settings.bucket.as_deref().is_none_or(str::is_empty) {
            return Err(self.config_failure(ConfigError::MissingRequired("bucket")));
        }

        if self.settings.s3_client(ctx).is_some() {
            debug!(step = %self.name, "using configured object store");
            return Ok(());
        }

        if !self.settings.has_region_or_endpoint() {
            return Err(self.config_failure(ConfigError::MissingRegionOrEndpoint));
        }

        Ok(())
    }

    /// Build or reuse the object store for this run.
    pub async fn setup(&self, ctx: &PipelineContext) -> DeployResult<DeployRun> {
        if let Some(store) = self.settings.s3_client(ctx) {
            return Ok(DeployRun::new(store));
        }

        let store = S3ObjectStore::from_options(&self.settings.client_options()).await;
        Ok(DeployRun::new(Arc::new(store)))
    }

    /// Resolve the run configuration against the final pipeline context.
    pub fn resolve(&self, ctx: &PipelineContext) -> DeployResult<DeployConfig> {
        self.settings
            .resolve(ctx)
            .map_err(|e| self.config_failure(e))
    }

    /// Pack `distDir` into the staging directory and return the archive path.
    pub async fn prepare(&self, config: &DeployConfig) -> DeployResult<PathBuf> {
        let file = self
            .pack(config)
            .await
            .map_err(|e| self.report(Phase::Prepare, e))?;

        self.log
            .log(&format!("✔  {}", config.archive_name()), LogOptions::verbose());
        Ok(file)
    }

    async fn pack(&self, config: &DeployConfig) -> Result<PathBuf, ArchiveError> {
        tokio::fs::create_dir_all(&config.archive_path)
            .await
            .map_err(|source| ArchiveError::Io {
                path: config.archive_path.clone(),
                source,
            })?;

        let format: ArchiveFormat = config.archive_type.parse()?;
        let file = config.archive_file();

        self.log.log(
            &format!("saving deploy archive to {}", file.display()),
            LogOptions::verbose(),
        );

        archive::pack_directory(&config.dist_dir, &config.deploy_archive, &file, format).await?;
        Ok(file)
    }

    /// Upload the archive and return its object key.
    pub async fn upload(&self, run: &DeployRun, config: &DeployConfig) -> DeployResult<String> {
        let key = config.archive_key();
        let content_type = config
            .archive_type
            .parse::<ArchiveFormat>()
            .ok()
            .map(|format| format.content_type().to_owned());

        self.log.log(
            &format!("preparing to upload to S3 bucket `{}`", config.bucket),
            LogOptions::verbose(),
        );

        run.store
            .put_object(PutObjectRequest {
                bucket: config.bucket.clone(),
                key: key.clone(),
                body: ObjectBody::File(config.archive_file()),
                content_type,
            })
            .await
            .map_err(|e| self.report(Phase::Upload, e))?;

        self.log.log(&format!("✔  {key}"), LogOptions::verbose());
        Ok(key)
    }

    /// Publish the deploy descriptor pointing at this run's archive.
    pub async fn activate(&self, run: &DeployRun, config: &DeployConfig) -> DeployResult<()> {
        let revision_key = &config.revision_key;

        self.log.log(
            &format!("preparing to activate {revision_key}"),
            LogOptions::verbose(),
        );

        let body = config
            .descriptor()
            .to_json()
            .map_err(|e| self.report(Phase::Activate, e))?;

        run.store
            .put_object(PutObjectRequest {
                bucket: config.bucket.clone(),
                key: config.deploy_info_key(),
                body: ObjectBody::Bytes(Bytes::from(body)),
                content_type: Some(DESCRIPTOR_CONTENT_TYPE.to_owned()),
            })
            .await
            .map_err(|e| self.report(Phase::Activate, e))?;

        self.log.log(
            &format!("✔  activated revision {revision_key}"),
            LogOptions::verbose(),
        );
        Ok(())
    }

    fn config_failure(&self, err: ConfigError) -> DeployError {
        self.log.log(&err.to_string(), LogOptions::red());
        err.into()
    }

    /// Log `cause` and its source chain in red, then tag it with `phase`.
    fn report(&self, phase: Phase, cause: impl Into<OperationCause>) -> DeployError {
        let cause = cause.into();

        self.log.log(&cause.to_string(), LogOptions::red());
        let mut source = std::error::Error::source(&cause);
        while let Some(err) = source {
            self.log.log(&format!("caused by: {err}"), LogOptions::red());
            source = err.source();
        }

        OperationError { phase, cause }.into()
    }
}
