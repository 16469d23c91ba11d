//! Deploy settings and their resolution into a per-run configuration.
//!
//! [`DeploySettings`] holds what the user configured, with every key
//! optional. [`DeploySettings::resolve`] evaluates the dynamic defaults
//! against a [`PipelineContext`] once and produces an immutable
//! [`DeployConfig`] that every later phase reads from.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::context::PipelineContext;
use crate::error::ConfigError;
use crate::naming::{DeployDescriptor, build_archive_name, object_key};
use crate::store::ObjectStore;

/// Default staging directory for the archive.
pub const DEFAULT_ARCHIVE_PATH: &str = "tmp/dist";
/// Default archive format.
pub const DEFAULT_ARCHIVE_TYPE: &str = "zip";
/// Default archive base name and in-archive root folder.
pub const DEFAULT_DEPLOY_ARCHIVE: &str = "dist";
/// Default object key of the deploy descriptor.
pub const DEFAULT_DEPLOY_INFO: &str = "fastboot-deploy-info.json";

/// User-supplied deploy settings.
///
/// Keys match the camelCase names used in deploy configuration files.
///
/// # Examples
///
/// ```
/// use fastboot_s3_core::DeploySettings;
///
/// let settings = DeploySettings::builder()
///     .bucket("my-bucket")
///     .region("eu-west-1")
///     .build();
/// assert_eq!(settings.bucket.as_deref(), Some("my-bucket"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploySettings {
    /// Target bucket. Required.
    #[builder(default, setter(into, strip_option))]
    pub bucket: Option<String>,

    /// Client region.
    #[builder(default, setter(into, strip_option))]
    pub region: Option<String>,

    /// Custom endpoint URL for S3-compatible stores.
    #[builder(default, setter(into, strip_option))]
    pub endpoint: Option<String>,

    /// Static access key id.
    #[builder(default, setter(into, strip_option))]
    pub access_key_id: Option<String>,

    /// Static secret access key.
    #[builder(default, setter(into, strip_option))]
    pub secret_access_key: Option<String>,

    /// Use path-style bucket addressing.
    #[builder(default, setter(strip_option))]
    pub force_path_style: Option<bool>,

    /// Key prefix for both the artifact and the descriptor.
    #[builder(default, setter(into, strip_option))]
    pub prefix: Option<String>,

    /// Local staging directory for the archive.
    #[builder(default, setter(into, strip_option))]
    pub archive_path: Option<PathBuf>,

    /// Archive format (`zip`, `tar`, `tar.gz`, `tgz`).
    #[builder(default, setter(into, strip_option))]
    pub archive_type: Option<String>,

    /// Archive base name and in-archive root folder.
    #[builder(default, setter(into, strip_option))]
    pub deploy_archive: Option<String>,

    /// Object key of the deploy descriptor, before prefixing.
    #[builder(default, setter(into, strip_option))]
    pub deploy_info: Option<String>,

    /// Directory to archive. Defaults to the pipeline's build output.
    #[builder(default, setter(into, strip_option))]
    pub dist_dir: Option<PathBuf>,

    /// Revision identifier. Defaults to the command-line revision, then the
    /// pipeline's revision data.
    #[builder(default, setter(into, strip_option))]
    pub revision_key: Option<String>,

    /// Pre-built object store; bypasses client construction and validation.
    #[serde(skip)]
    #[builder(default, setter(strip_option))]
    pub s3_client: Option<Arc<dyn ObjectStore>>,
}

impl DeploySettings {
    /// Load settings from environment variables.
    ///
    /// | Variable | Setting |
    /// |----------|---------|
    /// | `DEPLOY_BUCKET` | `bucket` |
    /// | `DEPLOY_PREFIX` | `prefix` |
    /// | `AWS_REGION` | `region` |
    /// | `S3_ENDPOINT_URL` | `endpoint` |
    /// | `AWS_ACCESS_KEY_ID` | `accessKeyId` |
    /// | `AWS_SECRET_ACCESS_KEY` | `secretAccessKey` |
    /// | `S3_FORCE_PATH_STYLE` | `forcePathStyle` |
    /// | `DEPLOY_ARCHIVE_PATH` | `archivePath` |
    /// | `DEPLOY_ARCHIVE_TYPE` | `archiveType` |
    /// | `DEPLOY_ARCHIVE` | `deployArchive` |
    /// | `DEPLOY_INFO` | `deployInfo` |
    /// | `DEPLOY_DIST_DIR` | `distDir` |
    /// | `DEPLOY_REVISION_KEY` | `revisionKey` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            bucket: lookup("DEPLOY_BUCKET"),
            region: lookup("AWS_REGION"),
            endpoint: lookup("S3_ENDPOINT_URL"),
            access_key_id: lookup("AWS_ACCESS_KEY_ID"),
            secret_access_key: lookup("AWS_SECRET_ACCESS_KEY"),
            force_path_style: lookup("S3_FORCE_PATH_STYLE").map(|v| parse_bool(&v)),
            prefix: lookup("DEPLOY_PREFIX"),
            archive_path: lookup("DEPLOY_ARCHIVE_PATH").map(PathBuf::from),
            archive_type: lookup("DEPLOY_ARCHIVE_TYPE"),
            deploy_archive: lookup("DEPLOY_ARCHIVE"),
            deploy_info: lookup("DEPLOY_INFO"),
            dist_dir: lookup("DEPLOY_DIST_DIR").map(PathBuf::from),
            revision_key: lookup("DEPLOY_REVISION_KEY"),
            s3_client: None,
        }
    }

    /// Load settings from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Overlay `other` on top of `self`; fields set in `other` win.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            bucket: other.bucket.or(self.bucket),
            region: other.region.or(self.region),
            endpoint: other.endpoint.or(self.endpoint),
            access_key_id: other.access_key_id.or(self.access_key_id),
            secret_access_key: other.secret_access_key.or(self.secret_access_key),
            force_path_style: other.force_path_style.or(self.force_path_style),
            prefix: other.prefix.or(self.prefix),
            archive_path: other.archive_path.or(self.archive_path),
            archive_type: other.archive_type.or(self.archive_type),
            deploy_archive: other.deploy_archive.or(self.deploy_archive),
            deploy_info: other.deploy_info.or(self.deploy_info),
            dist_dir: other.dist_dir.or(self.dist_dir),
            revision_key: other.revision_key.or(self.revision_key),
            s3_client: other.s3_client.or(self.s3_client),
        }
    }

    /// The object store override, from the settings first, then the context.
    #[must_use]
    pub fn s3_client(&self, ctx: &PipelineContext) -> Option<Arc<dyn ObjectStore>> {
        self.s3_client.clone().or_else(|| ctx.s3_client.clone())
    }

    /// Whether at least one of `region` or `endpoint` is set.
    #[must_use]
    pub fn has_region_or_endpoint(&self) -> bool {
        is_set(self.region.as_deref()) || is_set(self.endpoint.as_deref())
    }

    /// Options for building an S3 client from these settings.
    #[must_use]
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            region: self.region.clone().filter(|v| !v.is_empty()),
            endpoint: self.endpoint.clone().filter(|v| !v.is_empty()),
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            force_path_style: self.force_path_style.unwrap_or(false),
        }
    }

    /// Evaluate all defaults against `ctx` and produce the run configuration.
    pub fn resolve(&self, ctx: &PipelineContext) -> Result<DeployConfig, ConfigError> {
        let bucket = self
            .bucket
            .clone()
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingRequired("bucket"))?;

        let dist_dir = non_empty_path(self.dist_dir.as_ref())
            .or_else(|| non_empty_path(ctx.dist_dir.as_ref()))
            .ok_or(ConfigError::MissingDistDir)?;

        let revision_key = non_empty(self.revision_key.as_ref())
            .or_else(|| non_empty(ctx.command_options.revision.as_ref()))
            .or_else(|| non_empty(ctx.revision_data.as_ref().map(|d| &d.revision_key)))
            .ok_or(ConfigError::MissingRevisionKey)?;

        Ok(DeployConfig {
            bucket,
            prefix: self.prefix.clone().filter(|v| !v.is_empty()),
            archive_path: self
                .archive_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ARCHIVE_PATH)),
            archive_type: self
                .archive_type
                .clone()
                .unwrap_or_else(|| DEFAULT_ARCHIVE_TYPE.to_owned()),
            deploy_archive: self
                .deploy_archive
                .clone()
                .unwrap_or_else(|| DEFAULT_DEPLOY_ARCHIVE.to_owned()),
            deploy_info: self
                .deploy_info
                .clone()
                .unwrap_or_else(|| DEFAULT_DEPLOY_INFO.to_owned()),
            dist_dir,
            revision_key,
        })
    }
}

/// Settings needed to construct an S3 client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientOptions {
    /// Region, if configured.
    pub region: Option<String>,
    /// Endpoint URL, if configured.
    pub endpoint: Option<String>,
    /// Static access key id.
    pub access_key_id: Option<String>,
    /// Static secret access key.
    pub secret_access_key: Option<String>,
    /// Use path-style bucket addressing.
    pub force_path_style: bool,
}

/// Resolved configuration for one deploy run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployConfig {
    /// Target bucket.
    pub bucket: String,
    /// Key prefix, never empty when present.
    pub prefix: Option<String>,
    /// Local staging directory for the archive.
    pub archive_path: PathBuf,
    /// Archive format identifier, also the file extension.
    pub archive_type: String,
    /// Archive base name and in-archive root folder.
    pub deploy_archive: String,
    /// Descriptor object key before prefixing.
    pub deploy_info: String,
    /// Directory to archive.
    pub dist_dir: PathBuf,
    /// Revision identifier.
    pub revision_key: String,
}

impl DeployConfig {
    /// `{deployArchive}-{revisionKey}.{archiveType}`.
    #[must_use]
    pub fn archive_name(&self) -> String {
        build_archive_name(&self.deploy_archive, &self.revision_key, &self.archive_type)
    }

    /// Local path of the archive file.
    #[must_use]
    pub fn archive_file(&self) -> PathBuf {
        self.archive_path.join(self.archive_name())
    }

    /// Object key of the uploaded archive.
    #[must_use]
    pub fn archive_key(&self) -> String {
        object_key(self.prefix.as_deref(), &self.archive_name())
    }

    /// Object key of the deploy descriptor.
    #[must_use]
    pub fn deploy_info_key(&self) -> String {
        object_key(self.prefix.as_deref(), &self.deploy_info)
    }

    /// Descriptor pointing at this run's artifact.
    #[must_use]
    pub fn descriptor(&self) -> DeployDescriptor {
        DeployDescriptor {
            bucket: self.bucket.clone(),
            key: self.archive_key(),
        }
    }
}

fn is_set(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

fn non_empty_path(value: Option<&PathBuf>) -> Option<PathBuf> {
    value.filter(|p| !p.as_os_str().is_empty()).cloned()
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
