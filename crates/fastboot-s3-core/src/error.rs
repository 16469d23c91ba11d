//! Error types for the deploy step.
//!
//! Two kinds of failure exist. A [`ConfigError`] is raised before any I/O
//! when the settings cannot support a deploy. An [`OperationError`] wraps
//! whatever the archiver or the object store reported during a phase,
//! tagged with the phase it happened in.

use std::fmt;

use crate::archive::ArchiveError;
use crate::store::StoreError;

/// Configuration problems detected before any file or network I/O.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required setting was not supplied.
    #[error("Missing required config: `{0}`")]
    MissingRequired(&'static str),

    /// Neither a region nor an endpoint is available to build a client.
    #[error("You must configure either an 'endpoint' or a 'region' to use the S3 client.")]
    MissingRegionOrEndpoint,

    /// No build output directory was configured or provided by the host.
    #[error("no `distDir` configured and the pipeline did not provide one")]
    MissingDistDir,

    /// No revision key was configured, passed on the command line, or
    /// attached as revision data.
    #[error("no `revisionKey` configured, passed as --revision, or found in revision data")]
    MissingRevisionKey,

    /// A settings file could not be read.
    #[error("failed to read settings file {path}")]
    Read {
        /// Path of the settings file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A settings file is not valid JSON for [`crate::DeploySettings`].
    #[error("failed to parse settings file {path}")]
    Parse {
        /// Path of the settings file.
        path: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Lifecycle phase of the deploy step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Settings validation.
    Configure,
    /// Object store construction.
    Setup,
    /// Archive creation.
    Prepare,
    /// Artifact upload.
    Upload,
    /// Deploy descriptor upload.
    Activate,
}

impl Phase {
    /// Lowercase phase name used in logs and messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configure => "configure",
            Self::Setup => "setup",
            Self::Prepare => "prepare",
            Self::Upload => "upload",
            Self::Activate => "activate",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The underlying failure behind an [`OperationError`].
#[derive(Debug, thiserror::Error)]
pub enum OperationCause {
    /// The archiver failed.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// The object store rejected a request.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The deploy descriptor could not be encoded.
    #[error("failed to encode deploy descriptor")]
    Descriptor(#[from] serde_json::Error),
}

/// A failure reported by a collaborator during a phase.
#[derive(Debug, thiserror::Error)]
#[error("{phase} failed")]
pub struct OperationError {
    /// Phase that failed.
    pub phase: Phase,
    /// The underlying error.
    #[source]
    pub cause: OperationCause,
}

/// Top-level error returned by every phase.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// Invalid or incomplete configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A collaborator failed while a phase was running.
    #[error(transparent)]
    Operation(#[from] OperationError),
}

impl DeployError {
    /// Phase an operation error happened in, `None` for configuration errors.
    #[must_use]
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::Config(_) => None,
            Self::Operation(e) => Some(e.phase),
        }
    }
}

/// Convenience result type for deploy operations.
pub type DeployResult<T> = Result<T, DeployError>;
