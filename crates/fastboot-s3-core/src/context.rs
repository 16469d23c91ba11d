//! Pipeline context handed to every phase by the host.

use std::path::PathBuf;
use std::sync::Arc;

use crate::store::ObjectStore;

/// Options the host parsed from its own command line.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Explicit revision requested by the operator (e.g. `--revision`).
    pub revision: Option<String>,
}

/// Revision metadata attached by an earlier pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionData {
    /// Identifier of the revision being deployed.
    pub revision_key: String,
}

/// Host pipeline state visible to the step.
///
/// The host fills this in before each phase; the step only reads it.
#[derive(Debug, Clone, Default)]
pub struct PipelineContext {
    /// Build output directory produced by the host.
    pub dist_dir: Option<PathBuf>,
    /// Parsed command-line options.
    pub command_options: CommandOptions,
    /// Revision metadata, once a revision step has run.
    pub revision_data: Option<RevisionData>,
    /// Object store shared by the host, if any.
    pub s3_client: Option<Arc<dyn ObjectStore>>,
}

impl PipelineContext {
    /// Create a context for the given build output directory.
    #[must_use]
    pub fn new(dist_dir: impl Into<PathBuf>) -> Self {
        Self {
            dist_dir: Some(dist_dir.into()),
            ..Self::default()
        }
    }

    /// Set the command-line revision override.
    #[must_use]
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.command_options.revision = Some(revision.into());
        self
    }

    /// Attach revision metadata.
    #[must_use]
    pub fn with_revision_data(mut self, revision_key: impl Into<String>) -> Self {
        self.revision_data = Some(RevisionData {
            revision_key: revision_key.into(),
        });
        self
    }

    /// Share an object store with the step.
    #[must_use]
    pub fn with_s3_client(mut self, client: Arc<dyn ObjectStore>) -> Self {
        self.s3_client = Some(client);
        self
    }
}
