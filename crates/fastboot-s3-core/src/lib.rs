//! Archive-and-publish deploy step for FastBoot-style web applications.
//!
//! This crate packs a built application directory into a single compressed
//! archive and publishes it, together with a small JSON deploy descriptor,
//! to an S3-compatible object store. It is driven by a host pipeline through
//! four ordered phases.
//!
//! # Architecture
//!
//! ```text
//! DeploySettings + PipelineContext
//!        |  configure / setup / resolve
//!        v
//! DeployConfig (immutable)  +  DeployRun (object store)
//!        |
//!        v
//! prepare (archive) -> upload (artifact) -> activate (descriptor)
//! ```
//!
//! [`pipeline::run`] sequences the phases; hosts with their own lifecycle
//! can call the [`ArchivePublishStep`] phases directly.

pub mod archive;
pub mod config;
pub mod context;
pub mod error;
pub mod log;
pub mod naming;
pub mod pipeline;
pub mod step;
pub mod store;

pub use config::{ClientOptions, DeployConfig, DeploySettings};
pub use context::{CommandOptions, PipelineContext, RevisionData};
pub use error::{ConfigError, DeployError, DeployResult, OperationError, Phase};
pub use pipeline::DeployOutcome;
pub use step::{ArchivePublishStep, DeployRun};
pub use store::{MemoryObjectStore, ObjectStore, S3ObjectStore};
