//! Object store seam.
//!
//! The step publishes through the [`ObjectStore`] trait so a host can pass
//! in its own client. [`S3ObjectStore`] talks to S3 or any S3-compatible
//! endpoint through the AWS SDK; [`MemoryObjectStore`] keeps objects in
//! process for tests and dry runs.
//!
//! # Object safety
//!
//! The trait uses `#[async_trait]` so it can be shared as
//! `Arc<dyn ObjectStore>` between the host and the step.

mod memory;
mod s3;

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;

pub use memory::{MemoryObjectStore, StoredObject};
pub use s3::S3ObjectStore;

/// Boxed error from an underlying client.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Body of an object to store.
#[derive(Debug, Clone)]
pub enum ObjectBody {
    /// A local file, streamed from disk.
    File(PathBuf),
    /// In-memory bytes.
    Bytes(Bytes),
}

/// A single "put object" request.
#[derive(Debug, Clone)]
pub struct PutObjectRequest {
    /// Target bucket.
    pub bucket: String,
    /// Target key.
    pub key: String,
    /// Object body.
    pub body: ObjectBody,
    /// Optional `Content-Type`.
    pub content_type: Option<String>,
}

/// Errors reported by an [`ObjectStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The body could not be opened for streaming.
    #[error("failed to open object body {}", .path.display())]
    Body {
        /// Local file backing the body.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: BoxError,
    },

    /// The store rejected the request.
    #[error("failed to put s3://{bucket}/{key}")]
    Put {
        /// Target bucket.
        bucket: String,
        /// Target key.
        key: String,
        /// Underlying client error.
        #[source]
        source: BoxError,
    },
}

/// Write access to an S3-compatible object store.
#[async_trait]
pub trait ObjectStore: Send + Sync + fmt::Debug {
    /// Store a single object, replacing any existing object at the key.
    async fn put_object(&self, request: PutObjectRequest) -> Result<(), StoreError>;
}
