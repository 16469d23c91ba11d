//! In-process object store.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use super::{ObjectBody, ObjectStore, PutObjectRequest, StoreError};

/// An object held by [`MemoryObjectStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object body.
    pub body: Bytes,
    /// `Content-Type` given at upload.
    pub content_type: Option<String>,
}

/// [`ObjectStore`] that keeps every object in memory, keyed by
/// `(bucket, key)`.
///
/// # Examples
///
/// ```
/// use fastboot_s3_core::MemoryObjectStore;
///
/// let store = MemoryObjectStore::new();
/// assert!(store.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: DashMap<(String, String), StoredObject>,
}

impl MemoryObjectStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a stored object.
    #[must_use]
    pub fn get(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .get(&(bucket.to_owned(), key.to_owned()))
            .map(|v| v.clone())
    }

    /// Sorted keys stored in `bucket`.
    #[must_use]
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .iter()
            .filter(|entry| entry.key().0 == bucket)
            .map(|entry| entry.key().1.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Number of stored objects across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the store holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(&self, request: PutObjectRequest) -> Result<(), StoreError> {
        let body = match request.body {
            ObjectBody::File(path) => match tokio::fs::read(&path).await {
                Ok(data) => Bytes::from(data),
                Err(e) => {
                    return Err(StoreError::Body {
                        path,
                        source: Box::new(e),
                    });
                }
            },
            ObjectBody::Bytes(bytes) => bytes,
        };

        self.objects.insert(
            (request.bucket, request.key),
            StoredObject {
                body,
                content_type: request.content_type,
            },
        );
        Ok(())
    }
}
