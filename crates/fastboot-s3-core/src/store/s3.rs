//! AWS SDK backed object store.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use tracing::debug;

use super::{ObjectBody, ObjectStore, PutObjectRequest, StoreError};
use crate::config::ClientOptions;

/// Region used when none is configured and none can be discovered.
const FALLBACK_REGION: &str = "us-east-1";

/// Provider name attached to static credentials.
const CREDENTIALS_PROVIDER: &str = "fastboot-s3-deploy";

/// [`ObjectStore`] backed by [`aws_sdk_s3::Client`].
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    /// Wrap an existing client.
    #[must_use]
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }

    /// Build a client from deploy settings.
    ///
    /// The region is taken from `options`, then the default region chain,
    /// then `us-east-1`. Static credentials are used only when both keys are
    /// present; otherwise the default credential chain applies.
    pub async fn from_options(options: &ClientOptions) -> Self {
        let region = RegionProviderChain::first_try(options.region.clone().map(Region::new))
            .or_default_provider()
            .or_else(Region::new(FALLBACK_REGION));

        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region);

        if let (Some(access_key_id), Some(secret_access_key)) =
            (&options.access_key_id, &options.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key_id,
                secret_access_key,
                None,
                None,
                CREDENTIALS_PROVIDER,
            ));
        }

        if let Some(endpoint) = &options.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        let config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(options.force_path_style)
            .build();

        debug!(
            region = ?config.region(),
            endpoint = ?options.endpoint,
            force_path_style = options.force_path_style,
            "built S3 client"
        );

        Self::new(aws_sdk_s3::Client::from_conf(config))
    }

    /// The underlying SDK client.
    #[must_use]
    pub fn client(&self) -> &aws_sdk_s3::Client {
        &self.client
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, request: PutObjectRequest) -> Result<(), StoreError> {
        let PutObjectRequest {
            bucket,
            key,
            body,
            content_type,
        } = request;

        let body = match body {
            ObjectBody::File(path) => ByteStream::from_path(&path)
                .await
                .map_err(|e| StoreError::Body {
                    path,
                    source: Box::new(e),
                })?,
            ObjectBody::Bytes(bytes) => ByteStream::from(bytes),
        };

        self.client
            .put_object()
            .bucket(&bucket)
            .key(&key)
            .body(body)
            .set_content_type(content_type)
            .send()
            .await
            .map_err(|e| StoreError::Put {
                bucket: bucket.clone(),
                key: key.clone(),
                source: Box::new(e),
            })?;

        debug!(bucket = %bucket, key = %key, "put object");
        Ok(())
    }
}
