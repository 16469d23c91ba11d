//! End-to-end deploy tests.

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::sync::Arc;

    use fastboot_s3_core::naming::DeployDescriptor;
    use fastboot_s3_core::step::PLUGIN_NAME;
    use fastboot_s3_core::{
        ArchivePublishStep, DeployError, DeploySettings, PipelineContext, S3ObjectStore, pipeline,
    };

    use crate::{cleanup_bucket, create_test_bucket, endpoint_url, get_object, s3_client, write_build};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_publish_archive_and_descriptor() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "deploy").await;
        let root = write_build();

        let settings = DeploySettings::builder()
            .bucket(bucket.clone())
            .prefix("releases")
            .archive_path(root.path().join("tmp"))
            .s3_client(Arc::new(S3ObjectStore::new(client.clone())))
            .build();
        let step = ArchivePublishStep::new(PLUGIN_NAME, settings);
        let ctx = PipelineContext::new(root.path().join("build")).with_revision("abc123");

        let outcome = pipeline::run(&step, &ctx).await.expect("deploy");
        assert_eq!(outcome.archive_key, "releases/dist-abc123.zip");

        let descriptor = get_object(&client, &bucket, "releases/fastboot-deploy-info.json").await;
        let descriptor: DeployDescriptor =
            serde_json::from_slice(&descriptor).expect("descriptor json");
        assert_eq!(
            descriptor,
            DeployDescriptor {
                bucket: bucket.clone(),
                key: "releases/dist-abc123.zip".to_owned(),
            }
        );

        let archive = get_object(&client, &bucket, &descriptor.key).await;
        let mut archive =
            zip::ZipArchive::new(std::io::Cursor::new(archive)).expect("read uploaded zip");
        let mut index = String::new();
        archive
            .by_name("dist/index.html")
            .expect("index entry")
            .read_to_string(&mut index)
            .expect("read index");
        assert_eq!(index, "<html>fastboot</html>");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_build_client_from_endpoint_settings() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "endpoint").await;
        let root = write_build();

        let settings = DeploySettings::builder()
            .bucket(bucket.clone())
            .endpoint(endpoint_url())
            .access_key_id("test")
            .secret_access_key("test")
            .force_path_style(true)
            .archive_path(root.path().join("tmp"))
            .archive_type("tar.gz")
            .build();
        let step = ArchivePublishStep::new(PLUGIN_NAME, settings);
        let ctx = PipelineContext::new(root.path().join("build")).with_revision_data("r7");

        let outcome = pipeline::run(&step, &ctx).await.expect("deploy");
        assert_eq!(outcome.archive_key, "dist-r7.tar.gz");

        let descriptor = get_object(&client, &bucket, "fastboot-deploy-info.json").await;
        assert_eq!(
            String::from_utf8(descriptor).expect("utf8"),
            format!(r#"{{"bucket":"{bucket}","key":"dist-r7.tar.gz"}}"#)
        );

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_fail_upload_to_missing_bucket() {
        let client = s3_client();
        let root = write_build();

        let settings = DeploySettings::builder()
            .bucket("test-missing-bucket-fastboot")
            .archive_path(root.path().join("tmp"))
            .s3_client(Arc::new(S3ObjectStore::new(client)))
            .build();
        let step = ArchivePublishStep::new(PLUGIN_NAME, settings);
        let ctx = PipelineContext::new(root.path().join("build")).with_revision("r1");

        let err = pipeline::run(&step, &ctx).await.expect_err("upload should fail");
        assert!(matches!(err, DeployError::Operation(_)));
        assert_eq!(err.phase().map(|p| p.as_str()), Some("upload"));
    }
}
