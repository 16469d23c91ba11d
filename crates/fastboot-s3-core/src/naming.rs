//! Archive names, object keys and the deploy descriptor.
//!
//! Every phase derives names from the resolved configuration through these
//! functions, so the artifact written by `prepare` is the one `upload` sends
//! and the one `activate` points at.

use serde::{Deserialize, Serialize};

/// Build the archive file name for a revision.
///
/// # Examples
///
/// ```
/// use fastboot_s3_core::naming::build_archive_name;
///
/// assert_eq!(build_archive_name("dist", "abc123", "zip"), "dist-abc123.zip");
/// ```
#[must_use]
pub fn build_archive_name(deploy_archive: &str, revision_key: &str, archive_type: &str) -> String {
    format!("{deploy_archive}-{revision_key}.{archive_type}")
}

/// Place `name` under an optional key prefix.
///
/// An empty prefix is treated as no prefix.
///
/// # Examples
///
/// ```
/// use fastboot_s3_core::naming::object_key;
///
/// assert_eq!(object_key(Some("releases"), "dist-abc123.zip"), "releases/dist-abc123.zip");
/// assert_eq!(object_key(None, "dist-abc123.zip"), "dist-abc123.zip");
/// ```
#[must_use]
pub fn object_key(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}/{name}"),
        _ => name.to_owned(),
    }
}

/// Pointer to the artifact published for the active revision.
///
/// Serialized as `{"bucket":"…","key":"…"}`; field order is fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployDescriptor {
    /// Bucket holding the artifact.
    pub bucket: String,
    /// Object key of the artifact.
    pub key: String,
}

impl DeployDescriptor {
    /// Encode as compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_build_archive_name() {
        assert_eq!(build_archive_name("dist", "abc123", "zip"), "dist-abc123.zip");
        assert_eq!(
            build_archive_name("app", "2024-01-01", "tar.gz"),
            "app-2024-01-01.tar.gz"
        );
    }

    #[test]
    fn test_should_prefix_object_key() {
        assert_eq!(object_key(Some("releases"), "a.zip"), "releases/a.zip");
        assert_eq!(object_key(Some("a/b"), "info.json"), "a/b/info.json");
    }

    #[test]
    fn test_should_not_prefix_without_prefix() {
        assert_eq!(object_key(None, "a.zip"), "a.zip");
        assert_eq!(object_key(Some(""), "a.zip"), "a.zip");
    }

    #[test]
    fn test_should_serialize_descriptor_exactly() {
        let descriptor = DeployDescriptor {
            bucket: "my-bucket".to_owned(),
            key: "releases/dist-abc123.zip".to_owned(),
        };
        let json = descriptor.to_json().expect("encode descriptor");
        assert_eq!(
            json,
            r#"{"bucket":"my-bucket","key":"releases/dist-abc123.zip"}"#
        );
    }

    #[test]
    fn test_should_escape_descriptor_strings() {
        let descriptor = DeployDescriptor {
            bucket: "b".to_owned(),
            key: "we\"ird".to_owned(),
        };
        let json = descriptor.to_json().expect("encode descriptor");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        let object = value.as_object().expect("json object");
        assert_eq!(object.len(), 2);
        assert_eq!(object["bucket"], "b");
        assert_eq!(object["key"], "we\"ird");
    }
}
