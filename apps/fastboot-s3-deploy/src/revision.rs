//! File-hash revision data.
//!
//! When the operator does not pass `--revision`, the revision key is the hex
//! MD5 digest of the build's `index.html`, so identical builds map to the
//! same archive name.

use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use fastboot_s3_core::RevisionData;
use md5::{Digest, Md5};

/// File whose content identifies a build.
pub const REVISION_FILE: &str = "index.html";

/// Compute revision data for `dist_dir`, or `None` if it has no `index.html`.
pub fn file_hash(dist_dir: &Path) -> Result<Option<RevisionData>> {
    let path = dist_dir.join(REVISION_FILE);
    let data = match std::fs::read(&path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read {}", path.display()));
        }
    };

    Ok(Some(RevisionData {
        revision_key: hex::encode(Md5::digest(&data)),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_hash_index_html() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("index.html"), "hello").expect("write");

        let data = file_hash(dir.path()).expect("hash").expect("revision data");
        assert_eq!(data.revision_key, "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn test_should_return_none_without_index_html() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(file_hash(dir.path()).expect("hash").is_none());
    }
}
