//! Directory packing.
//!
//! [`pack_directory`] writes every file under a source directory into a
//! single archive, nested under one root folder. Archive formats are chosen
//! by the `archiveType` string:
//!
//! | `archiveType` | Format | Compression |
//! |---------------|--------|-------------|
//! | `zip` | zip | deflate, level 9 |
//! | `tar` | tar | none |
//! | `tar.gz`, `tgz` | tar | gzip, best |
//!
//! Packing is synchronous file I/O and runs on the blocking pool. The
//! returned future completes only after the archive has been flushed and
//! synced to disk. A failed pack leaves any partial archive in place.

use std::fs::File;
use std::io::{self, BufWriter, Seek, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Highest deflate level supported by the zip writer.
const ZIP_COMPRESSION_LEVEL: i64 = 9;

/// Errors raised while packing a directory.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// The `archiveType` is not a known format.
    #[error("unsupported archive type: {0}")]
    UnsupportedFormat(String),

    /// The source path does not exist or is not a directory.
    #[error("source path is not a directory: {}", .path.display())]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// Reading a source file or writing the archive failed.
    #[error("I/O error on {}", .path.display())]
    Io {
        /// File being read or written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Walking the source directory failed.
    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    /// The zip writer failed.
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    /// The packing task panicked or was cancelled.
    #[error("archive task failed")]
    Task(#[from] tokio::task::JoinError),
}

impl ArchiveError {
    fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Supported archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Deflate-compressed zip.
    Zip,
    /// Uncompressed tar.
    Tar,
    /// Gzip-compressed tar.
    TarGz,
}

impl ArchiveFormat {
    /// MIME type used when uploading an archive of this format.
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Zip => "application/zip",
            Self::Tar => "application/x-tar",
            Self::TarGz => "application/gzip",
        }
    }
}

impl FromStr for ArchiveFormat {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zip" => Ok(Self::Zip),
            "tar" => Ok(Self::Tar),
            "tar.gz" | "tgz" => Ok(Self::TarGz),
            _ => Err(ArchiveError::UnsupportedFormat(s.to_owned())),
        }
    }
}

/// Pack `src` into `dest`, placing every entry under the folder `root`.
///
/// Returns the size of the written archive in bytes.
pub async fn pack_directory(
    src: &Path,
    root: &str,
    dest: &Path,
    format: ArchiveFormat,
) -> Result<u64, ArchiveError> {
    let src = src.to_path_buf();
    let root = root.to_owned();
    let dest = dest.to_path_buf();

    tokio::task::spawn_blocking(move || pack_blocking(&src, &root, &dest, format)).await?
}

fn pack_blocking(
    src: &Path,
    root: &str,
    dest: &Path,
    format: ArchiveFormat,
) -> Result<u64, ArchiveError> {
    if !src.is_dir() {
        return Err(ArchiveError::NotADirectory {
            path: src.to_path_buf(),
        });
    }

    debug!(src = %src.display(), dest = %dest.display(), ?format, "packing directory");

    let file = File::create(dest).map_err(ArchiveError::io(dest))?;
    let writer = BufWriter::new(file);

    let writer = match format {
        ArchiveFormat::Zip => write_zip(src, root, writer)?,
        ArchiveFormat::Tar => write_tar(src, root, writer)?,
        ArchiveFormat::TarGz => {
            let encoder = GzEncoder::new(writer, Compression::best());
            write_tar(src, root, encoder)?
                .finish()
                .map_err(ArchiveError::io(dest))?
        }
    };

    let file = writer
        .into_inner()
        .map_err(|e| ArchiveError::Io {
            path: dest.to_path_buf(),
            source: e.into_error(),
        })?;
    file.sync_all().map_err(ArchiveError::io(dest))?;

    let size = file.metadata().map_err(ArchiveError::io(dest))?.len();
    debug!(dest = %dest.display(), size, "archive written");
    Ok(size)
}

/// Walk `src` in a stable order, following symlinks, skipping `src` itself.
fn walk(src: &Path) -> impl Iterator<Item = walkdir::Result<DirEntry>> {
    WalkDir::new(src)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
}

/// In-archive name for `path`: `root` followed by the `/`-joined relative path.
fn entry_name(root: &str, src: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(src).ok()?;
    let mut name = root.to_owned();
    for component in relative.components() {
        name.push('/');
        name.push_str(&component.as_os_str().to_string_lossy());
    }
    Some(name)
}

fn write_zip<W: Write + Seek>(src: &Path, root: &str, writer: W) -> Result<W, ArchiveError> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(ZIP_COMPRESSION_LEVEL));

    zip.add_directory(format!("{root}/"), options)?;

    for entry in walk(src) {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = entry_name(root, src, path) else {
            continue;
        };
        let options = with_permissions(options, &entry)?;

        if entry.file_type().is_dir() {
            trace!(name = %name, "adding directory");
            zip.add_directory(format!("{name}/"), options)?;
        } else {
            trace!(name = %name, "adding file");
            zip.start_file(name, options)?;
            let mut file = File::open(path).map_err(ArchiveError::io(path))?;
            io::copy(&mut file, &mut zip).map_err(ArchiveError::io(path))?;
        }
    }

    Ok(zip.finish()?)
}

#[cfg(unix)]
fn with_permissions(
    options: SimpleFileOptions,
    entry: &DirEntry,
) -> Result<SimpleFileOptions, ArchiveError> {
    use std::os::unix::fs::PermissionsExt;

    let mode = entry.metadata()?.permissions().mode();
    Ok(options.unix_permissions(mode))
}

#[cfg(not(unix))]
fn with_permissions(
    options: SimpleFileOptions,
    _entry: &DirEntry,
) -> Result<SimpleFileOptions, ArchiveError> {
    Ok(options)
}

fn write_tar<W: Write>(src: &Path, root: &str, writer: W) -> Result<W, ArchiveError> {
    let mut builder = tar::Builder::new(writer);
    builder.follow_symlinks(true);

    builder
        .append_dir(root, src)
        .map_err(ArchiveError::io(src))?;

    for entry in walk(src) {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = entry_name(root, src, path) else {
            continue;
        };

        let appended = if entry.file_type().is_dir() {
            builder.append_dir(&name, path)
        } else {
            builder.append_path_with_name(path, &name)
        };
        appended.map_err(ArchiveError::io(path))?;
    }

    builder.into_inner().map_err(ArchiveError::io(src))
}
