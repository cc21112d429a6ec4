use std::path::{Path, PathBuf};

use compio::fs;
use snafu::{ResultExt, Snafu, ensure};
use tracing::debug;

use crate::ext::{AsyncTryFrom, BestEffortPathExt};

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Bytes of an uploaded file together with the descriptor the tree records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl FilePayload {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// A file on disk selected for upload, with the size limit that applies to it.
#[derive(Debug, Clone, Copy)]
pub struct UploadSource<'a> {
    pub path: &'a Path,
    pub max_bytes: u64,
}

impl<'a> UploadSource<'a> {
    pub fn new(path: &'a Path, max_bytes: u64) -> Self {
        Self { path, max_bytes }
    }
}

impl AsyncTryFrom<UploadSource<'_>> for FilePayload {
    type Error = PayloadError;

    async fn async_try_from(source: UploadSource<'_>) -> Result<Self, Self::Error> {
        let path = source.path;
        let metadata = path.metadata().context(PathSnafu { path })?;

        ensure!(!metadata.is_dir(), DirectorySnafu { path });
        // Devices and pipes report no meaningful length.
        ensure!(metadata.is_file(), NotAFileSnafu { path });
        ensure!(
            metadata.len() <= source.max_bytes,
            TooLargeSnafu {
                path,
                size: metadata.len(),
                limit: source.max_bytes,
            }
        );

        let bytes = fs::read(path).await.context(PathSnafu { path })?;
        // The file may have grown between stat and read.
        ensure!(
            bytes.len() as u64 <= source.max_bytes,
            TooLargeSnafu {
                path,
                size: bytes.len() as u64,
                limit: source.max_bytes,
            }
        );

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let media_type = mime_guess::from_path(path)
            .first()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_else(|| FALLBACK_MEDIA_TYPE.to_string());
        debug!(
            "Read upload {} ({} bytes, {})",
            path.best_effort_path_display(),
            bytes.len(),
            media_type
        );

        Ok(FilePayload::new(name, media_type, bytes))
    }
}

#[derive(Debug, Snafu)]
pub enum PayloadError {
    #[snafu(display("Failed to read upload {}", path.best_effort_path_display()))]
    PathError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("The upload {} is a directory", path.best_effort_path_display()))]
    DirectoryError { path: PathBuf },
    #[snafu(display("The upload {} is not a regular file", path.best_effort_path_display()))]
    NotAFile { path: PathBuf },
    #[snafu(display(
        "The upload {} is {} bytes, above the {} byte limit",
        path.best_effort_path_display(),
        size,
        limit
    ))]
    TooLarge { path: PathBuf, size: u64, limit: u64 },
}
