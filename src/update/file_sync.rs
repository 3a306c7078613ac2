//! Classifying downloaded files and writing them into the install directory.
//!
//! A file is binary when its extension is a known media/archive extension or
//! when the server declares a binary media type. Binary content is written
//! byte for byte; text is decoded as UTF-8 (invalid sequences replaced) and
//! written as text.
//!
//! [`LocalFileWriter`] writes atomically below a root directory and refuses
//! any path that would escape it. [`DiscardingWriter`] is used when the host
//! has no writable install directory.

use crate::core::{Result, UpdaterError};
use crate::utils::fs::{atomic_write, safe_write};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Extensions (lowercase, without dot) treated as binary.
pub const BINARY_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "ico", "mp3", "wav", "mp4", "avi", "mov", "pdf", "zip",
    "rar",
];

const BINARY_MEDIA_PREFIXES: &[&str] = &["image/", "audio/", "video/"];
const OCTET_STREAM: &str = "application/octet-stream";

/// How a downloaded file is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Binary,
    Text,
}

/// Decide how to write `path`, given the server's `Content-Type` if any.
pub fn classify(path: &str, content_type: Option<&str>) -> Classification {
    if has_binary_extension(path) || content_type.is_some_and(is_binary_media_type) {
        Classification::Binary
    } else {
        Classification::Text
    }
}

fn has_binary_extension(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rsplit_once('.').is_some_and(|(_, ext)| {
        let ext = ext.to_ascii_lowercase();
        BINARY_EXTENSIONS.contains(&ext.as_str())
    })
}

fn is_binary_media_type(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    media_type == OCTET_STREAM
        || BINARY_MEDIA_PREFIXES
            .iter()
            .any(|prefix| media_type.starts_with(prefix))
}

/// Result of handing one file to a [`FileWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was persisted at `path`.
    Written { path: PathBuf, bytes: usize },
    /// The host cannot persist files; the content was dropped.
    Skipped,
}

/// Destination for downloaded files.
pub trait FileWriter {
    /// Write `bytes` at the repository-relative `path`.
    fn write_file(
        &self,
        path: &str,
        bytes: &[u8],
        classification: Classification,
    ) -> Result<WriteOutcome>;
}

/// Writes files below a root directory, creating parent directories.
#[derive(Debug, Clone)]
pub struct LocalFileWriter {
    root: PathBuf,
}

impl LocalFileWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a repository path below the root.
    ///
    /// # Errors
    ///
    /// [`UpdaterError::InvalidPath`] for empty or absolute paths and for paths
    /// with `..` components.
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        let invalid = || UpdaterError::InvalidPath {
            path: path.to_string(),
        };

        let mut resolved = self.root.clone();
        let mut depth = 0;
        for component in Path::new(path).components() {
            match component {
                Component::Normal(segment) => {
                    resolved.push(segment);
                    depth += 1;
                }
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(invalid());
                }
            }
        }

        if depth == 0 {
            return Err(invalid());
        }
        Ok(resolved)
    }
}

impl FileWriter for LocalFileWriter {
    fn write_file(
        &self,
        path: &str,
        bytes: &[u8],
        classification: Classification,
    ) -> Result<WriteOutcome> {
        let target = self.resolve(path)?;
        match classification {
            Classification::Binary => atomic_write(&target, bytes)?,
            Classification::Text => safe_write(&target, &String::from_utf8_lossy(bytes))?,
        }
        debug!("Wrote {} ({} bytes, {:?})", target.display(), bytes.len(), classification);
        Ok(WriteOutcome::Written {
            path: target,
            bytes: bytes.len(),
        })
    }
}

/// Accepts files without persisting them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardingWriter;

impl FileWriter for DiscardingWriter {
    fn write_file(
        &self,
        path: &str,
        bytes: &[u8],
        _classification: Classification,
    ) -> Result<WriteOutcome> {
        info!("Sandboxed host cannot persist {} ({} bytes)", path, bytes.len());
        Ok(WriteOutcome::Skipped)
    }
}
