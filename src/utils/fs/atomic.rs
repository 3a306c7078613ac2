//! Atomic file write operations using temp-and-rename strategy.
//!
//! A reader never observes a half-written game file: content goes to a
//! temporary file in the destination directory, is synced, then renamed over
//! the target.

use crate::core::file_error::{FileOperation, FileOperationError, FileResultExt};
use crate::utils::fs::dirs::ensure_parent_dir;
use std::io::Write;
use std::path::Path;

/// Safely writes a string to a file using atomic operations.
///
/// # Examples
///
/// ```rust,no_run
/// use game_updater::utils::fs::safe_write;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// safe_write(Path::new("install/game.js"), "console.log('hi');")?;
/// # Ok(())
/// # }
/// ```
pub fn safe_write(path: &Path, content: &str) -> Result<(), FileOperationError> {
    atomic_write(path, content.as_bytes())
}

/// Atomically writes bytes to a file.
///
/// Parent directories are created if they don't exist. The temporary file is
/// created next to the target so the final rename never crosses filesystems.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), FileOperationError> {
    ensure_parent_dir(path)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::Builder::new()
        .prefix(".game-updater-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .with_file_context(FileOperation::Write, dir, "creating temp file")?;

    temp.write_all(content).with_file_context(
        FileOperation::Write,
        temp.path(),
        "writing temp file",
    )?;
    temp.as_file().sync_all().with_file_context(
        FileOperation::Write,
        temp.path(),
        "syncing temp file",
    )?;

    temp.persist(path).map_err(|e| {
        FileOperationError::new(FileOperation::Rename, path, "moving temp file into place", e.error)
    })?;

    Ok(())
}
