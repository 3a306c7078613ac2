//! Directory creation helpers.

use crate::core::file_error::{FileOperation, FileOperationError, FileResultExt};
use std::path::Path;

/// Ensures a directory exists, creating it and all parent directories if necessary.
///
/// Idempotent: calling it on an existing directory is a no-op. A regular file at
/// the target path is an error.
///
/// # Examples
///
/// ```rust,no_run
/// use game_updater::utils::fs::ensure_dir;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// ensure_dir(Path::new("install/assets/sounds"))?;
/// # Ok(())
/// # }
/// ```
pub fn ensure_dir(path: &Path) -> Result<(), FileOperationError> {
    if path.is_dir() {
        return Ok(());
    }
    if path.exists() {
        return Err(FileOperationError::new(
            FileOperation::CreateDir,
            path,
            "creating directory",
            std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "path exists but is not a directory",
            ),
        ));
    }
    std::fs::create_dir_all(path).with_file_context(
        FileOperation::CreateDir,
        path,
        "creating directory",
    )
}

/// Ensures that the parent directory of a file path exists.
///
/// Paths without a parent (bare file names) need nothing and return `Ok(())`.
pub fn ensure_parent_dir(path: &Path) -> Result<(), FileOperationError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}
