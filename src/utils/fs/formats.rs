//! JSON file I/O.

use crate::core::UpdaterError;
use crate::core::file_error::{FileOperation, FileResultExt};
use std::path::Path;

/// Reads and parses a JSON file.
///
/// # Errors
///
/// Returns [`UpdaterError::FileOperation`] if the file cannot be read and
/// [`UpdaterError::Parse`] if it does not contain valid JSON for `T`.
pub fn read_json_file<T>(path: &Path) -> Result<T, UpdaterError>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path).with_file_context(
        FileOperation::Read,
        path,
        "reading JSON file",
    )?;
    serde_json::from_str(&content).map_err(|e| UpdaterError::Parse {
        what: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Serializes `data` as JSON and writes it atomically.
///
/// `pretty` selects two-space indented output.
pub fn write_json_file<T>(path: &Path, data: &T, pretty: bool) -> Result<(), UpdaterError>
where
    T: serde::Serialize,
{
    let json = if pretty {
        serde_json::to_string_pretty(data)
    } else {
        serde_json::to_string(data)
    }
    .map_err(|e| UpdaterError::Parse {
        what: format!("JSON for {}", path.display()),
        reason: e.to_string(),
    })?;

    super::atomic::safe_write(path, &json)?;
    Ok(())
}
