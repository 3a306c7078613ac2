//! Core types for the game updater
//!
//! - `error` - [`UpdaterError`], the typed error for every library operation, and
//!   [`ErrorContext`]/[`user_friendly_error`] for CLI presentation
//! - `file_error` - [`FileOperationError`] and the [`FileResultExt`] extension used to
//!   attach path and purpose to raw I/O errors

pub mod error;
pub mod file_error;

pub use error::{ErrorContext, UpdaterError, user_friendly_error};
pub use file_error::{FileOperation, FileOperationError, FileResultExt};

/// Result alias used across the library.
pub type Result<T, E = UpdaterError> = std::result::Result<T, E>;
