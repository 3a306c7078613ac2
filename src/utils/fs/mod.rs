//! File system utilities used when writing synced files and the version record.
//!
//! - **Atomic writes**: content is written to a temp file and renamed into place
//! - **Idempotent directories**: parent directories are created on demand
//! - **JSON I/O**: typed read/write of small JSON documents

pub mod atomic;
pub mod dirs;
pub mod formats;

pub use atomic::{atomic_write, safe_write};
pub use dirs::{ensure_dir, ensure_parent_dir};
pub use formats::{read_json_file, write_json_file};
