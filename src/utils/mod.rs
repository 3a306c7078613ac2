//! Cross-cutting utilities: file system helpers and terminal progress.

pub mod fs;
pub mod progress;
