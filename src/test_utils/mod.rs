//! Test utilities for the updater
//!
//! In-memory collaborators for driving [`UpdateOrchestrator`](crate::update::UpdateOrchestrator)
//! without a network or file system, plus one-time logging setup.
//!
//! # Example
//!
//! ```rust,no_run
//! use game_updater::test_utils::{FakeRemote, RecordingWriter};
//! use game_updater::update::{MemoryStore, UpdateOrchestrator, VersionStore};
//!
//! let remote = FakeRemote::new("bbb222").with_text_file("index.html", "<html>");
//! let orchestrator = UpdateOrchestrator::new(
//!     remote,
//!     VersionStore::new(MemoryStore::new()),
//!     RecordingWriter::default(),
//! );
//! ```

pub mod fakes;

pub use fakes::{FakeRemote, RecordingObserver, RecordingWriter};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=game_updater=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
