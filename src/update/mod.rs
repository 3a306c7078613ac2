//! Game update engine.
//!
//! Keeps an installed game in sync with the head of a branch in a remote
//! repository. The installed revision is remembered in a small JSON record;
//! when the remote head differs, and the user confirms, every non-excluded
//! file is downloaded and written in listing order, and the record is
//! advanced.
//!
//! # Components
//!
//! - [`version_store`]: the installed-revision record and where it is persisted
//! - [`remote`]: read-only repository access ([`RemoteRepository`], [`GitHubClient`])
//! - [`exclusion`]: host files that are never overwritten
//! - [`file_sync`]: binary/text classification and file writers
//! - [`orchestrator`]: the check/apply state machine with progress and the update log
//! - [`restart`]: relaunch or reload after a completed update
//! - [`host`]: collaborators selected from [`HostMode`](crate::config::HostMode)
//!
//! # Example
//!
//! ```rust,no_run
//! use game_updater::config::UpdaterConfig;
//! use game_updater::update::{HostSetup, NoopObserver, UpdateState};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = UpdaterConfig::default();
//! let mut setup = HostSetup::new(&config, UpdaterConfig::data_dir()?)?;
//!
//! if let UpdateState::UpdateAvailable { .. } = setup.updater.check(&NoopObserver).await {
//!     setup.updater.apply(&NoopObserver).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod exclusion;
pub mod file_sync;
pub mod host;
pub mod log;
pub mod orchestrator;
pub mod remote;
pub mod restart;
pub mod version_store;


pub use exclusion::{EXCLUDED_FRAGMENTS, ExclusionSet};
pub use file_sync::{
    Classification, DiscardingWriter, FileWriter, LocalFileWriter, WriteOutcome, classify,
};
pub use host::{GameUpdater, HostSetup, HostStore, HostWriter};
pub use log::{LogEntry, LogLevel, UpdateLog};
pub use orchestrator::{
    ApplyReport, CancellationFlag, ConsistencyPolicy, FileFailure, MarkerOutcome, NoopObserver,
    UpdateObserver, UpdateOrchestrator, UpdateSession, UpdateState, progress_fraction,
};
pub use remote::{
    EntryKind, FileContent, GitHubClient, RemoteFileEntry, RemoteRepository, RevisionDescriptor,
    short_revision,
};
pub use restart::RestartAction;
pub use version_store::{
    FileStore, KeyedStore, MemoryStore, PersistentStore, VersionRecord, VersionStore,
};
