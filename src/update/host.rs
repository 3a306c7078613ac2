//! Collaborators chosen once from [`HostMode`].
//!
//! | Mode        | Version record                          | Files                 | Restart             |
//! |-------------|-----------------------------------------|-----------------------|---------------------|
//! | `native`    | `version.json` in the install directory | written to the install directory | relaunch or manual |
//! | `sandboxed` | key `gameVersion` in `storage.json` of the data dir | logged, not written | reload |

use super::file_sync::{Classification, DiscardingWriter, FileWriter, LocalFileWriter, WriteOutcome};
use super::orchestrator::UpdateOrchestrator;
use super::remote::GitHubClient;
use super::restart::RestartAction;
use super::version_store::{FileStore, KeyedStore, PersistentStore, VersionStore};
use crate::config::{HostMode, UpdaterConfig};
use crate::constants::{VERSION_FILE_NAME, VERSION_STORE_KEY};
use crate::core::Result;
use std::path::PathBuf;

/// File name of the keyed store inside the data directory.
pub const KEYED_STORE_FILE_NAME: &str = "storage.json";

/// Version record location for either host mode.
#[derive(Debug, Clone)]
pub enum HostStore {
    File(FileStore),
    Keyed(KeyedStore),
}

impl PersistentStore for HostStore {
    fn read(&self) -> Result<Option<String>> {
        match self {
            Self::File(store) => store.read(),
            Self::Keyed(store) => store.read(),
        }
    }

    fn write(&self, contents: &str) -> Result<()> {
        match self {
            Self::File(store) => store.write(contents),
            Self::Keyed(store) => store.write(contents),
        }
    }
}

/// File destination for either host mode.
#[derive(Debug, Clone)]
pub enum HostWriter {
    Local(LocalFileWriter),
    Discarding(DiscardingWriter),
}

impl FileWriter for HostWriter {
    fn write_file(
        &self,
        path: &str,
        bytes: &[u8],
        classification: Classification,
    ) -> Result<WriteOutcome> {
        match self {
            Self::Local(writer) => writer.write_file(path, bytes, classification),
            Self::Discarding(writer) => writer.write_file(path, bytes, classification),
        }
    }
}

/// The orchestrator as assembled from configuration.
pub type GameUpdater = UpdateOrchestrator<GitHubClient, HostStore, HostWriter>;

/// Everything the CLI needs for one run.
pub struct HostSetup {
    pub updater: GameUpdater,
    pub restart: RestartAction,
    pub install_dir: PathBuf,
}

impl HostSetup {
    /// Build the updater for `config`, placing state under `data_dir` in sandboxed mode.
    pub fn new(config: &UpdaterConfig, data_dir: PathBuf) -> anyhow::Result<Self> {
        let install_dir = config.install_dir()?;
        let (store, writer) = match config.mode {
            HostMode::Native => (
                HostStore::File(FileStore::new(install_dir.join(VERSION_FILE_NAME))),
                HostWriter::Local(LocalFileWriter::new(&install_dir)),
            ),
            HostMode::Sandboxed => (
                HostStore::Keyed(KeyedStore::new(
                    data_dir.join(KEYED_STORE_FILE_NAME),
                    VERSION_STORE_KEY,
                )),
                HostWriter::Discarding(DiscardingWriter),
            ),
        };

        let updater = UpdateOrchestrator::new(GitHubClient::new(config)?, VersionStore::new(store), writer)
            .with_policy(config.consistency)
            .with_max_parallel(config.max_parallel);

        Ok(Self {
            updater,
            restart: RestartAction::from_config(config, install_dir.clone()),
            install_dir,
        })
    }
}
