//! The check -> confirm -> apply state machine.
//!
//! ```text
//! Idle ──check()──> Checking ──┬──> UpToDate
//!                              ├──> UpdateAvailable ──apply()──> Applying ──┬──> Completed
//!                              └──> Failed                                  ├──> Cancelled
//!                                                                           └──> Failed
//! ```
//!
//! Nothing is downloaded until [`UpdateOrchestrator::apply`] is called on a
//! pending update. Failures never escape `check`/`apply` as errors; they end in
//! [`UpdateState::Failed`] with an update log entry, and the underlying error
//! can be retrieved once with [`UpdateOrchestrator::take_error`].
//!
//! Files are processed in listing order. Per-file failures are logged and
//! counted without stopping the batch. Whether a batch with failures advances
//! the stored revision is decided by [`ConsistencyPolicy`].

use super::exclusion::ExclusionSet;
use super::file_sync::{FileWriter, WriteOutcome, classify};
use super::log::{LogEntry, LogLevel, UpdateLog};
use super::remote::{RemoteFileEntry, RemoteRepository, RevisionDescriptor, short_revision};
use super::version_store::{PersistentStore, VersionRecord, VersionStore};
use crate::core::{Result, UpdaterError};
use chrono::{SecondsFormat, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

/// Whether a batch with per-file failures advances the revision marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConsistencyPolicy {
    /// Advance after every completed batch, logging a warning on failures.
    #[default]
    AlwaysAdvance,
    /// Keep the previous marker unless every file succeeded, so the next
    /// check offers the update again.
    RequireFullSuccess,
}

#[derive(Debug, Default)]
struct CancellationState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Shared flag that stops an in-progress apply.
///
/// Setting it interrupts the apply immediately, including a download that is
/// still in flight. Files already written stay written.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<CancellationState>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.cancelled.store(true, Ordering::SeqCst);
        self.0.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.cancelled.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.cancelled.store(false, Ordering::SeqCst);
    }

    /// Resolves once the flag is set.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.0.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// A file that could not be fetched or written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: String,
    pub error: String,
}

/// What happened to the stored revision at the end of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerOutcome {
    /// The new revision was persisted.
    Advanced,
    /// Failures under [`ConsistencyPolicy::RequireFullSuccess`] kept the old revision.
    Retained,
    /// The record was updated but could not be saved.
    SaveFailed(String),
}

/// Summary of a completed apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    /// Revision that was applied.
    pub revision: String,
    /// Files selected for download after exclusions.
    pub total: usize,
    pub written: usize,
    /// Files the host could not persist.
    pub skipped: usize,
    /// Blobs dropped by the exclusion set.
    pub excluded: usize,
    pub failures: Vec<FileFailure>,
    pub marker: MarkerOutcome,
}

impl ApplyReport {
    /// No per-file failures and the marker was persisted.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.marker == MarkerOutcome::Advanced
    }
}

/// Progress of one apply. Created on confirmation and dropped when the apply ends.
#[derive(Debug, Clone)]
pub struct UpdateSession {
    target: RevisionDescriptor,
    files: Vec<RemoteFileEntry>,
    completed: usize,
    written: usize,
    skipped: usize,
    failures: Vec<FileFailure>,
}

impl UpdateSession {
    pub fn new(target: RevisionDescriptor, files: Vec<RemoteFileEntry>) -> Self {
        Self {
            target,
            files,
            completed: 0,
            written: 0,
            skipped: 0,
            failures: Vec::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }

    /// `completed / total`, or `1.0` for an empty session.
    pub fn fraction(&self) -> f64 {
        progress_fraction(self.completed, self.total())
    }
}

/// Progress in `[0, 1]`; an empty batch counts as done.
pub fn progress_fraction(completed: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        completed as f64 / total as f64
    }
}

/// Where the orchestrator is.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateState {
    Idle,
    Checking,
    UpToDate {
        revision: String,
    },
    UpdateAvailable {
        current: Option<String>,
        latest: RevisionDescriptor,
    },
    Applying {
        completed: usize,
        total: usize,
    },
    Completed(ApplyReport),
    Cancelled {
        completed: usize,
        total: usize,
    },
    Failed {
        message: String,
    },
}

impl UpdateState {
    /// States that end a check or apply and can be dismissed.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::UpToDate { .. } | Self::Completed(_) | Self::Cancelled { .. } | Self::Failed { .. }
        )
    }

    /// One-line status for display.
    pub fn status_line(&self) -> String {
        match self {
            Self::Idle => "Idle".to_string(),
            Self::Checking => "Checking for updates...".to_string(),
            Self::UpToDate { .. } => "The game is up to date!".to_string(),
            Self::UpdateAvailable { latest, .. } => {
                format!("Update available ({}), confirm to install", latest.short_id())
            }
            Self::Applying { completed, total } => {
                format!("Updating files... ({completed}/{total})")
            }
            Self::Completed(report) if report.failures.is_empty() => {
                "Update completed successfully!".to_string()
            }
            Self::Completed(report) => format!(
                "Update completed with {} failed file(s)",
                report.failures.len()
            ),
            Self::Cancelled { completed, total } => {
                format!("Update cancelled after {completed}/{total} files")
            }
            Self::Failed { message } => message.clone(),
        }
    }
}

/// Receives status, progress and log lines while the orchestrator runs.
///
/// All methods have empty defaults.
pub trait UpdateObserver {
    fn on_status(&self, _status: &str) {}

    /// Called once per processed file, and once with `1.0` for an empty batch.
    fn on_progress(&self, _completed: usize, _total: usize, _fraction: f64) {}

    fn on_log(&self, _entry: &LogEntry) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl UpdateObserver for NoopObserver {}

fn emit(
    log: &mut UpdateLog,
    observer: &dyn UpdateObserver,
    level: LogLevel,
    message: impl Into<String>,
) {
    let entry = log.push(level, message);
    observer.on_log(entry);
}

/// Drives update checks and applies against injected collaborators.
pub struct UpdateOrchestrator<R, S, W> {
    remote: R,
    versions: VersionStore<S>,
    writer: W,
    exclusions: ExclusionSet,
    policy: ConsistencyPolicy,
    max_parallel: usize,
    cancel: CancellationFlag,
    record: VersionRecord,
    state: UpdateState,
    log: UpdateLog,
    last_error: Option<UpdaterError>,
}

impl<R, S, W> UpdateOrchestrator<R, S, W>
where
    R: RemoteRepository,
    S: PersistentStore,
    W: FileWriter,
{
    pub fn new(remote: R, versions: VersionStore<S>, writer: W) -> Self {
        Self {
            remote,
            versions,
            writer,
            exclusions: ExclusionSet::default(),
            policy: ConsistencyPolicy::default(),
            max_parallel: 1,
            cancel: CancellationFlag::new(),
            record: VersionRecord::default(),
            state: UpdateState::Idle,
            log: UpdateLog::new(),
            last_error: None,
        }
    }

    pub fn with_policy(mut self, policy: ConsistencyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Number of downloads kept in flight. Values below 1 are treated as 1.
    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel.max(1);
        self
    }

    pub fn with_exclusions(mut self, exclusions: ExclusionSet) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Handle for cancelling an apply from elsewhere.
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    pub fn state(&self) -> &UpdateState {
        &self.state
    }

    pub fn log(&self) -> &UpdateLog {
        &self.log
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn version_store(&self) -> &VersionStore<S> {
        &self.versions
    }

    /// The installed record as currently persisted.
    pub fn installed(&self) -> VersionRecord {
        self.versions.load()
    }

    /// The error behind the last [`UpdateState::Failed`], if not yet taken.
    pub fn take_error(&mut self) -> Option<UpdaterError> {
        self.last_error.take()
    }

    /// Return to [`UpdateState::Idle`] from a finished state or a declined update.
    pub fn dismiss(&mut self) {
        if self.state.is_terminal() || matches!(self.state, UpdateState::UpdateAvailable { .. }) {
            self.state = UpdateState::Idle;
            self.last_error = None;
        }
    }

    fn set_state(&mut self, state: UpdateState, observer: &dyn UpdateObserver) {
        self.state = state;
        observer.on_status(&self.state.status_line());
    }

    fn fail(&mut self, observer: &dyn UpdateObserver, prefix: &str, error: UpdaterError) {
        let message = format!("{prefix}: {error}");
        emit(&mut self.log, observer, LogLevel::Error, message.clone());
        self.last_error = Some(error);
        self.set_state(UpdateState::Failed { message }, observer);
    }

    /// Compare the latest remote revision with the installed one.
    ///
    /// Never downloads file content. A check from a finished state dismisses it
    /// first.
    pub async fn check(&mut self, observer: &dyn UpdateObserver) -> &UpdateState {
        self.dismiss();
        self.cancel.reset();
        self.set_state(UpdateState::Checking, observer);
        emit(&mut self.log, observer, LogLevel::Info, "Starting update check");

        self.record = self.versions.load();
        let latest = match self.remote.latest_revision().await {
            Ok(latest) => latest,
            Err(e) => {
                self.fail(observer, "Error checking for updates", e);
                return &self.state;
            }
        };

        let current = self.record.revision_id.clone();
        emit(
            &mut self.log,
            observer,
            LogLevel::Info,
            format!(
                "Latest revision: {}; installed: {}",
                latest.short_id(),
                current.as_deref().map_or("none", short_revision)
            ),
        );

        if current.as_deref() == Some(latest.id.as_str()) {
            emit(&mut self.log, observer, LogLevel::Info, "The game is up to date");
            self.set_state(
                UpdateState::UpToDate {
                    revision: latest.id,
                },
                observer,
            );
        } else {
            let message = match latest.summary() {
                Some(summary) => format!("Update available: {summary}"),
                None => "Update available".to_string(),
            };
            emit(&mut self.log, observer, LogLevel::Info, message);
            self.set_state(UpdateState::UpdateAvailable { current, latest }, observer);
        }
        &self.state
    }

    /// Download and write the pending update.
    ///
    /// # Errors
    ///
    /// [`UpdaterError::NoPendingUpdate`] unless the state is
    /// [`UpdateState::UpdateAvailable`]. Every other failure is reported
    /// through the returned state.
    pub async fn apply(&mut self, observer: &dyn UpdateObserver) -> Result<&UpdateState> {
        let target = match &self.state {
            UpdateState::UpdateAvailable { latest, .. } => latest.clone(),
            _ => {
                emit(&mut self.log, observer, LogLevel::Error, "No update found to install");
                return Err(UpdaterError::NoPendingUpdate);
            }
        };

        emit(
            &mut self.log,
            observer,
            LogLevel::Info,
            format!("Starting update to {}", target.short_id()),
        );
        observer.on_status("Downloading file list...");

        let listing = match self.remote.list_files(&target.id).await {
            Ok(listing) => listing,
            Err(e) => {
                self.fail(observer, "Update failed", e);
                return Ok(&self.state);
            }
        };

        let (files, excluded) = self.exclusions.select(listing);
        emit(
            &mut self.log,
            observer,
            LogLevel::Info,
            format!("Found {} files to update ({} excluded)", files.len(), excluded),
        );

        let mut session = UpdateSession::new(target, files);
        self.set_state(
            UpdateState::Applying {
                completed: 0,
                total: session.total(),
            },
            observer,
        );

        let finished = self.sync_files(&mut session, observer).await;
        if !finished {
            emit(
                &mut self.log,
                observer,
                LogLevel::Warn,
                format!(
                    "Update cancelled after {}/{} files; installed revision left unchanged",
                    session.completed,
                    session.total()
                ),
            );
            self.set_state(
                UpdateState::Cancelled {
                    completed: session.completed,
                    total: session.total(),
                },
                observer,
            );
            return Ok(&self.state);
        }

        let marker = self.finish(&session, observer);
        let report = ApplyReport {
            revision: session.target.id,
            total: session.files.len(),
            written: session.written,
            skipped: session.skipped,
            excluded,
            failures: session.failures,
            marker,
        };
        self.set_state(UpdateState::Completed(report), observer);
        Ok(&self.state)
    }

    /// Fetch, classify and write every session file in listing order.
    ///
    /// Returns `false` if the batch was cancelled. Cancellation drops every
    /// pending download, so no further file is written once it is observed.
    async fn sync_files(&mut self, session: &mut UpdateSession, observer: &dyn UpdateObserver) -> bool {
        let total = session.total();
        if total == 0 {
            observer.on_progress(0, 0, 1.0);
            return true;
        }

        let remote = &self.remote;
        let mut downloads = stream::iter(session.files.clone())
            .map(|entry| async move {
                let result = remote.fetch_file(&entry.path).await;
                (entry, result)
            })
            .buffered(self.max_parallel);

        loop {
            let next = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return false,
                next = downloads.next() => next,
            };
            let Some((entry, fetched)) = next else {
                break;
            };

            let outcome = fetched.and_then(|content| {
                let classification = classify(&entry.path, content.content_type.as_deref());
                self.writer
                    .write_file(&entry.path, &content.bytes, classification)
            });

            match outcome {
                Ok(WriteOutcome::Written { .. }) => {
                    session.written += 1;
                    emit(&mut self.log, observer, LogLevel::Info, format!("Updated {}", entry.path));
                }
                Ok(WriteOutcome::Skipped) => {
                    session.skipped += 1;
                    emit(
                        &mut self.log,
                        observer,
                        LogLevel::Warn,
                        format!("Could not save {} on this host", entry.path),
                    );
                }
                Err(e) => {
                    emit(
                        &mut self.log,
                        observer,
                        LogLevel::Error,
                        format!("Failed to update {}: {}", entry.path, e),
                    );
                    session.failures.push(FileFailure {
                        path: entry.path,
                        error: e.to_string(),
                    });
                }
            }

            session.completed += 1;
            self.state = UpdateState::Applying {
                completed: session.completed,
                total,
            };
            observer.on_progress(session.completed, total, session.fraction());
            observer.on_status(&self.state.status_line());
        }
        true
    }

    /// Advance and persist the revision marker according to the policy.
    fn finish(&mut self, session: &UpdateSession, observer: &dyn UpdateObserver) -> MarkerOutcome {
        let failed = session.failures.len();
        if failed > 0 {
            emit(
                &mut self.log,
                observer,
                LogLevel::Warn,
                format!("{} of {} files failed to update", failed, session.total()),
            );
            if self.policy == ConsistencyPolicy::RequireFullSuccess {
                emit(
                    &mut self.log,
                    observer,
                    LogLevel::Warn,
                    "Keeping the installed revision so the update is offered again",
                );
                return MarkerOutcome::Retained;
            }
        }

        self.record.revision_id = Some(session.target.id.clone());
        self.record.last_update = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
        match self.versions.save(&self.record) {
            Ok(()) => {
                emit(
                    &mut self.log,
                    observer,
                    LogLevel::Info,
                    format!("Installed revision is now {}", session.target.short_id()),
                );
                MarkerOutcome::Advanced
            }
            Err(e) => {
                emit(
                    &mut self.log,
                    observer,
                    LogLevel::Error,
                    format!("Failed to save version record: {e}"),
                );
                MarkerOutcome::SaveFailed(e.to_string())
            }
        }
    }
}
