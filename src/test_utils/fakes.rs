//! In-memory collaborators that record how they were used.

use crate::core::{Result, UpdaterError};
use crate::update::{
    CancellationFlag, Classification, FileContent, FileWriter, LogEntry, RemoteFileEntry,
    RemoteRepository, RevisionDescriptor, UpdateObserver, WriteOutcome,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

fn http_error(operation: &str, path: &str, status: u16) -> UpdaterError {
    UpdaterError::HttpStatus {
        operation: operation.to_string(),
        url: format!("fake://{path}"),
        status,
    }
}

/// Scripted [`RemoteRepository`].
///
/// Files are listed in the order they were added. Paths that are listed but
/// have no content answer with 404.
#[derive(Debug, Default)]
pub struct FakeRemote {
    latest: String,
    latest_status: Option<u16>,
    listing: Vec<RemoteFileEntry>,
    listing_status: Option<u16>,
    contents: HashMap<String, std::result::Result<FileContent, u16>>,
    cancel_after: Option<(usize, CancellationFlag)>,
    stalled: HashSet<String>,
    revision_calls: AtomicUsize,
    listing_calls: AtomicUsize,
    fetched: Mutex<Vec<String>>,
}

impl FakeRemote {
    /// A remote whose head is `latest`.
    pub fn new(latest: impl Into<String>) -> Self {
        Self {
            latest: latest.into(),
            ..Self::default()
        }
    }

    /// Make `latest_revision` answer with HTTP `status`.
    pub fn failing_check(mut self, status: u16) -> Self {
        self.latest_status = Some(status);
        self
    }

    /// Make `list_files` answer with HTTP `status`.
    pub fn failing_listing(mut self, status: u16) -> Self {
        self.listing_status = Some(status);
        self
    }

    /// Add a listing entry without content.
    pub fn with_entry(mut self, entry: RemoteFileEntry) -> Self {
        self.listing.push(entry);
        self
    }

    pub fn with_text_file(self, path: &str, text: &str) -> Self {
        self.with_file(path, text.as_bytes(), Some("text/plain; charset=utf-8"))
    }

    pub fn with_file(mut self, path: &str, bytes: &[u8], content_type: Option<&str>) -> Self {
        self.listing.push(RemoteFileEntry::blob(path));
        self.contents
            .insert(path.to_string(), Ok(FileContent::new(bytes, content_type)));
        self
    }

    /// A listed file whose download fails with HTTP `status`.
    pub fn with_failing_file(mut self, path: &str, status: u16) -> Self {
        self.listing.push(RemoteFileEntry::blob(path));
        self.contents.insert(path.to_string(), Err(status));
        self
    }

    /// A listed file whose download never completes.
    pub fn with_stalled_file(mut self, path: &str) -> Self {
        self.listing.push(RemoteFileEntry::blob(path));
        self.stalled.insert(path.to_string());
        self
    }

    /// Set `flag` once `count` files have been fetched.
    pub fn cancel_after(mut self, count: usize, flag: CancellationFlag) -> Self {
        self.cancel_after = Some((count, flag));
        self
    }

    pub fn revision_calls(&self) -> usize {
        self.revision_calls.load(Ordering::SeqCst)
    }

    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    /// Paths passed to `fetch_file`, in call order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().map(|f| f.clone()).unwrap_or_default()
    }
}

impl RemoteRepository for FakeRemote {
    async fn latest_revision(&self) -> Result<RevisionDescriptor> {
        self.revision_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.latest_status {
            return Err(http_error("fetch latest commit", "commits", status));
        }
        RevisionDescriptor::from_payload(serde_json::json!({
            "sha": self.latest,
            "commit": {"message": format!("Release {}", self.latest)}
        }))
    }

    async fn list_files(&self, _revision_id: &str) -> Result<Vec<RemoteFileEntry>> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.listing_status {
            return Err(http_error("list repository files", "trees", status));
        }
        Ok(self.listing.clone())
    }

    async fn fetch_file(&self, path: &str) -> Result<FileContent> {
        let fetched = {
            let mut fetched = self.fetched.lock().map_err(|_| {
                UpdaterError::Io(std::io::Error::other("fetch log lock poisoned"))
            })?;
            fetched.push(path.to_string());
            fetched.len()
        };
        if let Some((count, flag)) = &self.cancel_after
            && fetched >= *count
        {
            flag.cancel();
        }
        if self.stalled.contains(path) {
            std::future::pending::<()>().await;
        }

        match self.contents.get(path) {
            Some(Ok(content)) => Ok(content.clone()),
            Some(Err(status)) => Err(http_error(&format!("download {path}"), path, *status)),
            None => Err(http_error(&format!("download {path}"), path, 404)),
        }
    }
}

/// [`FileWriter`] that keeps writes in memory.
#[derive(Debug, Default)]
pub struct RecordingWriter {
    writes: Mutex<Vec<(String, Classification, Vec<u8>)>>,
    failing: HashSet<String>,
}

impl RecordingWriter {
    /// Fail with a permission error when `path` is written.
    pub fn failing_on(mut self, path: &str) -> Self {
        self.failing.insert(path.to_string());
        self
    }

    /// `(path, classification)` of each write, in order.
    pub fn written(&self) -> Vec<(String, Classification)> {
        self.writes
            .lock()
            .map(|writes| writes.iter().map(|(p, c, _)| (p.clone(), *c)).collect())
            .unwrap_or_default()
    }

    /// Bytes of the last write to `path`.
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.writes.lock().ok().and_then(|writes| {
            writes
                .iter()
                .rev()
                .find(|(p, _, _)| p == path)
                .map(|(_, _, bytes)| bytes.clone())
        })
    }
}

impl FileWriter for RecordingWriter {
    fn write_file(
        &self,
        path: &str,
        bytes: &[u8],
        classification: Classification,
    ) -> Result<WriteOutcome> {
        if self.failing.contains(path) {
            return Err(UpdaterError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("cannot write {path}"),
            )));
        }
        let mut writes = self
            .writes
            .lock()
            .map_err(|_| std::io::Error::other("write log lock poisoned"))?;
        writes.push((path.to_string(), classification, bytes.to_vec()));
        Ok(WriteOutcome::Written {
            path: path.into(),
            bytes: bytes.len(),
        })
    }
}

/// [`UpdateObserver`] that records every notification.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    statuses: Mutex<Vec<String>>,
    progress: Mutex<Vec<f64>>,
    logs: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn statuses(&self) -> Vec<String> {
        self.statuses.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Reported fractions, in order.
    pub fn progress(&self) -> Vec<f64> {
        self.progress.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn logs(&self) -> Vec<String> {
        self.logs.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl UpdateObserver for RecordingObserver {
    fn on_status(&self, status: &str) {
        if let Ok(mut statuses) = self.statuses.lock() {
            statuses.push(status.to_string());
        }
    }

    fn on_progress(&self, _completed: usize, _total: usize, fraction: f64) {
        if let Ok(mut progress) = self.progress.lock() {
            progress.push(fraction);
        }
    }

    fn on_log(&self, entry: &LogEntry) {
        if let Ok(mut logs) = self.logs.lock() {
            logs.push(entry.message.clone());
        }
    }
}
