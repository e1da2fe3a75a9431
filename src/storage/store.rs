//! Persisted recording library
//!
//! One JSON file holding a map of recordings keyed by id. Every operation is
//! read-entire-collection, mutate-matching-entry, write-entire-collection; a
//! single async mutex serializes writers so concurrent pipeline runs cannot
//! lose each other's updates.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{broadcast, Mutex};

use crate::analysis::AnalysisResult;
use crate::storage::{AnalysisMode, AnalysisStatus, Recording};

/// Pushed to subscribers whenever a recording's analysis status changes
#[derive(Debug, Clone)]
pub struct StatusEvent {
    pub recording_id: String,
    pub status: AnalysisStatus,
}

/// Keyed collection of recordings persisted as a JSON file
pub struct RecordingStore {
    path: PathBuf,
    write_lock: Mutex<()>,
    events: broadcast::Sender<StatusEvent>,
}

type Library = BTreeMap<String, Recording>;

impl RecordingStore {
    /// Open (or lazily create) the library at the given path
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            events,
        }
    }

    /// Subscribe to analysis status changes
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.events.subscribe()
    }

    async fn load(&self) -> Result<Library> {
        if !self.path.exists() {
            return Ok(Library::new());
        }

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read library: {}", self.path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse library: {}", self.path.display()))
    }

    async fn persist(&self, library: &Library) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write to a sibling file and rename into place so lock-free readers
        // never observe a truncated library. Writers are already serialized,
        // so one temp name is enough.
        let tmp = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(library)?;
        tokio::fs::write(&tmp, content)
            .await
            .with_context(|| format!("Failed to write library: {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace library: {}", self.path.display()))
    }

    fn emit(&self, recording_id: &str, status: AnalysisStatus) {
        // No subscribers is fine.
        let _ = self.events.send(StatusEvent {
            recording_id: recording_id.to_string(),
            status,
        });
    }

    /// Add a recording to the library
    pub async fn insert(&self, recording: Recording) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut library = self.load().await?;
        library.insert(recording.id.clone(), recording);
        self.persist(&library).await
    }

    /// Get a recording by exact id
    pub async fn get(&self, id: &str) -> Result<Option<Recording>> {
        let library = self.load().await?;
        Ok(library.get(id).cloned())
    }

    /// Find a recording by id prefix; `None` unless the match is unambiguous
    pub async fn find_by_prefix(&self, prefix: &str) -> Result<Option<Recording>> {
        let library = self.load().await?;
        let mut matches = library.values().filter(|r| r.id.starts_with(prefix));

        let first = matches.next().cloned();
        if matches.next().is_some() {
            return Ok(None);
        }
        Ok(first)
    }

    /// List all recordings, newest first
    pub async fn list(&self) -> Result<Vec<Recording>> {
        let library = self.load().await?;
        let mut recordings: Vec<Recording> = library.into_values().collect();
        recordings.sort_by(|a, b| b.captured_at.cmp(&a.captured_at));
        Ok(recordings)
    }

    /// Delete a recording; returns whether it existed
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut library = self.load().await?;
        let removed = library.remove(id).is_some();
        if removed {
            self.persist(&library).await?;
        }
        Ok(removed)
    }

    /// Set the analysis status (and optionally the coaching mode) of a recording.
    ///
    /// `Completed` is only reachable through [`Self::save_result`], which
    /// attaches the result in the same write; this keeps status and result
    /// from ever being observed apart. Any other status clears a stale result.
    pub async fn set_status(
        &self,
        id: &str,
        status: AnalysisStatus,
        mode: Option<AnalysisMode>,
    ) -> Result<()> {
        if status == AnalysisStatus::Completed {
            anyhow::bail!("completed status requires a result; use save_result");
        }

        let _guard = self.write_lock.lock().await;
        let mut library = self.load().await?;
        let recording = library
            .get_mut(id)
            .with_context(|| format!("Recording not found: {}", id))?;

        recording.analysis_status = status;
        recording.analysis_result = None;
        if let Some(mode) = mode {
            recording.analysis_mode = Some(mode);
        }

        self.persist(&library).await?;
        self.emit(id, status);
        Ok(())
    }

    /// Attach an analysis result and mark the recording completed in one write
    pub async fn save_result(&self, id: &str, result: AnalysisResult) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut library = self.load().await?;
        let recording = library
            .get_mut(id)
            .with_context(|| format!("Recording not found: {}", id))?;

        recording.analysis_status = AnalysisStatus::Completed;
        recording.analysis_result = Some(result);

        self.persist(&library).await?;
        self.emit(id, AnalysisStatus::Completed);
        Ok(())
    }

    /// Get the attached analysis result, if the recording has one
    pub async fn get_result(&self, id: &str) -> Result<Option<AnalysisResult>> {
        Ok(self.get(id).await?.and_then(|r| r.analysis_result))
    }

    /// Poll the library at a fixed interval until the recording's status is
    /// terminal, then return it. Dropping the future cancels the loop.
    pub async fn wait_until_terminal(
        &self,
        id: &str,
        interval: Duration,
    ) -> Result<AnalysisStatus> {
        loop {
            let recording = self
                .get(id)
                .await?
                .with_context(|| format!("Recording not found: {}", id))?;

            if recording.analysis_status.is_terminal() {
                return Ok(recording.analysis_status);
            }

            tokio::time::sleep(interval).await;
        }
    }
}
