//! Analysis pipeline orchestration
//!
//! Drives one recording through `pending -> (completed | failed)`. Providers
//! are tried strictly in order: Gemini, then the coaching backend, then the
//! deterministic local result. The store write that attaches a result also
//! flips the status, so observers never see one without the other.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};

use crate::analysis::mock::mock_result;
use crate::analysis::{
    AnalysisError, AnalysisResult, BackendClient, GeminiClient, MockProvider,
};
use crate::config::Settings;
use crate::storage::{AnalysisMode, AnalysisStatus, RecordingStore};

/// One analysis request handed to a provider
pub struct AnalysisRequest<'a> {
    pub recording_id: &'a str,
    pub video_path: &'a Path,
    pub mode: AnalysisMode,
}

/// A single analysis path in the fallback chain
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn analyze_video(
        &self,
        request: AnalysisRequest<'_>,
    ) -> Result<AnalysisResult, AnalysisError>;
}

#[async_trait]
impl AnalysisProvider for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn analyze_video(
        &self,
        request: AnalysisRequest<'_>,
    ) -> Result<AnalysisResult, AnalysisError> {
        self.analyze_file(request.video_path, request.recording_id)
            .await
    }
}

#[async_trait]
impl AnalysisProvider for BackendClient {
    fn name(&self) -> &'static str {
        "backend"
    }

    async fn analyze_video(
        &self,
        request: AnalysisRequest<'_>,
    ) -> Result<AnalysisResult, AnalysisError> {
        BackendClient::analyze_video(self, request.video_path, request.mode, request.recording_id)
            .await
    }
}

#[async_trait]
impl AnalysisProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn analyze_video(
        &self,
        request: AnalysisRequest<'_>,
    ) -> Result<AnalysisResult, AnalysisError> {
        Ok(mock_result(request.recording_id, request.mode))
    }
}

/// Terminal outcome of one pipeline run
#[derive(Debug)]
pub enum AnalysisOutcome {
    Completed(AnalysisResult),
    Failed { message: String },
}

pub struct AnalysisPipeline {
    providers: Vec<Box<dyn AnalysisProvider>>,
    store: Arc<RecordingStore>,
}

impl AnalysisPipeline {
    /// Build the provider chain from settings.
    ///
    /// Unconfigured remote paths are simply absent from the chain; the mock
    /// provider is always last so a requested analysis can always terminate.
    pub fn from_settings(settings: &Settings, store: Arc<RecordingStore>) -> Result<Self> {
        let mut providers: Vec<Box<dyn AnalysisProvider>> = Vec::new();

        if !settings.gemini.api_key.trim().is_empty() {
            providers.push(Box::new(GeminiClient::from_settings(settings)?));
        }
        if !settings.backend.url.trim().is_empty() {
            providers.push(Box::new(BackendClient::from_settings(settings)?));
        }
        providers.push(Box::new(MockProvider));

        Ok(Self { providers, store })
    }

    /// Build a pipeline with an explicit provider chain
    pub fn with_providers(
        providers: Vec<Box<dyn AnalysisProvider>>,
        store: Arc<RecordingStore>,
    ) -> Self {
        Self { providers, store }
    }

    /// Run the full pipeline for one recording.
    ///
    /// Marks the recording `pending` up front, then walks the provider chain
    /// in order, saving the first successful result. Only when every path has
    /// failed does the recording end up `failed`, with a user-actionable
    /// message derived from the last error.
    pub async fn run(
        &self,
        recording_id: &str,
        mode: Option<AnalysisMode>,
    ) -> Result<AnalysisOutcome> {
        let recording = self
            .store
            .get(recording_id)
            .await?
            .with_context(|| format!("Recording not found: {}", recording_id))?;

        let mode = mode
            .or(recording.analysis_mode)
            .unwrap_or_default();

        self.store
            .set_status(recording_id, AnalysisStatus::Pending, Some(mode))
            .await?;

        let video_path = Path::new(&recording.video_path);
        if !video_path.exists() {
            let message = format!(
                "Video file is missing: {}. Re-import the recording and retry.",
                recording.video_path
            );
            self.store
                .set_status(recording_id, AnalysisStatus::Failed, Some(mode))
                .await?;
            return Ok(AnalysisOutcome::Failed { message });
        }

        let mut last_error: Option<AnalysisError> = None;

        for provider in &self.providers {
            let request = AnalysisRequest {
                recording_id,
                video_path,
                mode,
            };

            match provider.analyze_video(request).await {
                Ok(result) => {
                    info!(
                        "Analysis of {} completed via {} provider",
                        recording_id,
                        provider.name()
                    );
                    self.store.save_result(recording_id, result.clone()).await?;
                    return Ok(AnalysisOutcome::Completed(result));
                }
                Err(e) => {
                    warn!(
                        "{} provider failed for {}: {}",
                        provider.name(),
                        recording_id,
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        let message = last_error
            .as_ref()
            .map(|e| e.user_message())
            .unwrap_or("Analysis failed. You can retry now or skip feedback for this recording.")
            .to_string();

        self.store
            .set_status(recording_id, AnalysisStatus::Failed, Some(mode))
            .await?;

        Ok(AnalysisOutcome::Failed { message })
    }
}
