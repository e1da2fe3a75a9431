//! Secondary coaching backend client
//!
//! Fallback analysis path: one multipart POST of the video plus the coaching
//! mode, answered with an already-structured result. Rate limiting and server
//! errors are distinguished by status so the pipeline can log them apart.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::analysis::{AnalysisError, AnalysisResult};
use crate::config::Settings;
use crate::storage::AnalysisMode;

pub struct BackendClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct BackendResponse {
    #[allow(dead_code)]
    mode: String,
    analysis: AnalysisResult,
    #[serde(default)]
    #[allow(dead_code)]
    processing_time: Option<f64>,
}

impl BackendClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.backend.url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            anyhow::bail!("Backend URL is missing. Set backend.url in config or PODIUM_BACKEND_URL.");
        }

        Ok(Self {
            http: Client::builder()
                .timeout(Duration::from_secs(settings.backend.request_timeout_secs))
                .build()
                .context("Failed to build backend HTTP client")?,
            base_url,
        })
    }

    /// Submit the video for analysis with the given coaching focus
    pub async fn analyze_video(
        &self,
        video_path: &Path,
        mode: AnalysisMode,
        recording_id: &str,
    ) -> Result<AnalysisResult, AnalysisError> {
        let bytes = tokio::fs::read(video_path).await?;
        let file_name = video_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "practice.mp4".to_string());

        debug!("Sending {} to coaching backend (mode {})", file_name, mode.as_str());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("video/mp4")?;
        let form = Form::new()
            .part("video", part)
            .text("mode", mode.as_str());

        let url = format!("{}/analyze", self.base_url);
        let response = self.http.post(&url).multipart(form).send().await?;

        let status = response.status();
        let raw = response.text().await?;

        if status.as_u16() == 429 {
            return Err(AnalysisError::RateLimited);
        }
        if !status.is_success() {
            return Err(AnalysisError::Server {
                status: status.as_u16(),
                body: raw,
            });
        }

        let parsed: BackendResponse =
            serde_json::from_str(&raw).map_err(|e| AnalysisError::Parse {
                message: format!("backend response did not match schema: {}", e),
                raw,
            })?;

        let mut result = parsed.analysis;
        result.validate()?;
        result.finalize(recording_id);

        info!("Coaching backend analysis complete for {}", recording_id);
        Ok(result)
    }
}
