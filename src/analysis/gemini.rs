//! Gemini file-ingestion and structured-generation client
//!
//! Three operations back the primary analysis path: multipart upload of the
//! video, readiness polling of the remote file (capped exponential delay,
//! bounded cumulative wait), and a single `generateContent` request carrying
//! the rubric and the strict response schema.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analysis::rubric::{response_schema, ANALYSIS_INSTRUCTION, RUBRIC};
use crate::analysis::{AnalysisError, AnalysisResult};
use crate::config::Settings;

const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Opaque reference to the remote-side ingested copy of a video.
///
/// Exists only for the duration of one pipeline run; never persisted.
#[derive(Debug, Clone)]
pub struct RemoteFileHandle {
    pub name: String,
    pub uri: Option<String>,
    pub state: String,
}

/// Capped-exponential readiness poll schedule
#[derive(Debug, Clone, Copy)]
struct PollSchedule {
    initial: Duration,
    max_delay: Duration,
    max_wait: Duration,
}

pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    endpoint: String,
    poll: PollSchedule,
}

impl GeminiClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.gemini.api_key.trim().to_string();
        if api_key.is_empty() {
            anyhow::bail!(
                "Gemini API key is missing. Set gemini.api_key in config or PODIUM_GEMINI_API_KEY."
            );
        }

        let endpoint = if settings.gemini.endpoint.trim().is_empty() {
            DEFAULT_GEMINI_ENDPOINT.to_string()
        } else {
            settings
                .gemini
                .endpoint
                .trim()
                .trim_end_matches('/')
                .to_string()
        };

        Ok(Self {
            http: Client::builder()
                .timeout(Duration::from_secs(settings.gemini.request_timeout_secs))
                .build()
                .context("Failed to build Gemini HTTP client")?,
            api_key,
            model: settings.gemini.model.trim().to_string(),
            endpoint,
            poll: PollSchedule {
                initial: Duration::from_millis(settings.gemini.poll_initial_ms),
                max_delay: Duration::from_millis(settings.gemini.poll_max_ms),
                max_wait: Duration::from_millis(settings.gemini.poll_max_wait_ms),
            },
        })
    }

    fn upload_url(&self) -> String {
        format!("{}/upload/v1beta/files?key={}", self.endpoint, self.api_key)
    }

    fn file_url(&self, name: &str) -> String {
        // `name` is already namespaced, e.g. "files/abc123".
        format!("{}/v1beta/{}?key={}", self.endpoint, name, self.api_key)
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        )
    }

    /// Upload a local video and return the remote handle.
    ///
    /// The remote side begins processing asynchronously; the returned state is
    /// whatever the service reported at ingestion time.
    pub async fn upload(&self, video_path: &Path) -> Result<RemoteFileHandle, AnalysisError> {
        let bytes = tokio::fs::read(video_path).await?;
        let file_name = video_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "practice.mp4".to_string());

        debug!("Uploading {} ({} bytes)", file_name, bytes.len());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("video/mp4")?;
        let form = Form::new().part("file", part);

        let response = self.http.post(self.upload_url()).multipart(form).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AnalysisError::Upload {
                status: status.as_u16(),
                body,
            });
        }

        let handle = serde_json::from_str::<FileEnvelope>(&body)
            .map(FileEnvelope::into_handle)
            .map_err(|_| AnalysisError::Upload {
                status: status.as_u16(),
                body,
            })?;

        info!("Uploaded as {} (state {})", handle.name, handle.state);
        Ok(handle)
    }

    /// Fetch the remote file's current state
    pub async fn get_file(&self, name: &str) -> Result<RemoteFileHandle, AnalysisError> {
        let response = self.http.get(self.file_url(name)).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AnalysisError::Server {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<FileEnvelope>(&body)
            .map(FileEnvelope::into_handle)
            .map_err(|_| AnalysisError::Server {
                status: status.as_u16(),
                body,
            })
    }

    /// Poll the remote file until it is ACTIVE and return its uri.
    ///
    /// Delay starts at the configured initial value and doubles per attempt,
    /// capped per step; once the accumulated wait reaches the bound the poll
    /// fails with a timeout. Unknown state strings keep the poll going so new
    /// remote-side states do not break us.
    pub async fn poll_until_ready(&self, name: &str) -> Result<String, AnalysisError> {
        let mut delay = self.poll.initial;
        let mut waited = Duration::ZERO;

        loop {
            let file = self.get_file(name).await?;

            match file.state.as_str() {
                "ACTIVE" => {
                    info!("Remote file {} is ready", name);
                    return file.uri.ok_or_else(|| {
                        AnalysisError::Schema(format!("file {} is ACTIVE but has no uri", name))
                    });
                }
                "FAILED" => {
                    return Err(AnalysisError::RemoteProcessing(file.state.clone()));
                }
                state => {
                    debug!("Remote file {} still processing (state {:?})", name, state);
                }
            }

            if waited >= self.poll.max_wait {
                return Err(AnalysisError::Timeout {
                    waited_secs: waited.as_secs(),
                });
            }

            tokio::time::sleep(delay).await;
            waited += delay;
            delay = (delay * 2).min(self.poll.max_delay);
        }
    }

    /// Run one structured generation request against the ready remote file.
    ///
    /// Parses the schema-conforming JSON from the response envelope, validates
    /// the scores, stamps the caller's recording id, and backfills a missing
    /// overall score. Parse failures carry the raw text for diagnostics.
    pub async fn analyze(
        &self,
        file_uri: &str,
        recording_id: &str,
    ) -> Result<AnalysisResult, AnalysisError> {
        let body = GenerateContentRequest {
            system_instruction: SystemInstruction {
                parts: vec![TextPart {
                    text: RUBRIC.to_string(),
                }],
            },
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart {
                        text: None,
                        file_data: Some(FileData {
                            file_uri: file_uri.to_string(),
                            mime_type: "video/mp4".to_string(),
                        }),
                    },
                    RequestPart {
                        text: Some(ANALYSIS_INSTRUCTION.to_string()),
                        file_data: None,
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            },
        };

        let response = self
            .http
            .post(self.generate_url())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;

        if !status.is_success() {
            return Err(AnalysisError::Server {
                status: status.as_u16(),
                body: raw,
            });
        }

        let envelope: GenerateContentResponse =
            serde_json::from_str(&raw).map_err(|e| AnalysisError::Parse {
                message: format!("invalid response envelope: {}", e),
                raw: raw.clone(),
            })?;

        let text = extract_text(&envelope).ok_or_else(|| AnalysisError::Parse {
            message: "response did not contain analysis text".to_string(),
            raw: raw.clone(),
        })?;

        let mut result: AnalysisResult =
            serde_json::from_str(text).map_err(|e| AnalysisError::Parse {
                message: format!("analysis JSON did not match schema: {}", e),
                raw: text.to_string(),
            })?;

        result.validate()?;
        result.finalize(recording_id);
        Ok(result)
    }

    /// Upload, wait for readiness, then analyze, as one sequential run
    pub async fn analyze_file(
        &self,
        video_path: &Path,
        recording_id: &str,
    ) -> Result<AnalysisResult, AnalysisError> {
        let handle = self.upload(video_path).await?;

        // The service occasionally reports ACTIVE straight from ingestion.
        let uri = if handle.state == "ACTIVE" && handle.uri.is_some() {
            handle.uri.clone().unwrap_or_default()
        } else if handle.state == "FAILED" {
            warn!("Remote file {} failed during ingestion", handle.name);
            return Err(AnalysisError::RemoteProcessing(handle.state));
        } else {
            self.poll_until_ready(&handle.name).await?
        };

        self.analyze(&uri, recording_id).await
    }
}

/// Extract the first non-empty candidate text from a generation response
fn extract_text(envelope: &GenerateContentResponse) -> Option<&str> {
    envelope
        .candidates
        .iter()
        .flat_map(|c| c.content.parts.iter())
        .filter_map(|p| p.text.as_deref())
        .map(str::trim)
        .find(|t| !t.is_empty())
}

// The file API answers either `{ "file": { ... } }` or the object flat,
// depending on the route. Normalize both shapes at this boundary.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FileEnvelope {
    Wrapped { file: RemoteFileInfo },
    Flat(RemoteFileInfo),
}

#[derive(Debug, Deserialize)]
struct RemoteFileInfo {
    name: String,
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    state: String,
}

impl FileEnvelope {
    fn into_handle(self) -> RemoteFileHandle {
        let info = match self {
            Self::Wrapped { file } => file,
            Self::Flat(info) => info,
        };
        RemoteFileHandle {
            name: info.name,
            uri: info.uri,
            state: info.state,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: SystemInstruction,
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_data: Option<FileData>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    file_uri: String,
    mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}
