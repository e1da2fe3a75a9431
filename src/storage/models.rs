//! Data models for storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;

/// Analysis lifecycle stage of a recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    /// No analysis has been requested
    NotRequested,
    /// Analysis pipeline is running
    Pending,
    /// Analysis finished and a result is attached
    Completed,
    /// Every analysis path failed
    Failed,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotRequested => "not_requested",
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Whether no further transition will occur
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Coaching focus requested for an analysis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    #[default]
    General,
    Interview,
    Sales,
    Pitch,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Interview => "interview",
            Self::Sales => "sales",
            Self::Pitch => "pitch",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "general" => Some(Self::General),
            "interview" => Some(Self::Interview),
            "sales" => Some(Self::Sales),
            "pitch" => Some(Self::Pitch),
            _ => None,
        }
    }
}

/// Which camera captured the recording
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    #[default]
    Front,
    Back,
}

/// A captured speech-practice recording
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    /// Unique identifier (UUID)
    pub id: String,

    /// Path to the local video file
    pub video_path: String,

    /// Reference into the device media library, if exported there
    pub library_ref: Option<String>,

    /// Path to a thumbnail image, if one was generated
    pub thumbnail_path: Option<String>,

    /// Capture timestamp
    pub captured_at: DateTime<Utc>,

    /// Practice prompt shown during capture
    pub prompt: String,

    /// Camera facing direction
    pub facing: CameraFacing,

    /// Duration in seconds
    pub duration_secs: Option<u64>,

    /// Video file size in bytes
    pub size_bytes: Option<u64>,

    /// Free-text user observations
    pub notes: Option<String>,

    /// Current analysis lifecycle stage
    pub analysis_status: AnalysisStatus,

    /// Coaching focus used for the last analysis request
    pub analysis_mode: Option<AnalysisMode>,

    /// Attached analysis result; present exactly when status is `Completed`
    pub analysis_result: Option<AnalysisResult>,
}

impl Recording {
    /// Create a new recording for a captured video
    pub fn new(video_path: String, prompt: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            video_path,
            library_ref: None,
            thumbnail_path: None,
            captured_at: Utc::now(),
            prompt,
            facing: CameraFacing::default(),
            duration_secs: None,
            size_bytes: None,
            notes: None,
            analysis_status: AnalysisStatus::NotRequested,
            analysis_mode: None,
            analysis_result: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_recording_starts_without_analysis() {
        let recording = Recording::new("practice.mp4".to_string(), "Introduce yourself".to_string());
        assert_eq!(recording.analysis_status, AnalysisStatus::NotRequested);
        assert!(recording.analysis_result.is_none());
        assert!(!recording.analysis_status.is_terminal());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&AnalysisStatus::NotRequested).unwrap();
        assert_eq!(json, "\"not_requested\"");
    }

    #[test]
    fn mode_round_trips_through_str() {
        for mode in [
            AnalysisMode::General,
            AnalysisMode::Interview,
            AnalysisMode::Sales,
            AnalysisMode::Pitch,
        ] {
            assert_eq!(AnalysisMode::from_str(mode.as_str()), Some(mode));
        }
        assert_eq!(AnalysisMode::from_str("standup"), None);
    }
}
