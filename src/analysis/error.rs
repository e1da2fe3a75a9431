//! Analysis pipeline error types

use thiserror::Error;

/// Typed failures of the analysis pipeline stages
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The remote service rejected the uploaded video
    #[error("upload rejected ({status}): {body}")]
    Upload { status: u16, body: String },

    /// The remote file did not reach a terminal state within the wait bound
    #[error("remote file not ready after {waited_secs}s")]
    Timeout { waited_secs: u64 },

    /// The remote service reported that processing the file failed
    #[error("remote processing failed (state {0})")]
    RemoteProcessing(String),

    /// The generation response was not valid, schema-conforming JSON
    #[error("could not parse analysis response: {message}")]
    Parse { message: String, raw: String },

    /// Transport-level failure
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The coaching backend returned 429
    #[error("coaching backend rate limited the request")]
    RateLimited,

    /// The remote side returned a non-success status
    #[error("remote returned {status}: {body}")]
    Server { status: u16, body: String },

    /// A parsed result violated the rubric schema (missing or out-of-range scores)
    #[error("invalid analysis payload: {0}")]
    Schema(String),

    /// The local video file could not be read
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Network(e) => e.is_timeout(),
            _ => false,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// User-actionable message shown when every analysis path has failed
    pub fn user_message(&self) -> &'static str {
        if self.is_timeout() {
            "The analysis service took too long to respond. Try again in a few minutes."
        } else if self.is_network() {
            "Could not reach the analysis service. Check your connection and retry."
        } else {
            "Analysis failed. You can retry now or skip feedback for this recording."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_selects_timeout_message() {
        let err = AnalysisError::Timeout { waited_secs: 180 };
        assert!(err.is_timeout());
        assert!(err.user_message().contains("too long"));
    }

    #[test]
    fn generic_failure_selects_retry_message() {
        let err = AnalysisError::Schema("volume out of range".to_string());
        assert!(!err.is_timeout());
        assert!(!err.is_network());
        assert!(err.user_message().contains("retry"));
    }
}
