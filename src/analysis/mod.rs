//! Remote video-analysis pipeline
//!
//! Four composed stages: upload the video to Gemini's file API, poll the
//! remote file until it is ACTIVE, run one structured generation request
//! against the coaching rubric, and persist the parsed result. A secondary
//! coaching backend and a deterministic local result act as fallbacks so a
//! requested analysis always terminates in `completed` or `failed`.

mod backend;
mod error;
mod gemini;
mod mock;
mod pipeline;
mod result;
pub mod rubric;

pub use backend::BackendClient;
pub use error::AnalysisError;
pub use gemini::{GeminiClient, RemoteFileHandle};
pub use mock::{mock_result, MockProvider};
pub use pipeline::{AnalysisOutcome, AnalysisPipeline, AnalysisProvider, AnalysisRequest};
pub use result::{
    AnalysisResult, CoachingReport, ConversationalStyle, Disfluencies, FillerWord,
    NonverbalCommunication, OverallImpression, RepeatedPhrase, SentenceStructure, VoiceAndSound,
    WordChoice,
};
