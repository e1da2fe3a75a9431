//! podium - manage speech-practice recordings and get AI coaching feedback
//!
//! The heart of the crate is the remote analysis pipeline: upload a practice
//! video to Gemini, wait for the remote file to become ACTIVE, run one
//! structured generation request against the coaching rubric, and persist the
//! scored result in the local recording library.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod storage;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "podium";
