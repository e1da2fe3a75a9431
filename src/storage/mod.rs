//! Storage module for podium
//!
//! The recording library is one keyed collection persisted as JSON. All
//! mutation goes through [`RecordingStore`], which serializes writers and
//! publishes status changes to subscribers.

mod models;
mod store;

pub use models::{AnalysisMode, AnalysisStatus, CameraFacing, Recording};
pub use store::{RecordingStore, StatusEvent};
