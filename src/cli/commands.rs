//! CLI command implementations

use std::sync::Arc;

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::analysis::{AnalysisOutcome, AnalysisPipeline, CoachingReport};
use crate::cli::args::ConfigCommand;
use crate::config::Settings;
use crate::storage::{AnalysisMode, AnalysisStatus, CameraFacing, Recording, RecordingStore};

fn open_store(settings: &Settings) -> Arc<RecordingStore> {
    Arc::new(RecordingStore::open(settings.library_path()))
}

/// First eight characters of an id, or the whole id when shorter
/// (hand-edited library files may carry non-UUID ids).
fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

async fn resolve_recording(store: &RecordingStore, id: &str) -> Result<Recording> {
    store
        .find_by_prefix(id)
        .await?
        .with_context(|| format!("Recording not found: {}", id))
}

/// Import a captured video into the library
pub async fn import_recording(
    settings: &Settings,
    video: PathBuf,
    prompt: Option<String>,
    notes: Option<String>,
    facing: &str,
    duration: Option<u64>,
) -> Result<()> {
    settings.ensure_dirs()?;

    if !video.exists() {
        anyhow::bail!("Video file does not exist: {}", video.display());
    }

    let size_bytes = std::fs::metadata(&video)?.len();
    let prompt = prompt.unwrap_or_else(|| "Free practice".to_string());

    let mut recording = Recording::new(video.to_string_lossy().to_string(), prompt);
    recording.notes = notes;
    recording.duration_secs = duration;
    recording.size_bytes = Some(size_bytes);
    recording.facing = match facing {
        "back" => CameraFacing::Back,
        _ => CameraFacing::Front,
    };

    let id = recording.id.clone();
    let store = open_store(settings);
    store.insert(recording).await?;

    println!("Imported recording: {}", short_id(&id));
    println!("Run `podium analyze {}` to get coaching feedback.", short_id(&id));
    Ok(())
}

/// Run the analysis pipeline for a recording and print the report
pub async fn analyze_recording(settings: &Settings, id: &str, mode: Option<String>) -> Result<()> {
    let mode = match mode {
        Some(m) => Some(
            AnalysisMode::from_str(&m)
                .with_context(|| format!("Unknown mode '{}'. Use general, interview, sales, or pitch.", m))?,
        ),
        None => None,
    };

    let store = open_store(settings);
    let recording = resolve_recording(&store, id).await?;

    println!("Analyzing {}...", short_id(&recording.id));

    let pipeline = AnalysisPipeline::from_settings(settings, store.clone())?;
    match pipeline.run(&recording.id, mode).await? {
        AnalysisOutcome::Completed(result) => {
            print_report(&CoachingReport::from_result(&result));
        }
        AnalysisOutcome::Failed { message } => {
            anyhow::bail!("{}", message);
        }
    }

    Ok(())
}

/// Retry analysis for a failed recording
pub async fn retry_recording(settings: &Settings, id: &str) -> Result<()> {
    let store = open_store(settings);
    let recording = resolve_recording(&store, id).await?;

    if recording.analysis_status == AnalysisStatus::Pending {
        anyhow::bail!("Analysis is already running for {}", short_id(&recording.id));
    }

    analyze_recording(settings, &recording.id, None).await
}

/// List recordings in the library
pub async fn list_recordings(settings: &Settings, limit: usize) -> Result<()> {
    let store = open_store(settings);
    let recordings = store.list().await?;

    if recordings.is_empty() {
        println!("No recordings found");
        return Ok(());
    }

    println!(
        "{:<10} {:<30} {:<12} {:<14} {:<6}",
        "ID", "Prompt", "Date", "Analysis", "Score"
    );
    println!("{}", "-".repeat(75));

    for recording in recordings.iter().take(limit) {
        let date = recording.captured_at.format("%Y-%m-%d");
        let score = recording
            .analysis_result
            .as_ref()
            .and_then(|r| r.overall_score)
            .map(|s| format!("{:.1}", s))
            .unwrap_or_else(|| "-".to_string());

        let mut prompt: String = recording.prompt.chars().take(28).collect();
        if recording.prompt.chars().count() > 28 {
            prompt.pop();
            prompt.push('…');
        }

        println!(
            "{:<10} {:<30} {:<12} {:<14} {:<6}",
            short_id(&recording.id),
            prompt,
            date,
            recording.analysis_status.as_str(),
            score
        );
    }

    Ok(())
}

/// Show a recording's details and coaching report
pub async fn show_recording(settings: &Settings, id: &str, json: bool) -> Result<()> {
    let store = open_store(settings);
    let recording = resolve_recording(&store, id).await?;

    if json {
        match &recording.analysis_result {
            Some(result) => println!("{}", serde_json::to_string_pretty(result)?),
            None => anyhow::bail!(
                "No analysis result for {} (status: {})",
                short_id(&recording.id),
                recording.analysis_status.as_str()
            ),
        }
        return Ok(());
    }

    println!("Recording: {}", short_id(&recording.id));
    println!("  Prompt: {}", recording.prompt);
    println!("  Captured: {}", recording.captured_at.format("%Y-%m-%d %H:%M"));
    println!("  Video: {}", recording.video_path);
    if let Some(duration) = recording.duration_secs {
        println!("  Duration: {}:{:02}", duration / 60, duration % 60);
    }
    if let Some(notes) = &recording.notes {
        println!("  Notes: {}", notes);
    }
    println!("  Analysis: {}", recording.analysis_status.as_str());
    if let Some(mode) = recording.analysis_mode {
        println!("  Mode: {}", mode.as_str());
    }

    if let Some(result) = &recording.analysis_result {
        println!();
        print_report(&CoachingReport::from_result(result));
    }

    Ok(())
}

/// Delete a recording from the library
pub async fn delete_recording(settings: &Settings, id: &str) -> Result<()> {
    let store = open_store(settings);
    let recording = resolve_recording(&store, id).await?;

    store.delete(&recording.id).await?;
    println!("Deleted recording: {}", short_id(&recording.id));
    Ok(())
}

fn print_report(report: &CoachingReport) {
    println!("Overall score: {:.1}/10", report.overall_score);
    println!();
    println!("{}", report.summary);
    println!();

    if !report.strengths.is_empty() {
        println!("Strengths:");
        for strength in &report.strengths {
            println!("  + {}", strength);
        }
    }

    println!("Work on:");
    for opportunity in &report.opportunities {
        println!("  - {}", opportunity);
    }

    println!();
    println!("{}", report.delivery_note);
    println!("{}", report.pace_note);
    println!("{}", report.filler_note);
}

/// Handle configuration commands
pub fn config_command(settings: &Settings, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let content = toml::to_string_pretty(settings)?;
            println!("{}", content);
        }
        ConfigCommand::Path => {
            println!("{}", Settings::config_path()?.display());
        }
        ConfigCommand::Init { force } => {
            let path = Settings::config_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists: {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Settings::write_default(&path)?;
            println!("Wrote default config: {}", path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_never_slices_past_the_id() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
        assert_eq!(short_id(""), "");
    }
}
