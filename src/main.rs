//! podium - speech-practice recordings with AI coaching feedback
//!
//! Entry point for the podium CLI application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use podium::cli::{Cli, Commands};
use podium::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    match cli.command {
        Commands::Completions { shell } => {
            podium::cli::completions::print(shell);
        }
        command => {
            // Load configuration only for runtime commands.
            let settings = Settings::load()?;

            match command {
                Commands::Import {
                    video,
                    prompt,
                    notes,
                    facing,
                    duration,
                } => {
                    podium::cli::commands::import_recording(
                        &settings, video, prompt, notes, &facing, duration,
                    )
                    .await?;
                }
                Commands::Analyze { id, mode } => {
                    podium::cli::commands::analyze_recording(&settings, &id, mode).await?;
                }
                Commands::Retry { id } => {
                    podium::cli::commands::retry_recording(&settings, &id).await?;
                }
                Commands::List { limit } => {
                    podium::cli::commands::list_recordings(&settings, limit).await?;
                }
                Commands::Show { id, json } => {
                    podium::cli::commands::show_recording(&settings, &id, json).await?;
                }
                Commands::Delete { id } => {
                    podium::cli::commands::delete_recording(&settings, &id).await?;
                }
                Commands::Config(config_cmd) => {
                    podium::cli::commands::config_command(&settings, config_cmd)?;
                }
                Commands::Completions { .. } => unreachable!(),
            }
        }
    }

    Ok(())
}
